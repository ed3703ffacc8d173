//! Inbound adapters driving the domain stores.

pub mod cli;
