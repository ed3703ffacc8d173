//! Ticket-tracking core: an auth store and a ticket store over a key-value
//! persistence port.
//!
//! - [`domain`] holds the models, validation, and both stores.
//! - [`outbound`] provides memory and directory-backed storage adapters.
//! - [`inbound`] exposes the stores as a command-line interface.
//! - [`config`] loads runtime settings.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
