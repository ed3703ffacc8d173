//! Domain types and services.
//!
//! Purpose: hold the account and ticket models together with the two stores
//! that mirror them to a [`ports::KeyValueStore`]. Nothing here knows about
//! files or terminals.
//!
//! Public surface:
//! - Error (alias to `error::DomainError`) with a stable [`ErrorCode`].
//! - [`AuthStore`] for registration, login, and the active session.
//! - [`TicketStore`] for the ticket collection.
//! - [`keys`] naming the persisted documents.

pub mod auth;
mod auth_store;
mod error;
mod persistence;
pub mod ports;
pub mod ticket;
mod ticket_store;
pub mod user;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::auth::{
    AuthSession, LoginCredentials, PasswordCredential, Registration, Session, SessionToken,
};
pub use self::auth_store::AuthStore;
pub use self::error::{DomainError as Error, ErrorCode};
pub use self::persistence::keys;
pub use self::ticket::{
    NewTicket, StatusFilter, Ticket, TicketId, TicketPatch, TicketStats, TicketStatus,
    TicketValidationError,
};
pub use self::ticket_store::TicketStore;
pub use self::user::{DisplayName, Email, User, UserId, UserProfile, UserValidationError};
