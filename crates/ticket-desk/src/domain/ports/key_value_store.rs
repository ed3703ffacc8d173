//! Port for the string key-value persistence medium.
//!
//! Both stores read whole JSON documents under fixed keys and write them back
//! in full after every mutation. Adapters only move opaque strings; parsing
//! and validation stay in the domain.

use super::define_port_error;

define_port_error! {
    /// Errors raised by key-value store adapters.
    pub enum StorageError {
        /// The medium could not be opened or is no longer usable.
        Unavailable {
            /// Adapter-specific cause.
            message: String,
        } => "storage unavailable: {message}",
        /// Reading a key failed.
        Read {
            /// Key being read.
            key: String,
            /// Adapter-specific cause.
            message: String,
        } => "failed to read '{key}': {message}",
        /// Writing or removing a key failed.
        Write {
            /// Key being written.
            key: String,
            /// Adapter-specific cause.
            message: String,
        } => "failed to write '{key}': {message}",
        /// The adapter cannot represent the key.
        InvalidKey {
            /// Rejected key.
            key: String,
        } => "invalid storage key '{key}'",
    }
}

/// Synchronous string key-value persistence.
///
/// # Semantics
///
/// - `get` returns `None` for a key that was never set or has been removed.
/// - `set` replaces any previous value.
/// - `remove` on an absent key succeeds.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the value cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key` if present.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the value exists but cannot be removed.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
