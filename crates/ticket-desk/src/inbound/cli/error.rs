//! Error types for the command-line adapter.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::ports::StorageError;
use crate::domain::{Error, ErrorCode};

/// Errors surfaced by a single command invocation.
#[derive(Debug, Error)]
pub enum CliError {
    /// A store operation failed.
    #[error("{source}")]
    Domain {
        /// Underlying domain error.
        #[from]
        source: Error,
    },
    /// Settings could not be loaded.
    #[error("failed to load settings: {message}")]
    Settings {
        /// Loader error message.
        message: String,
    },
    /// The configured storage directory is not valid UTF-8.
    #[error("storage directory '{}' is not valid UTF-8", path.display())]
    NonUtf8StorageDir {
        /// Rejected path.
        path: PathBuf,
    },
    /// The storage directory could not be opened.
    #[error("could not open storage: {source}")]
    Storage {
        /// Adapter error.
        #[from]
        source: StorageError,
    },
    /// Command output could not be written.
    #[error("failed to write output: {source}")]
    Output {
        /// I/O error from the output stream.
        #[from]
        source: io::Error,
    },
}

impl CliError {
    /// Domain error code, when the failure came from a store.
    #[must_use]
    pub const fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Domain { source } => Some(source.code()),
            Self::Settings { .. }
            | Self::NonUtf8StorageDir { .. }
            | Self::Storage { .. }
            | Self::Output { .. } => None,
        }
    }
}
