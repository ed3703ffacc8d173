//! Domain-level error types.
//!
//! These errors are adapter agnostic. The command-line adapter prints the
//! message; a JSON adapter can serialise the whole payload.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Input failed validation before reaching storage.
    InvalidRequest,
    /// Registration used an email that already belongs to an account.
    DuplicateEmail,
    /// Email or password did not match a registered account.
    InvalidCredentials,
    /// No active session exists, or it no longer resolves to a user.
    Unauthorized,
    /// The requested record does not exist.
    NotFound,
    /// The persistence medium rejected a read or write.
    StorageFailure,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

impl ErrorCode {
    /// Message used when an error is raised without one.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "The request was invalid.",
            Self::DuplicateEmail => "An account with this email already exists.",
            Self::InvalidCredentials => "Invalid email or password.",
            Self::Unauthorized => "Not signed in.",
            Self::NotFound => "Not found.",
            Self::StorageFailure => "Storage is unavailable.",
            Self::InternalError => "Something went wrong.",
        }
    }
}

/// Domain error payload, re-exported as `domain::Error`.
///
/// The message is never blank: an empty message is replaced with
/// [`ErrorCode::default_message`].
///
/// # Examples
/// ```
/// use ticket_desk::domain::{Error, ErrorCode};
///
/// let err = Error::new(ErrorCode::NotFound, "missing");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(Error::not_found("  ").message(), "Not found.");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct DomainError {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl DomainError {
    /// Create an error with `code` and `message`.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: non_blank(code, message.into()),
            details: None,
        }
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Structured context, such as the offending input field.
    #[must_use]
    pub const fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use serde_json::json;
    /// use ticket_desk::domain::Error;
    ///
    /// let err = Error::invalid_request("bad").with_details(json!({ "field": "title" }));
    /// assert!(err.details().is_some());
    /// ```
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Input failed validation.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Email already registered.
    #[must_use]
    pub fn duplicate_email(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DuplicateEmail, message)
    }

    /// Login did not match an account.
    #[must_use]
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidCredentials, message)
    }

    /// No active session.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Missing record.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// The storage medium failed.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageFailure, message)
    }

    /// Unexpected internal failure.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

fn non_blank(code: ErrorCode, message: String) -> String {
    if message.trim().is_empty() {
        code.default_message().to_owned()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(ErrorCode::InvalidRequest, "invalid_request")]
    #[case(ErrorCode::DuplicateEmail, "duplicate_email")]
    #[case(ErrorCode::InvalidCredentials, "invalid_credentials")]
    #[case(ErrorCode::Unauthorized, "unauthorized")]
    #[case(ErrorCode::StorageFailure, "storage_failure")]
    fn codes_serialise_as_snake_case(#[case] code: ErrorCode, #[case] expected: &str) {
        let value = serde_json::to_value(code).expect("serialise code");
        assert_eq!(value, json!(expected));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_messages_fall_back_to_the_code_default(#[case] message: &str) {
        let err = DomainError::storage(message);
        assert_eq!(err.message(), "Storage is unavailable.");
        assert_eq!(err.to_string(), err.message());
    }

    #[test]
    fn details_are_serialised_only_when_present() {
        let bare = serde_json::to_value(DomainError::not_found("Ticket missing."))
            .expect("serialise error");
        assert_eq!(bare, json!({ "code": "not_found", "message": "Ticket missing." }));

        let detailed = DomainError::invalid_request("Title is required.")
            .with_details(json!({ "field": "title" }));
        let encoded = serde_json::to_value(&detailed).expect("serialise error");
        assert_eq!(encoded["details"], json!({ "field": "title" }));
    }
}
