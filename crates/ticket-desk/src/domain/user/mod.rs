//! User data model.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::Error;
use super::auth::{PasswordCredential, PasswordCredentialError};

/// Validation errors returned by the user constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Identifier was empty.
    EmptyId,
    /// Identifier was not a UUID.
    InvalidId,
    /// Display name was blank.
    EmptyDisplayName,
    /// Email was blank.
    EmptyEmail,
    /// Email did not look like `local@domain`.
    InvalidEmail,
    /// Persisted record carried neither a hash nor a legacy password.
    MissingCredential,
    /// Persisted password hash could not be decoded.
    InvalidCredential(PasswordCredentialError),
}

impl UserValidationError {
    /// Name of the input field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyId | Self::InvalidId => "id",
            Self::EmptyDisplayName => "name",
            Self::EmptyEmail | Self::InvalidEmail => "email",
            Self::MissingCredential | Self::InvalidCredential(_) => "password",
        }
    }
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyDisplayName => write!(f, "Name is required."),
            Self::EmptyEmail => write!(f, "Email is required."),
            Self::InvalidEmail => write!(f, "Email must look like name@example.com."),
            Self::MissingCredential => write!(f, "user record has no password credential"),
            Self::InvalidCredential(err) => write!(f, "user record credential is invalid: {err}"),
        }
    }
}

impl std::error::Error for UserValidationError {}

impl From<UserValidationError> for Error {
    fn from(value: UserValidationError) -> Self {
        Self::invalid_request(value.to_string()).with_details(json!({ "field": value.field() }))
    }
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    ///
    /// # Errors
    ///
    /// Returns [`UserValidationError`] when the input is empty, padded, or
    /// not a UUID.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }

        Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(id))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Human readable name for the account holder.
///
/// Stored trimmed; any characters are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`].
    ///
    /// # Errors
    ///
    /// Returns [`UserValidationError::EmptyDisplayName`] for blank input.
    pub fn new(display_name: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = display_name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// First whitespace-separated word, used for greetings.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.0.split_whitespace().next().unwrap_or(self.0.as_str())
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^[^@\s]+@[^@\s]+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Account email address, trimmed, compared case-insensitively.
///
/// The original casing is preserved for display and persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`].
    ///
    /// # Errors
    ///
    /// Returns [`UserValidationError`] when the input is blank or lacks a
    /// single `@` separating two non-empty parts.
    ///
    /// # Examples
    /// ```
    /// use ticket_desk::domain::Email;
    ///
    /// let email = Email::new("  Ada@Example.com ").unwrap();
    /// assert_eq!(email.as_ref(), "Ada@Example.com");
    /// assert!(email.matches("ada@example.COM"));
    /// ```
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = email.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !email_regex().is_match(trimmed) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Case-insensitive comparison against raw input.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        self.0.to_lowercase() == candidate.trim().to_lowercase()
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Registered account as persisted in the user registry.
///
/// ## Invariants
/// - `id` is a valid UUID string.
/// - `email` is unique across the registry, ignoring case.
/// - Records are never mutated except to upgrade a legacy credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UserDto", into = "UserDto")]
pub struct User {
    id: UserId,
    name: DisplayName,
    email: Email,
    credential: PasswordCredential,
}

impl User {
    /// Build a new [`User`] from validated components.
    #[must_use]
    pub const fn new(
        id: UserId,
        name: DisplayName,
        email: Email,
        credential: PasswordCredential,
    ) -> Self {
        Self {
            id,
            name,
            email,
            credential,
        }
    }

    /// Stable user identifier.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub const fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Account email.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Stored credential.
    #[must_use]
    pub const fn credential(&self) -> &PasswordCredential {
        &self.credential
    }

    /// Replace the stored credential, returning the updated record.
    #[must_use]
    pub fn with_credential(mut self, credential: PasswordCredential) -> Self {
        self.credential = credential;
        self
    }

    /// Public view of the account without the credential.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Account details safe to hand to adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Stable user identifier.
    pub id: UserId,
    /// Display name.
    pub name: DisplayName,
    /// Account email.
    pub email: Email,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDto {
    id: String,
    name: String,
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password: Option<String>,
}

impl From<User> for UserDto {
    fn from(value: User) -> Self {
        let User {
            id,
            name,
            email,
            credential,
        } = value;
        let (password_hash, password) = match credential {
            PasswordCredential::Hashed(hash) => (Some(hash.to_string()), None),
            PasswordCredential::Plaintext(plain) => (None, Some(plain.as_str().to_owned())),
        };
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            password_hash,
            password,
        }
    }
}

impl TryFrom<UserDto> for User {
    type Error = UserValidationError;

    fn try_from(value: UserDto) -> Result<Self, Self::Error> {
        let UserDto {
            id,
            name,
            email,
            password_hash,
            password,
        } = value;
        let credential = match (password_hash, password) {
            (Some(encoded), _) => PasswordCredential::from_encoded_hash(&encoded)
                .map_err(UserValidationError::InvalidCredential)?,
            (None, Some(plain)) => PasswordCredential::plaintext(plain),
            (None, None) => return Err(UserValidationError::MissingCredential),
        };

        Ok(Self::new(
            UserId::try_from(id)?,
            DisplayName::new(name)?,
            Email::new(email)?,
            credential,
        ))
    }
}

#[cfg(test)]
mod tests;
