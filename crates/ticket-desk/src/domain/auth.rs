//! Authentication primitives: credentials, password digests, and sessions.
//!
//! Keep raw input parsing outside the stores by exposing constructors that
//! validate string inputs before the auth store touches the registry.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::Error;
use super::user::{DisplayName, Email, UserId, UserProfile, UserValidationError};

/// Minimum password length accepted at registration.
pub const PASSWORD_MIN: usize = 6;

const HASH_SCHEME: &str = "sha256";
const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 32;
const TOKEN_RANDOM_CHARS: usize = 8;
const TOKEN_RADIX: u32 = 36;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "Email is required."),
            Self::EmptyPassword => write!(f, "Password is required."),
        }
    }
}

impl std::error::Error for LoginValidationError {}

impl From<LoginValidationError> for Error {
    fn from(value: LoginValidationError) -> Self {
        let field = match value {
            LoginValidationError::EmptyEmail => "email",
            LoginValidationError::EmptyPassword => "password",
        };
        Self::invalid_request(value.to_string()).with_details(json!({ "field": field }))
    }
}

/// Validated login credentials used by the auth store.
///
/// ## Invariants
/// - `email` is trimmed and must not be empty after trimming.
/// - `password` must contain a non-whitespace character but retains
///   caller-provided whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use ticket_desk::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada@example.com ", "secret").unwrap();
/// assert_eq!(creds.email(), "ada@example.com");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    ///
    /// # Errors
    ///
    /// Returns [`LoginValidationError`] when either input is blank.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }

        if password.trim().is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            email: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email string suitable for registry lookups.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password string provided by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validation errors raised for sign-up input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationValidationError {
    /// Name or email failed validation.
    User(UserValidationError),
    /// Password was empty.
    EmptyPassword,
    /// Password was shorter than [`PASSWORD_MIN`].
    PasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },
}

impl fmt::Display for RegistrationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(err) => write!(f, "{err}"),
            Self::EmptyPassword => write!(f, "Password is required."),
            Self::PasswordTooShort { min } => {
                write!(f, "Password must be at least {min} characters.")
            }
        }
    }
}

impl std::error::Error for RegistrationValidationError {}

impl From<UserValidationError> for RegistrationValidationError {
    fn from(value: UserValidationError) -> Self {
        Self::User(value)
    }
}

impl From<RegistrationValidationError> for Error {
    fn from(value: RegistrationValidationError) -> Self {
        match value {
            RegistrationValidationError::User(err) => err.into(),
            other => Self::invalid_request(other.to_string())
                .with_details(json!({ "field": "password" })),
        }
    }
}

/// Validated sign-up input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    name: DisplayName,
    email: Email,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate raw sign-up input.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationValidationError`] for a blank name, a malformed
    /// email, or a password shorter than [`PASSWORD_MIN`] characters.
    pub fn try_from_parts(
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, RegistrationValidationError> {
        let display_name = DisplayName::new(name)?;
        let address = Email::new(email)?;
        if password.is_empty() {
            return Err(RegistrationValidationError::EmptyPassword);
        }
        if password.chars().count() < PASSWORD_MIN {
            return Err(RegistrationValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(Self {
            name: display_name,
            email: address,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Validated display name.
    #[must_use]
    pub const fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Validated email.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Password in clear, zeroised on drop.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Decoding errors for persisted password hashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordCredentialError {
    /// The encoded value did not have three `$`-separated parts.
    Malformed,
    /// The scheme prefix is not supported.
    UnsupportedScheme(String),
    /// Salt or digest was not valid hex of the expected width.
    InvalidEncoding,
}

impl fmt::Display for PasswordCredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "password hash must be scheme$salt$digest"),
            Self::UnsupportedScheme(scheme) => {
                write!(f, "unsupported password hash scheme '{scheme}'")
            }
            Self::InvalidEncoding => write!(f, "password hash salt or digest is not valid hex"),
        }
    }
}

impl std::error::Error for PasswordCredentialError {}

/// Salted SHA-256 password digest.
///
/// Encoded as `sha256$<salt hex>$<digest hex>` where the digest covers the
/// salt followed by the UTF-8 password bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash {
    salt: [u8; SALT_LEN],
    digest: [u8; DIGEST_LEN],
}

impl PasswordHash {
    /// Hash `password` with a fresh random salt.
    #[must_use]
    pub fn generate(password: &str) -> Self {
        let mut salt = [0_u8; SALT_LEN];
        rand::thread_rng().fill(&mut salt);
        Self::with_salt(salt, password)
    }

    fn with_salt(salt: [u8; SALT_LEN], password: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(password.as_bytes());
        Self {
            salt,
            digest: hasher.finalize().into(),
        }
    }

    /// Check `password` against the stored digest.
    #[must_use]
    pub fn verify(&self, password: &str) -> bool {
        Self::with_salt(self.salt, password).digest == self.digest
    }

    /// Decode a persisted hash.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordCredentialError`] when the value is not a
    /// well-formed `sha256` hash.
    pub fn parse(encoded: &str) -> Result<Self, PasswordCredentialError> {
        let mut parts = encoded.split('$');
        let (Some(scheme), Some(salt_hex), Some(digest_hex), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(PasswordCredentialError::Malformed);
        };
        if scheme != HASH_SCHEME {
            return Err(PasswordCredentialError::UnsupportedScheme(scheme.to_owned()));
        }
        Ok(Self {
            salt: decode_fixed(salt_hex)?,
            digest: decode_fixed(digest_hex)?,
        })
    }
}

fn decode_fixed<const N: usize>(value: &str) -> Result<[u8; N], PasswordCredentialError> {
    let bytes = hex::decode(value).map_err(|_| PasswordCredentialError::InvalidEncoding)?;
    bytes
        .try_into()
        .map_err(|_| PasswordCredentialError::InvalidEncoding)
}

impl fmt::Display for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{HASH_SCHEME}${}${}",
            hex::encode(self.salt),
            hex::encode(self.digest)
        )
    }
}

/// Credential stored on a user record.
#[derive(Clone, PartialEq, Eq)]
pub enum PasswordCredential {
    /// Salted digest written by this crate.
    Hashed(PasswordHash),
    /// Clear-text password inherited from registries written before hashing.
    Plaintext(Zeroizing<String>),
}

impl PasswordCredential {
    /// Hash a new password.
    #[must_use]
    pub fn hash(password: &str) -> Self {
        Self::Hashed(PasswordHash::generate(password))
    }

    /// Wrap a legacy clear-text password.
    #[must_use]
    pub fn plaintext(password: impl Into<String>) -> Self {
        Self::Plaintext(Zeroizing::new(password.into()))
    }

    /// Decode a persisted `passwordHash` value.
    ///
    /// # Errors
    ///
    /// Propagates [`PasswordHash::parse`] failures.
    pub fn from_encoded_hash(encoded: &str) -> Result<Self, PasswordCredentialError> {
        PasswordHash::parse(encoded).map(Self::Hashed)
    }

    /// Check a candidate password. Clear-text credentials require an exact
    /// match.
    #[must_use]
    pub fn verify(&self, password: &str) -> bool {
        match self {
            Self::Hashed(hash) => hash.verify(password),
            Self::Plaintext(stored) => stored.as_str() == password,
        }
    }

    /// Whether the credential should be rewritten as a hash.
    #[must_use]
    pub const fn is_legacy(&self) -> bool {
        matches!(self, Self::Plaintext(_))
    }
}

impl fmt::Debug for PasswordCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hashed(_) => f.write_str("Hashed(..)"),
            Self::Plaintext(_) => f.write_str("Plaintext(<redacted>)"),
        }
    }
}

/// Opaque session token.
///
/// A base-36 millisecond timestamp, a hyphen, then eight random base-36
/// characters. Unique within one storage medium; not a secret.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a token stamped with `now`.
    #[must_use]
    pub fn generate(now: DateTime<Utc>) -> Self {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let mut rng = rand::thread_rng();
        let random: String = (0..TOKEN_RANDOM_CHARS)
            .filter_map(|_| char::from_digit(rng.gen_range(0..TOKEN_RADIX), TOKEN_RADIX))
            .collect();
        Self(format!("{}-{random}", to_base36(millis)))
    }

    /// Whether the token carries any content.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

#[expect(
    clippy::integer_division,
    clippy::integer_division_remainder_used,
    reason = "radix conversion extracts digits by repeated division"
)]
fn to_base36(mut value: u64) -> String {
    let radix = u64::from(TOKEN_RADIX);
    let mut digits = Vec::new();
    loop {
        let digit = u32::try_from(value % radix).unwrap_or(0);
        digits.extend(char::from_digit(digit, TOKEN_RADIX));
        value /= radix;
        if value == 0 {
            break;
        }
    }
    digits.iter().rev().collect()
}

impl AsRef<str> for SessionToken {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Persisted session document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque token.
    pub token: SessionToken,
    /// Owning user.
    pub user_id: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Active session resolved against the user registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    /// Opaque token.
    pub token: SessionToken,
    /// Authenticated account.
    pub user: UserProfile,
}
