//! Auth store: user registry plus the single active session.
//!
//! The registry is re-read from storage on every mutation so that separate
//! processes sharing one medium see each other's accounts. The session is
//! cached in memory after [`AuthStore::hydrate`].
//!
//! Registry records that fail to decode cannot sign in but are written back
//! unchanged, and their email still counts as taken. A registry the medium
//! failed to return is never overwritten.

use std::sync::Arc;

use mockable::Clock;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use super::Error;
use super::auth::{
    AuthSession, LoginCredentials, PasswordCredential, Registration, Session, SessionToken,
};
use super::persistence::{
    Document, Records, keys, read_document, read_records, remove_document, write_document,
    write_records,
};
use super::ports::KeyValueStore;
use super::user::{Email, User, UserId, UserProfile};

const DUPLICATE_EMAIL_MESSAGE: &str = "An account with this email already exists.";
const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password.";
const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired, please log in again.";

/// Registry and session service over a [`KeyValueStore`].
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use mockable::DefaultClock;
/// use ticket_desk::domain::AuthStore;
/// use ticket_desk::outbound::MemoryKeyValueStore;
///
/// let mut auth = AuthStore::new(Arc::new(MemoryKeyValueStore::new()), Arc::new(DefaultClock));
/// auth.hydrate();
/// let token = auth.register("Ada", "ada@example.com", "secret1")?;
/// assert_eq!(auth.get_session().map(|s| s.token), Some(token));
/// # Ok::<(), ticket_desk::domain::Error>(())
/// ```
pub struct AuthStore<S> {
    storage: Arc<S>,
    clock: Arc<dyn Clock>,
    current: Option<AuthSession>,
    hydrated: bool,
}

impl<S> AuthStore<S> {
    /// Create an unhydrated store.
    #[must_use]
    pub const fn new(storage: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            current: None,
            hydrated: false,
        }
    }

    /// Whether [`Self::hydrate`] has completed.
    #[must_use]
    pub const fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Current session, or `None` when signed out.
    #[must_use]
    pub fn get_session(&self) -> Option<AuthSession> {
        self.current.clone()
    }

    /// Current session, or an `unauthorized` error.
    ///
    /// # Errors
    ///
    /// Returns [`super::ErrorCode::Unauthorized`] when no session is active.
    pub fn ensure_authenticated(&self) -> Result<AuthSession, Error> {
        self.get_session()
            .ok_or_else(|| Error::unauthorized(SESSION_EXPIRED_MESSAGE))
    }
}

impl<S> AuthStore<S>
where
    S: KeyValueStore,
{
    /// Load the persisted session and resolve it against the registry.
    ///
    /// A session whose token is blank, whose user no longer exists, or that
    /// fails to parse is removed from storage. Subsequent calls are no-ops.
    pub fn hydrate(&mut self) {
        if self.hydrated {
            return;
        }

        let registry = read_records::<_, User>(self.storage.as_ref(), keys::USERS);
        let registry_read = !matches!(registry, Document::Unreadable(_));
        let users = registry.unwrap_or_default().valid;
        self.current = match read_document::<_, Session>(self.storage.as_ref(), keys::SESSION) {
            Document::Absent | Document::Unreadable(_) => None,
            Document::Present(session) => {
                let owner = if session.token.is_blank() {
                    None
                } else {
                    find_by_id(&users, &session.user_id)
                };
                let restored = owner.map(|user| AuthSession {
                    token: session.token.clone(),
                    user: user.profile(),
                });
                if restored.is_none() && (registry_read || session.token.is_blank()) {
                    info!(user_id = %session.user_id, "discarding stale session");
                    self.discard_persisted_session();
                }
                restored
            }
            Document::Corrupt => {
                self.discard_persisted_session();
                None
            }
        };
        self.hydrated = true;
        debug!(signed_in = self.current.is_some(), "auth store hydrated");
    }

    /// Create an account and sign it in.
    ///
    /// # Errors
    ///
    /// - `invalid_request` when the name, email, or password fail validation.
    /// - `duplicate_email` when the email is already registered, ignoring
    ///   case.
    /// - `storage_failure` when the registry cannot be read, or the registry
    ///   or session cannot be written.
    pub fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<SessionToken, Error> {
        self.hydrate();
        let registration = Registration::try_from_parts(name, email, password)?;

        let mut registry = self.load_registry()?;
        if email_taken(&registry, registration.email()) {
            return Err(Error::duplicate_email(DUPLICATE_EMAIL_MESSAGE)
                .with_details(json!({ "field": "email" })));
        }

        let user = User::new(
            UserId::random(),
            registration.name().clone(),
            registration.email().clone(),
            PasswordCredential::hash(registration.password()),
        );
        let profile = user.profile();
        registry.valid.push(user);
        write_records(
            self.storage.as_ref(),
            keys::USERS,
            &registry.valid,
            &registry.skipped,
        )?;
        info!(user_id = %profile.id, "registered user");

        self.start_session(profile)
    }

    /// Sign in an existing account.
    ///
    /// A legacy plaintext credential is replaced with a salted digest after
    /// it verifies. The session is left untouched on failure.
    ///
    /// # Errors
    ///
    /// - `invalid_request` when the email or password is blank.
    /// - `invalid_credentials` when no account matches or the password is
    ///   wrong.
    /// - `storage_failure` when the registry cannot be read or the session
    ///   cannot be written.
    pub fn login(&mut self, email: &str, password: &str) -> Result<SessionToken, Error> {
        self.hydrate();
        let credentials = LoginCredentials::try_from_parts(email, password)?;

        let mut registry = self.load_registry()?;
        let Some(index) = registry.valid.iter().position(|user| {
            user.email().matches(credentials.email())
                && user.credential().verify(credentials.password())
        }) else {
            debug!("login rejected");
            return Err(Error::invalid_credentials(INVALID_CREDENTIALS_MESSAGE));
        };

        let Some(user) = registry.valid.get_mut(index) else {
            return Err(Error::internal("matched user vanished from the registry"));
        };
        let legacy = user.credential().is_legacy();
        if legacy {
            *user = user
                .clone()
                .with_credential(PasswordCredential::hash(credentials.password()));
        }
        let profile = user.profile();
        if legacy {
            self.upgrade_registry(&registry, &profile.id);
        }

        self.start_session(profile)
    }

    /// Remove the session from storage and memory.
    ///
    /// # Errors
    ///
    /// Returns `storage_failure` when the persisted session cannot be
    /// removed; the in-memory session is kept in that case.
    pub fn logout(&mut self) -> Result<(), Error> {
        self.hydrate();
        remove_document(self.storage.as_ref(), keys::SESSION)?;
        if let Some(session) = self.current.take() {
            info!(user_id = %session.user.id, "signed out");
        }
        Ok(())
    }

    fn start_session(&mut self, user: UserProfile) -> Result<SessionToken, Error> {
        let now = self.clock.utc();
        let session = Session {
            token: SessionToken::generate(now),
            user_id: user.id.clone(),
            created_at: now,
        };
        write_document(self.storage.as_ref(), keys::SESSION, &session)?;

        let token = session.token;
        self.current = Some(AuthSession {
            token: token.clone(),
            user,
        });
        Ok(token)
    }

    fn load_registry(&self) -> Result<Records<User>, Error> {
        read_records(self.storage.as_ref(), keys::USERS).into_writable()
    }

    fn upgrade_registry(&self, registry: &Records<User>, user_id: &UserId) {
        // The login still succeeds; the upgrade is retried on the next login.
        match write_records(
            self.storage.as_ref(),
            keys::USERS,
            &registry.valid,
            &registry.skipped,
        ) {
            Ok(()) => info!(user_id = %user_id, "upgraded legacy credential"),
            Err(error) => warn!(user_id = %user_id, error = %error, "failed to upgrade legacy credential"),
        }
    }

    fn discard_persisted_session(&self) {
        if let Err(error) = remove_document(self.storage.as_ref(), keys::SESSION) {
            warn!(error = %error, "failed to remove stale session");
        }
    }
}

fn email_taken(registry: &Records<User>, email: &Email) -> bool {
    let skipped = registry
        .skipped
        .iter()
        .filter_map(|record| record.get("email").and_then(Value::as_str));
    registry
        .valid
        .iter()
        .map(|user| user.email().as_ref())
        .chain(skipped)
        .any(|existing| email.matches(existing))
}

fn find_by_id<'a>(users: &'a [User], id: &UserId) -> Option<&'a User> {
    users.iter().find(|user| user.id() == id)
}

#[cfg(test)]
#[path = "auth_store_tests.rs"]
mod tests;
