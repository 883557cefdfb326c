use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use vg_crypto::{hash_password, verify_password};
use vg_types::{Identity, UserId};

use crate::error::{AuthError, AuthResult};

/// Longest username accepted at sign-up, in bytes.
pub const MAX_USERNAME_LEN: usize = 256;

/// A registered user. Never mutated after creation.
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    /// Argon2id PHC string.
    pub password_hash: String,
}

impl UserRecord {
    pub fn identity(&self) -> Identity {
        Identity::new(self.id.clone(), self.username.clone())
    }
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// User records keyed by username.
///
/// Implementations must satisfy:
/// - Usernames are unique and case-sensitive.
/// - Only a one-way hash of the password is retained.
/// - `verify` reports an unknown username and a wrong password identically.
pub trait CredentialStore: Send + Sync {
    /// Register a new user and return its assigned id.
    fn create(&self, username: &str, password: &str) -> AuthResult<UserId>;

    /// Check a username/password pair and return the user's identity.
    fn verify(&self, username: &str, password: &str) -> AuthResult<Identity>;

    /// Look a user up by username.
    fn lookup(&self, username: &str) -> AuthResult<Option<UserRecord>>;

    /// Number of registered users.
    fn user_count(&self) -> AuthResult<usize>;
}

/// In-memory credential store behind a single `RwLock`.
///
/// Password hashing runs outside the lock; the lock covers only the map
/// lookup and insert.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Hash checked against when the username does not exist, so a miss costs
/// the same as a wrong password.
fn decoy_hash() -> Option<&'static str> {
    static DECOY: OnceLock<Option<String>> = OnceLock::new();
    DECOY
        .get_or_init(|| hash_password("videogate-decoy-password").ok())
        .as_deref()
}

impl CredentialStore for InMemoryCredentialStore {
    fn create(&self, username: &str, password: &str) -> AuthResult<UserId> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidArgument(
                "username and password are required".into(),
            ));
        }
        if username.len() > MAX_USERNAME_LEN {
            return Err(AuthError::InvalidArgument("username is too long".into()));
        }

        let password_hash = hash_password(password)?;

        let mut users = self
            .users
            .write()
            .map_err(|e| AuthError::Storage(format!("lock poisoned: {e}")))?;
        if users.contains_key(username) {
            return Err(AuthError::AlreadyExists(username.to_string()));
        }
        let id = UserId::sequential(users.len() + 1);
        users.insert(
            username.to_string(),
            UserRecord {
                id: id.clone(),
                username: username.to_string(),
                password_hash,
            },
        );
        tracing::debug!(user_id = %id, username, "user registered");
        Ok(id)
    }

    fn verify(&self, username: &str, password: &str) -> AuthResult<Identity> {
        let record = self.lookup(username)?;

        let Some(record) = record else {
            if let Some(decoy) = decoy_hash() {
                let _ = verify_password(password, decoy);
            }
            return Err(AuthError::InvalidCredentials);
        };

        if verify_password(password, &record.password_hash)? {
            Ok(record.identity())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    fn lookup(&self, username: &str) -> AuthResult<Option<UserRecord>> {
        let users = self
            .users
            .read()
            .map_err(|e| AuthError::Storage(format!("lock poisoned: {e}")))?;
        Ok(users.get(username).cloned())
    }

    fn user_count(&self) -> AuthResult<usize> {
        let users = self
            .users
            .read()
            .map_err(|e| AuthError::Storage(format!("lock poisoned: {e}")))?;
        Ok(users.len())
    }
}

impl std::fmt::Debug for InMemoryCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.user_count().unwrap_or(0);
        f.debug_struct("InMemoryCredentialStore")
            .field("user_count", &count)
            .finish()
    }
}
