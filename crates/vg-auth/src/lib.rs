//! Authentication for videogate.
//!
//! Two pieces live here:
//!
//! - [`CredentialStore`] -- user records keyed by username, with passwords
//!   held only as Argon2id hashes. [`InMemoryCredentialStore`] is the only
//!   backend.
//! - [`TokenService`] -- issues and verifies stateless HS256 bearer tokens.
//!   Verification never consults the credential store.

pub mod credentials;
pub mod error;
pub mod token;

pub use credentials::{CredentialStore, InMemoryCredentialStore, UserRecord, MAX_USERNAME_LEN};
pub use error::{AuthError, AuthResult};
pub use token::{IssuedToken, TokenService, DEFAULT_TOKEN_TTL};
