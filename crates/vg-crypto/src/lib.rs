//! Cryptographic primitives for videogate.
//!
//! Provides Argon2id password hashing and HS256 token signing over a shared
//! secret.

pub mod error;
pub mod password;
pub mod token;

pub use error::{CryptoError, CryptoResult};
pub use password::{hash_password, verify_password};
pub use token::{SigningSecret, TokenClaims, TokenSigner};
