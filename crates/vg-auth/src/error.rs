use thiserror::Error;

/// Errors from credential and token operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("username already exists: {0}")]
    AlreadyExists(String),

    /// Unknown username and wrong password both map here.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    TokenExpired,

    #[error("crypto error: {0}")]
    Crypto(#[from] vg_crypto::CryptoError),

    #[error("credential store unavailable: {0}")]
    Storage(String),
}

pub type AuthResult<T> = Result<T, AuthError>;
