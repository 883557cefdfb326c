/// Errors from hashing and signing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("password hashing failed")]
    HashingFailed,

    #[error("stored password hash is malformed")]
    MalformedHash,

    #[error("token signing failed")]
    SigningFailed,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("unexpected signing algorithm")]
    UnexpectedAlgorithm,

    #[error("token expired")]
    Expired,

    #[error("malformed token")]
    MalformedToken,
}

pub type CryptoResult<T> = Result<T, CryptoError>;
