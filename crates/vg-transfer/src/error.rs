use thiserror::Error;
use vg_store::StoreError;

#[derive(Debug, Error)]
pub enum TransferError {
    /// The caller sent a malformed or inconsistent stream.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    /// The object exists but cannot be served.
    #[error("{0}")]
    FailedPrecondition(String),

    /// Reading from or writing to the call stream failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// A chunk arrived after the session stopped accepting them.
    #[error("upload session is {0}")]
    SessionClosed(&'static str),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub type TransferResult<T> = Result<T, TransferError>;
