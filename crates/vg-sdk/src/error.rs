use thiserror::Error;
use vg_protocol::{Code, ProtocolError, Status};

#[derive(Debug, Error)]
pub enum SdkError {
    /// The server ended the call with a non-OK status.
    #[error("{0}")]
    Status(Status),

    #[error("not signed in")]
    NotSignedIn,

    #[error("chunk size must be positive")]
    InvalidChunkSize,

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SdkError {
    /// The server's status code, if the server answered at all.
    pub fn code(&self) -> Option<Code> {
        match self {
            Self::Status(status) => Some(status.code),
            _ => None,
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
