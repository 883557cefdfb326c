use thiserror::Error;
use vg_auth::AuthError;
use vg_protocol::{ProtocolError, Status};
use vg_transfer::TransferError;

#[derive(Debug, Error)]
pub enum ServerError {
    /// A call was refused with a specific status.
    #[error("{0}")]
    Rejected(Status),

    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl From<Status> for ServerError {
    fn from(status: Status) -> Self {
        Self::Rejected(status)
    }
}

impl ServerError {
    /// The status reported to the caller.
    ///
    /// Internal causes are replaced by a generic message; the full error is
    /// only logged.
    pub fn to_status(&self) -> Status {
        match self {
            Self::Rejected(status) => status.clone(),
            Self::Auth(e) => auth_status(e),
            Self::Transfer(e) => transfer_status(e),
            Self::Protocol(ProtocolError::MessageTooLarge { .. }) => {
                Status::invalid_argument(self.to_string())
            }
            Self::Protocol(_) | Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                Status::internal("internal error")
            }
        }
    }
}

fn auth_status(e: &AuthError) -> Status {
    match e {
        AuthError::InvalidArgument(message) => Status::invalid_argument(message.clone()),
        AuthError::AlreadyExists(_) => Status::already_exists("username already exists"),
        AuthError::InvalidCredentials => Status::unauthenticated("invalid credentials"),
        AuthError::InvalidToken(_) => Status::unauthenticated("invalid token"),
        AuthError::TokenExpired => Status::unauthenticated("token expired"),
        AuthError::Crypto(_) | AuthError::Storage(_) => Status::internal("internal error"),
    }
}

fn transfer_status(e: &TransferError) -> Status {
    match e {
        TransferError::InvalidArgument(message) => Status::invalid_argument(message.clone()),
        TransferError::NotFound(message) => Status::not_found(message.clone()),
        TransferError::FailedPrecondition(message) => Status::failed_precondition(message.clone()),
        TransferError::Transport(_) => Status::internal("video stream interrupted"),
        TransferError::SessionClosed(_) | TransferError::Store(_) => Status::internal("internal error"),
    }
}
