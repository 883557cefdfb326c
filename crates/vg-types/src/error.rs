use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("object id must not be empty")]
    EmptyObjectId,

    #[error("object id is {len} bytes, limit is {max}")]
    ObjectIdTooLong { len: usize, max: usize },

    #[error("invalid user id: {0}")]
    InvalidUserId(String),
}
