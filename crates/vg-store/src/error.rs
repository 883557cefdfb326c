/// Errors from object store operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    /// A previous holder of the lock panicked.
    #[error("store lock poisoned: {0}")]
    LockPoisoned(String),

    /// Attempted to store an object under the empty id.
    #[error("cannot store object with empty id")]
    EmptyObjectId,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
