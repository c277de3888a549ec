use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failure.
///
/// Business-rule failures never reach this type; by the time a store method
/// runs, the request has already passed the guard and domain validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The targeted row does not exist.
    #[error("not found")]
    NotFound,

    /// A uniqueness or referential constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backend failed; any open transaction has been rolled back.
    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
