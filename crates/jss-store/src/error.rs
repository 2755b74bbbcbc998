/// Errors from document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The document does not exist, or is not visible to the caller.
    ///
    /// The two cases are deliberately indistinguishable.
    #[error("document not found: {0}")]
    NotFound(String),

    /// The caller supplied invalid input (e.g. an empty name).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The underlying medium could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A persisted record could not be decoded.
    #[error("corrupt record {id}: {reason}")]
    CorruptRecord { id: String, reason: String },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Returns `true` for failures of the storage medium itself.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Io(_))
    }
}

impl From<jss_types::TypeError> for StoreError {
    fn from(err: jss_types::TypeError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
