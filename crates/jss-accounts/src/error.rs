/// Errors from account registry operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Email or password missing from the request.
    #[error("email and password are required")]
    MissingFields,

    /// The password is shorter than the configured minimum.
    #[error("password must be at least {min_len} characters")]
    WeakPassword { min_len: usize },

    /// An account with this (normalized) email already exists.
    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    /// The freshly issued API key collided with an existing one.
    #[error("issued API key is not unique")]
    DuplicateApiKey,

    /// Unknown email or wrong password. Deliberately the same error for both.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Password hashing failed or was misconfigured.
    #[error("password hashing error: {0}")]
    Hashing(String),

    /// The account medium could not be reached.
    #[error("account store unavailable: {0}")]
    Unavailable(String),

    /// A persisted account record could not be decoded.
    #[error("corrupt account record {id}: {reason}")]
    CorruptRecord { id: String, reason: String },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AccountError {
    /// Returns `true` for failures of the storage medium itself.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Io(_))
    }
}

/// Result alias for account operations.
pub type AccountResult<T> = Result<T, AccountError>;
