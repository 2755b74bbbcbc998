use jss_accounts::AccountError;
use jss_store::StoreError;

/// Errors from resolving a credential or from the operation it authorized.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// No credential was presented.
    #[error("API key is required")]
    MissingCredential,

    /// The credential matches neither the administrative key nor any account.
    #[error("invalid API key")]
    InvalidCredential,

    /// The document store rejected or failed the operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The account registry failed during credential lookup.
    #[error(transparent)]
    Accounts(#[from] AccountError),
}

impl GateError {
    /// Returns `true` for credential rejections (as opposed to store failures).
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::MissingCredential | Self::InvalidCredential)
    }

    /// Returns `true` when a storage medium could not be reached.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Store(e) => e.is_unavailable(),
            Self::Accounts(e) => e.is_unavailable(),
            _ => false,
        }
    }
}

/// Result alias for gate operations.
pub type GateResult<T> = Result<T, GateError>;
