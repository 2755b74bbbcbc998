use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use jss_accounts::AccountError;
use jss_gate::GateError;
use jss_store::StoreError;
use thiserror::Error;

use crate::envelope::ApiResponse;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("API key is required")]
    MissingCredential,

    #[error("Invalid API key")]
    InvalidCredential,

    #[error("Invalid email or password")]
    InvalidLogin,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    MethodNotAllowed(&'static str),

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("startup failed: {0}")]
    Startup(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn document_not_found() -> Self {
        Self::NotFound("Document not found".into())
    }

    pub fn invalid_json() -> Self {
        Self::BadRequest("Invalid JSON".into())
    }

    pub fn missing_id() -> Self {
        Self::BadRequest("Document ID is required".into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingCredential | Self::InvalidCredential | Self::InvalidLogin => {
                StatusCode::UNAUTHORIZED
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Unavailable(_)
            | Self::Config(_)
            | Self::Startup(_)
            | Self::Io(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Unavailable(detail) => {
                tracing::error!(detail = %detail, "storage unavailable");
                "Storage unavailable".to_string()
            }
            Self::Config(_) | Self::Startup(_) | Self::Io(_) | Self::Internal(_) => {
                tracing::error!(error = %self, "internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, ApiResponse::<()>::failure(message)).into_response()
    }
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Self::document_not_found(),
            StoreError::InvalidInput(msg) => Self::BadRequest(msg),
            StoreError::Unavailable(msg) => Self::Unavailable(msg),
            StoreError::Io(e) => Self::Unavailable(e.to_string()),
            corrupt @ StoreError::CorruptRecord { .. } => Self::Internal(corrupt.to_string()),
        }
    }
}

impl From<AccountError> for ServerError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::MissingFields => {
                Self::BadRequest("Email and password are required".into())
            }
            AccountError::WeakPassword { min_len } => {
                Self::BadRequest(format!("Password must be at least {min_len} characters"))
            }
            AccountError::DuplicateEmail(_) => Self::Conflict("Email already registered".into()),
            AccountError::DuplicateApiKey => Self::Conflict("Could not issue a unique API key".into()),
            AccountError::InvalidCredentials => Self::InvalidLogin,
            AccountError::Unavailable(msg) => Self::Unavailable(msg),
            AccountError::Io(e) => Self::Unavailable(e.to_string()),
            other @ (AccountError::Hashing(_) | AccountError::CorruptRecord { .. }) => {
                Self::Internal(other.to_string())
            }
        }
    }
}

impl From<GateError> for ServerError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::MissingCredential => Self::MissingCredential,
            GateError::InvalidCredential => Self::InvalidCredential,
            GateError::Store(e) => e.into(),
            GateError::Accounts(e) => e.into(),
        }
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
