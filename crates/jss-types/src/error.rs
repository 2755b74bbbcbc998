use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("invalid owner scope: {0}")]
    InvalidScope(String),

    #[error("Document name is required")]
    EmptyName,
}
