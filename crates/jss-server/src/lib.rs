//! HTTP server for the JSON Storage Server.
//!
//! Exposes the document store, account registry, and public projection as
//! a JSON API over axum. Every storage call runs on the blocking pool under
//! the configured storage timeout.

pub mod auth;
pub mod config;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use auth::{Authorized, API_KEY_HEADER};
pub use config::ServerConfig;
pub use envelope::ApiResponse;
pub use error::{ServerError, ServerResult};
pub use server::JssServer;
pub use state::AppState;
