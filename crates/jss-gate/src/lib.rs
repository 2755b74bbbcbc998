//! Identity resolution and authorization for the JSON Storage Server.
//!
//! Every credentialed document operation flows through here:
//!
//! ```text
//! Credentials --IdentityResolver--> Identity --AuthorizationGate--> Session
//!                                                                     |
//!                                                    DocumentStore (scope-filtered)
//! ```
//!
//! The [`PublicProjection`] bypasses the gate entirely and only ever
//! returns document content.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use jss_accounts::{AccountRegistry, HashingParams, RegistryConfig};
//! use jss_gate::{AuthorizationGate, Credentials, GateConfig};
//! use jss_store::DocumentStore;
//! use jss_types::NewDocument;
//!
//! let accounts = Arc::new(AccountRegistry::in_memory(RegistryConfig {
//!     hashing: HashingParams::insecure_fast(),
//!     ..RegistryConfig::default()
//! }).unwrap());
//! let gate = AuthorizationGate::new(
//!     &GateConfig::with_admin_key("admin"),
//!     accounts,
//!     Arc::new(DocumentStore::in_memory()),
//! );
//! let doc = gate
//!     .create(&Credentials::api_key("admin"), NewDocument::new("cfg", serde_json::json!({"x": 1})))
//!     .unwrap();
//! assert_eq!(doc.name, "cfg");
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod identity;
pub mod public;

pub use config::GateConfig;
pub use error::{GateError, GateResult};
pub use gate::{AuthorizationGate, Session};
pub use identity::{CredentialDirectory, Credentials, Identity, IdentityResolver};
pub use public::PublicProjection;
