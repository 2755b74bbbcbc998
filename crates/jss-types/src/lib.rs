//! Foundation types for the JSON Storage Server (JSS).
//!
//! This crate provides the identifier, ownership, and document types shared
//! by every other JSS crate. It performs no I/O.
//!
//! # Key Types
//!
//! - [`DocumentId`]: UUID v7 document identifier, generated by the store
//! - [`AccountId`]: UUID v7 account identifier
//! - [`ApiKey`]: Opaque bearer credential issued per account
//! - [`OwnerScope`]: A specific account or the unscoped administrative scope
//! - [`Document`]: The stored unit: id, name, JSON content, owner, timestamps
//! - [`NewDocument`] / [`DocumentPatch`]: Create and partial-update inputs

pub mod document;
pub mod error;
pub mod identity;
pub mod scope;

pub use document::{Document, DocumentPatch, NewDocument};
pub use error::TypeError;
pub use identity::{AccountId, ApiKey, DocumentId};
pub use scope::OwnerScope;
