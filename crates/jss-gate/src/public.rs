use std::sync::Arc;

use jss_store::{DocumentStore, StoreResult};
use serde_json::Value;

/// Credential-free, read-only view of document content.
///
/// Returns only the stored JSON value. Name, owner, and timestamps never
/// leave through this path. Absent ids fail with `NotFound` and nothing
/// else, since there is no credential to reject.
#[derive(Debug, Clone)]
pub struct PublicProjection {
    documents: Arc<DocumentStore>,
}

impl PublicProjection {
    pub fn new(documents: Arc<DocumentStore>) -> Self {
        Self { documents }
    }

    pub fn content(&self, id: &str) -> StoreResult<Value> {
        self.documents.content(id)
    }
}
