use std::sync::Arc;

use chrono::Utc;
use jss_types::{Document, DocumentId, DocumentPatch, NewDocument, OwnerScope};
use serde_json::Value;
use tracing::debug;

use crate::commit::CommitToken;
use crate::error::{StoreError, StoreResult};
use crate::locks::KeyLocks;
use crate::memory::InMemoryRecordStore;
use crate::traits::RecordStore;

/// Attempts at drawing a fresh id before giving up on `create`.
const MAX_ID_ATTEMPTS: usize = 8;

/// Scope-aware document store.
///
/// Owns the mapping from document id to document and enforces the
/// visibility rule: a caller in scope `S` sees a document owned by `O` only
/// if `S` is unscoped or `S == O`. Anything not visible is reported as
/// [`StoreError::NotFound`], exactly like a missing document.
///
/// Every mutation holds the document's write lock for its whole
/// read-modify-write cycle; `get` and `list` take the read half per
/// document, so they never observe a record mid-mutation.
pub struct DocumentStore {
    records: Arc<dyn RecordStore>,
    locks: KeyLocks,
}

impl DocumentStore {
    /// Create a store over the given record backend.
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self {
            records,
            locks: KeyLocks::new(),
        }
    }

    /// A store backed by an [`InMemoryRecordStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryRecordStore::new()))
    }

    /// Name of the record backend ("memory", "filesystem", ...).
    pub fn backend_name(&self) -> &'static str {
        self.records.backend_name()
    }

    /// Create a document owned by `scope`.
    ///
    /// Names need not be unique; only ids are.
    pub fn create(&self, scope: &OwnerScope, input: NewDocument) -> StoreResult<Document> {
        self.create_with(scope, input, &CommitToken::unbounded())
    }

    /// [`create`](Self::create), writing only if `token` allows the commit.
    pub fn create_with(
        &self,
        scope: &OwnerScope,
        input: NewDocument,
        token: &CommitToken,
    ) -> StoreResult<Document> {
        let input = input.validated()?;
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = DocumentId::generate();
            let handle = self.locks.handle(&id);
            let _guard = handle.write();
            if self.records.contains(&id)? {
                continue;
            }
            let doc = Document::create(id, *scope, input, Utc::now())?;
            token.begin_commit()?;
            self.records.save(&doc)?;
            debug!(id = %doc.id, owner = %doc.owner, "document created");
            return Ok(doc);
        }
        Err(StoreError::Unavailable(
            "could not allocate a unique document id".into(),
        ))
    }

    /// Fetch a document visible to `scope`.
    pub fn get(&self, scope: &OwnerScope, id: &str) -> StoreResult<Document> {
        let id = parse_id(id)?;
        let handle = self.locks.handle(&id);
        let _guard = handle.read();
        self.load_visible(scope, &id)
    }

    /// Apply a partial update to a document visible to `scope`.
    ///
    /// Last writer wins: concurrent updates are serialized, each applied in
    /// full against the state left by the previous one.
    pub fn update(
        &self,
        scope: &OwnerScope,
        id: &str,
        patch: DocumentPatch,
    ) -> StoreResult<Document> {
        self.update_with(scope, id, patch, &CommitToken::unbounded())
    }

    /// [`update`](Self::update), writing only if `token` allows the commit.
    pub fn update_with(
        &self,
        scope: &OwnerScope,
        id: &str,
        patch: DocumentPatch,
        token: &CommitToken,
    ) -> StoreResult<Document> {
        let id = parse_id(id)?;
        let handle = self.locks.handle(&id);
        let _guard = handle.write();
        let mut doc = self.load_visible(scope, &id)?;
        patch.apply(&mut doc, Utc::now());
        token.begin_commit()?;
        self.records.save(&doc)?;
        debug!(id = %doc.id, "document updated");
        Ok(doc)
    }

    /// Remove a document visible to `scope`.
    ///
    /// Deleting an already-deleted or invisible id fails with `NotFound`.
    pub fn delete(&self, scope: &OwnerScope, id: &str) -> StoreResult<()> {
        self.delete_with(scope, id, &CommitToken::unbounded())
    }

    /// [`delete`](Self::delete), removing only if `token` allows the commit.
    pub fn delete_with(&self, scope: &OwnerScope, id: &str, token: &CommitToken) -> StoreResult<()> {
        let id = parse_id(id)?;
        let handle = self.locks.handle(&id);
        let _guard = handle.write();
        self.load_visible(scope, &id)?;
        token.begin_commit()?;
        if !self.records.remove(&id)? {
            return Err(StoreError::NotFound(id.to_string()));
        }
        debug!(id = %id, "document deleted");
        Ok(())
    }

    /// Every document visible to `scope`, oldest first.
    pub fn list(&self, scope: &OwnerScope) -> StoreResult<Vec<Document>> {
        let mut docs = Vec::new();
        for id in self.records.ids()? {
            let handle = self.locks.handle(&id);
            let _guard = handle.read();
            // Deleted between `ids()` and now.
            let Some(doc) = self.records.load(&id)? else {
                continue;
            };
            if scope.can_access(&doc.owner) {
                docs.push(doc);
            }
        }
        docs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(docs)
    }

    /// Content of any document, with no scope restriction.
    ///
    /// Backs the public projection; metadata is not returned.
    pub fn content(&self, id: &str) -> StoreResult<Value> {
        self.get(&OwnerScope::Unscoped, id).map(|doc| doc.data)
    }

    fn load_visible(&self, scope: &OwnerScope, id: &DocumentId) -> StoreResult<Document> {
        match self.records.load(id)? {
            Some(doc) if scope.can_access(&doc.owner) => Ok(doc),
            _ => Err(StoreError::NotFound(id.to_string())),
        }
    }
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("backend", &self.backend_name())
            .field("tracked_locks", &self.locks.len())
            .finish()
    }
}

/// Unparseable ids cannot name any document.
fn parse_id(id: &str) -> StoreResult<DocumentId> {
    DocumentId::parse(id).map_err(|_| StoreError::NotFound(id.to_string()))
}
