use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use jss_types::{Document, DocumentId};

use crate::error::{StoreError, StoreResult};
use crate::traits::RecordStore;

/// In-memory, HashMap-based record store.
///
/// Intended for tests and single-process deployments without a data
/// directory. Records are cloned on read/write, so a reader never holds a
/// reference into a record being replaced.
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<DocumentId, Document>>,
}

impl InMemoryRecordStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.read_map().map(|m| m.len()).unwrap_or(0)
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_map(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<DocumentId, Document>>> {
        self.records
            .read()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))
    }

    fn write_map(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<DocumentId, Document>>> {
        self.records
            .write()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn load(&self, id: &DocumentId) -> StoreResult<Option<Document>> {
        Ok(self.read_map()?.get(id).cloned())
    }

    fn save(&self, doc: &Document) -> StoreResult<()> {
        self.write_map()?.insert(doc.id, doc.clone());
        Ok(())
    }

    fn remove(&self, id: &DocumentId) -> StoreResult<bool> {
        Ok(self.write_map()?.remove(id).is_some())
    }

    fn ids(&self) -> StoreResult<Vec<DocumentId>> {
        Ok(self.read_map()?.keys().copied().collect())
    }

    fn contains(&self, id: &DocumentId) -> StoreResult<bool> {
        Ok(self.read_map()?.contains_key(id))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

impl std::fmt::Debug for InMemoryRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRecordStore")
            .field("record_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jss_types::{NewDocument, OwnerScope};
    use serde_json::json;

    fn make_doc(name: &str) -> Document {
        Document::create(
            DocumentId::generate(),
            OwnerScope::Unscoped,
            NewDocument::new(name, json!({"n": name})),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn save_and_load() {
        let store = InMemoryRecordStore::new();
        let doc = make_doc("a");
        store.save(&doc).unwrap();
        assert_eq!(store.load(&doc.id).unwrap(), Some(doc.clone()));
        assert!(store.contains(&doc.id).unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn load_missing_returns_none() {
        let store = InMemoryRecordStore::new();
        assert!(store.load(&DocumentId::generate()).unwrap().is_none());
    }

    #[test]
    fn save_replaces() {
        let store = InMemoryRecordStore::new();
        let mut doc = make_doc("a");
        store.save(&doc).unwrap();
        doc.name = "b".into();
        store.save(&doc).unwrap();
        assert_eq!(store.load(&doc.id).unwrap().unwrap().name, "b");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_reports_existence() {
        let store = InMemoryRecordStore::new();
        let doc = make_doc("a");
        store.save(&doc).unwrap();
        assert!(store.remove(&doc.id).unwrap());
        assert!(!store.remove(&doc.id).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn ids_lists_everything() {
        let store = InMemoryRecordStore::new();
        let docs: Vec<_> = (0..5).map(|i| make_doc(&format!("d{i}"))).collect();
        for d in &docs {
            store.save(d).unwrap();
        }
        let mut ids = store.ids().unwrap();
        ids.sort();
        let mut expected: Vec<_> = docs.iter().map(|d| d.id).collect();
        expected.sort();
        assert_eq!(ids, expected);
    }
}
