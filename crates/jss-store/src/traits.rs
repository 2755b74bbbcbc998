use jss_types::{Document, DocumentId};

use crate::error::StoreResult;

/// Raw record persistence beneath the [`DocumentStore`](crate::DocumentStore).
///
/// Backends persist whole records keyed by document id and know nothing
/// about owners or locking. Implementations must satisfy:
/// - `save` replaces a record atomically: a concurrent `load` sees either the
///   old record or the new one, never a mix.
/// - Undecodable records surface as `CorruptRecord`, never as `None`.
/// - All I/O errors are propagated, never silently ignored.
pub trait RecordStore: Send + Sync {
    /// Read a record by id. Returns `Ok(None)` if it does not exist.
    fn load(&self, id: &DocumentId) -> StoreResult<Option<Document>>;

    /// Insert or replace a record.
    fn save(&self, doc: &Document) -> StoreResult<()>;

    /// Remove a record. Returns `true` if it existed.
    fn remove(&self, id: &DocumentId) -> StoreResult<bool>;

    /// Ids of every stored record, in no particular order.
    fn ids(&self) -> StoreResult<Vec<DocumentId>>;

    /// Check whether a record exists.
    ///
    /// Default implementation loads the record. Backends may override with a
    /// cheaper check.
    fn contains(&self, id: &DocumentId) -> StoreResult<bool> {
        Ok(self.load(id)?.is_some())
    }

    /// Short backend name reported by the health endpoint.
    fn backend_name(&self) -> &'static str;
}
