use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use jss_types::{Document, DocumentId};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::traits::RecordStore;

const RECORD_EXTENSION: &str = "json";

/// Directory-backed record store: one `<id>.json` file per document.
///
/// Writes go to a temporary file in the same directory which is synced and
/// then renamed over the target, so a reader sees either the previous record
/// or the new one.
#[derive(Debug)]
pub struct FileRecordStore {
    dir: PathBuf,
}

impl FileRecordStore {
    /// Open (or create) a record directory.
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| {
            StoreError::Unavailable(format!("cannot create {}: {e}", dir.display()))
        })?;
        if !dir.is_dir() {
            return Err(StoreError::Unavailable(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
        debug!(dir = %dir.display(), "opened document directory");
        Ok(Self { dir })
    }

    /// The directory holding the records.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &DocumentId) -> PathBuf {
        self.dir.join(format!("{id}.{RECORD_EXTENSION}"))
    }
}

impl RecordStore for FileRecordStore {
    fn load(&self, id: &DocumentId) -> StoreResult<Option<Document>> {
        let bytes = match fs::read(self.path_for(id)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let doc: Document =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::CorruptRecord {
                id: id.to_string(),
                reason: e.to_string(),
            })?;
        if doc.id != *id {
            return Err(StoreError::CorruptRecord {
                id: id.to_string(),
                reason: format!("record carries id {}", doc.id),
            });
        }
        Ok(Some(doc))
    }

    fn save(&self, doc: &Document) -> StoreResult<()> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer_pretty(&mut tmp, doc)
            .map_err(|e| StoreError::Unavailable(format!("write {}: {e}", doc.id)))?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path_for(&doc.id)).map_err(|e| e.error)?;
        Ok(())
    }

    fn remove(&self, id: &DocumentId) -> StoreResult<bool> {
        match fs::remove_file(self.path_for(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn ids(&self) -> StoreResult<Vec<DocumentId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match DocumentId::parse(stem) {
                Ok(id) => ids.push(id),
                Err(_) => warn!(path = %path.display(), "skipping foreign file in document directory"),
            }
        }
        Ok(ids)
    }

    fn contains(&self, id: &DocumentId) -> StoreResult<bool> {
        Ok(self.path_for(id).try_exists()?)
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
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
            NewDocument::new(name, json!({"n": name, "nested": {"k": [1, 2]}})),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn save_load_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRecordStore::open(dir.path()).unwrap();
        let doc = make_doc("a");
        store.save(&doc).unwrap();
        assert!(store.contains(&doc.id).unwrap());
        assert_eq!(store.load(&doc.id).unwrap(), Some(doc.clone()));
        assert!(store.remove(&doc.id).unwrap());
        assert!(!store.remove(&doc.id).unwrap());
        assert!(store.load(&doc.id).unwrap().is_none());
    }

    #[test]
    fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let doc = make_doc("persisted");
        {
            let store = FileRecordStore::open(dir.path()).unwrap();
            store.save(&doc).unwrap();
        }
        let store = FileRecordStore::open(dir.path()).unwrap();
        assert_eq!(store.ids().unwrap(), vec![doc.id]);
        assert_eq!(store.load(&doc.id).unwrap(), Some(doc));
    }

    #[test]
    fn open_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileRecordStore::open(&nested).unwrap();
        assert!(nested.is_dir());
        assert!(store.ids().unwrap().is_empty());
    }

    #[test]
    fn open_rejects_a_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        fs::write(&file, b"x").unwrap();
        let err = FileRecordStore::open(&file).unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn garbage_record_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRecordStore::open(dir.path()).unwrap();
        let id = DocumentId::generate();
        fs::write(dir.path().join(format!("{id}.json")), b"{not json").unwrap();
        assert!(matches!(
            store.load(&id),
            Err(StoreError::CorruptRecord { .. })
        ));
    }

    #[test]
    fn misfiled_record_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRecordStore::open(dir.path()).unwrap();
        let doc = make_doc("a");
        let other = DocumentId::generate();
        fs::write(
            dir.path().join(format!("{other}.json")),
            serde_json::to_vec(&doc).unwrap(),
        )
        .unwrap();
        assert!(matches!(
            store.load(&other),
            Err(StoreError::CorruptRecord { .. })
        ));
    }

    #[test]
    fn ids_skips_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRecordStore::open(dir.path()).unwrap();
        let doc = make_doc("a");
        store.save(&doc).unwrap();
        fs::write(dir.path().join("README.txt"), b"hi").unwrap();
        fs::write(dir.path().join("notes.json"), b"{}").unwrap();
        assert_eq!(store.ids().unwrap(), vec![doc.id]);
    }

    #[test]
    fn no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRecordStore::open(dir.path()).unwrap();
        for i in 0..3 {
            store.save(&make_doc(&format!("d{i}"))).unwrap();
        }
        let count = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(count, 3);
    }
}
