//! Per-document lock table.
//!
//! Each document id maps to its own `RwLock<()>`. Writers on one id are
//! serialized; operations on different ids never contend beyond the brief
//! table lookup.
//!
//! Entries exist only while some caller holds a [`KeyHandle`] for the id.
//! The last handle to drop removes the entry, so lookups of missing ids
//! leave nothing behind.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use jss_types::DocumentId;

type KeyLock = Arc<RwLock<()>>;

#[derive(Debug)]
struct Entry {
    lock: KeyLock,
    holders: usize,
}

/// Table of per-document locks.
#[derive(Debug, Default)]
pub struct KeyLocks {
    table: Mutex<HashMap<DocumentId, Entry>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch (or create) the lock for `id`.
    pub fn handle(&self, id: &DocumentId) -> KeyHandle<'_> {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = table.entry(*id).or_insert_with(|| Entry {
            lock: KeyLock::default(),
            holders: 0,
        });
        entry.holders += 1;
        KeyHandle {
            locks: self,
            id: *id,
            lock: Arc::clone(&entry.lock),
        }
    }

    /// Number of ids currently tracked.
    pub fn len(&self) -> usize {
        self.table.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn release(&self, id: &DocumentId) {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = table.get_mut(id) {
            entry.holders = entry.holders.saturating_sub(1);
            if entry.holders == 0 {
                table.remove(id);
            }
        }
    }
}

/// A caller's claim on one document's lock.
///
/// Guards taken from the handle borrow it, so they are always released
/// before the handle itself drops.
pub struct KeyHandle<'a> {
    locks: &'a KeyLocks,
    id: DocumentId,
    lock: KeyLock,
}

impl KeyHandle<'_> {
    /// Acquire the shared half.
    ///
    /// The lock guards no data, so a poisoned lock is simply recovered.
    pub fn read(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquire the exclusive half.
    pub fn write(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for KeyHandle<'_> {
    fn drop(&mut self) {
        self.locks.release(&self.id);
    }
}

impl std::fmt::Debug for KeyHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyHandle").field("id", &self.id).finish()
    }
}
