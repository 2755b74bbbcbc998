//! Commit gate shared between a storage call and the caller waiting on it.
//!
//! A mutation calls [`CommitToken::begin_commit`] after taking the key lock
//! and before touching the medium. A waiter that gives up calls
//! [`CommitToken::abandon`]. Exactly one of the two wins, so a caller told
//! the call was abandoned can rely on nothing having been written.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::error::{StoreError, StoreResult};

const OPEN: u8 = 0;
const COMMITTING: u8 = 1;
const ABANDONED: u8 = 2;

#[derive(Clone, Debug, Default)]
pub struct CommitToken {
    state: Option<Arc<AtomicU8>>,
}

impl CommitToken {
    /// A token that can never be abandoned.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// A token a waiter may abandon.
    pub fn abandonable() -> Self {
        Self {
            state: Some(Arc::new(AtomicU8::new(OPEN))),
        }
    }

    /// Claim the right to write. Fails once the waiter has abandoned the call.
    pub fn begin_commit(&self) -> StoreResult<()> {
        let Some(state) = &self.state else {
            return Ok(());
        };
        match state.compare_exchange(OPEN, COMMITTING, Ordering::AcqRel, Ordering::Acquire) {
            Ok(_) | Err(COMMITTING) => Ok(()),
            Err(_) => Err(StoreError::Unavailable(
                "storage call abandoned before commit".into(),
            )),
        }
    }

    /// Give up on the call. Returns `false` when a commit already started,
    /// in which case the caller must wait for its outcome.
    pub fn abandon(&self) -> bool {
        let Some(state) = &self.state else {
            return false;
        };
        match state.compare_exchange(OPEN, ABANDONED, Ordering::AcqRel, Ordering::Acquire) {
            Ok(_) | Err(ABANDONED) => true,
            Err(_) => false,
        }
    }
}
