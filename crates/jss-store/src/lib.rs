//! Document storage for the JSON Storage Server.
//!
//! [`DocumentStore`] maps document ids to documents and is the single place
//! where owner-scope visibility is enforced. Persistence is delegated to a
//! [`RecordStore`] backend.
//!
//! # Storage Backends
//!
//! - [`InMemoryRecordStore`] -- `HashMap`-based store for tests and embedding
//! - [`FileRecordStore`] -- one JSON file per document, atomic replace on write
//!
//! # Design Rules
//!
//! 1. At most one mutation per document id is in flight at any time.
//! 2. Reads never observe a document mid-mutation.
//! 3. Operations on different ids run in parallel; there is no store-wide lock.
//! 4. Invisible and missing documents are both `NotFound`.
//! 5. Nothing is retried internally; medium failures surface as `Unavailable`.
//! 6. A mutation whose [`CommitToken`] was abandoned writes nothing.

pub mod commit;
pub mod error;
pub mod file;
pub mod locks;
pub mod memory;
pub mod store;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use commit::CommitToken;
pub use error::{StoreError, StoreResult};
pub use file::FileRecordStore;
pub use locks::{KeyHandle, KeyLocks};
pub use memory::InMemoryRecordStore;
pub use store::DocumentStore;
pub use traits::RecordStore;
