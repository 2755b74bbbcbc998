//! Account registry for the JSON Storage Server.
//!
//! Accounts are created with an email and password and receive an issued
//! API key. The key is the credential every later document request presents;
//! the password only serves to recover the key via login.
//!
//! Backends implement [`AccountStore`]: [`InMemoryAccountStore`] for
//! ephemeral servers and tests, [`FileAccountStore`] for a data directory.

pub mod account;
pub mod error;
pub mod file;
pub mod memory;
pub mod password;
pub mod registry;
pub mod traits;

pub use account::{normalize_email, Account};
pub use error::{AccountError, AccountResult};
pub use file::FileAccountStore;
pub use memory::InMemoryAccountStore;
pub use password::{HashingParams, PasswordHashing};
pub use registry::{AccountRegistry, RegistryConfig};
pub use traits::AccountStore;
