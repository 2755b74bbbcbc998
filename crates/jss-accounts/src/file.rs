use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use jss_types::AccountId;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::account::Account;
use crate::error::{AccountError, AccountResult};
use crate::memory::{read_index, write_index, AccountIndex};
use crate::traits::AccountStore;

/// Directory-backed account store: one `<id>.json` file per account.
///
/// All records are loaded into an in-memory index at open. `insert` writes
/// the record file before touching the index, under the index write lock, so
/// a failed write leaves neither a file nor an index entry behind.
#[derive(Debug)]
pub struct FileAccountStore {
    dir: PathBuf,
    index: RwLock<AccountIndex>,
}

impl FileAccountStore {
    /// Open (or create) an account directory and load every record.
    ///
    /// Any undecodable record, or two records sharing an email or key, fails
    /// the open.
    pub fn open(dir: impl AsRef<Path>) -> AccountResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| {
            AccountError::Unavailable(format!("cannot create {}: {e}", dir.display()))
        })?;

        let mut index = AccountIndex::default();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let account = load_record(&path)?;
            index
                .check_unique(&account)
                .map_err(|e| AccountError::CorruptRecord {
                    id: account.id.to_string(),
                    reason: e.to_string(),
                })?;
            index.insert_checked(account);
        }
        info!(dir = %dir.display(), accounts = index.len(), "loaded account directory");

        Ok(Self {
            dir,
            index: RwLock::new(index),
        })
    }

    fn path_for(&self, id: &AccountId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn write_record(&self, account: &Account) -> AccountResult<()> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer_pretty(&mut tmp, account)
            .map_err(|e| AccountError::Unavailable(format!("write {}: {e}", account.id)))?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path_for(&account.id)).map_err(|e| e.error)?;
        Ok(())
    }
}

fn load_record(path: &Path) -> AccountResult<Account> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| AccountError::CorruptRecord {
        id: path.display().to_string(),
        reason: e.to_string(),
    })
}

impl AccountStore for FileAccountStore {
    fn insert(&self, account: &Account) -> AccountResult<()> {
        let mut index = write_index(&self.index)?;
        index.check_unique(account)?;
        self.write_record(account)?;
        index.insert_checked(account.clone());
        debug!(id = %account.id, "account record written");
        Ok(())
    }

    fn get(&self, id: &AccountId) -> AccountResult<Option<Account>> {
        Ok(read_index(&self.index)?.get(id))
    }

    fn by_email(&self, email: &str) -> AccountResult<Option<Account>> {
        Ok(read_index(&self.index)?.by_email(email))
    }

    fn by_api_key(&self, key: &str) -> AccountResult<Option<Account>> {
        Ok(read_index(&self.index)?.by_key(key))
    }

    fn len(&self) -> AccountResult<usize> {
        Ok(read_index(&self.index)?.len())
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}
