use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use jss_types::AccountId;

use crate::account::Account;
use crate::error::{AccountError, AccountResult};
use crate::traits::AccountStore;

/// Primary map plus the two unique secondary indexes.
#[derive(Debug, Default)]
pub(crate) struct AccountIndex {
    accounts: HashMap<AccountId, Account>,
    by_email: HashMap<String, AccountId>,
    by_key: HashMap<String, AccountId>,
}

impl AccountIndex {
    /// Fail if `account` would break id, email, or key uniqueness.
    pub(crate) fn check_unique(&self, account: &Account) -> AccountResult<()> {
        if self.by_email.contains_key(&account.email) {
            return Err(AccountError::DuplicateEmail(account.email.clone()));
        }
        if self.by_key.contains_key(account.api_key.as_str())
            || self.accounts.contains_key(&account.id)
        {
            return Err(AccountError::DuplicateApiKey);
        }
        Ok(())
    }

    /// Index an account whose uniqueness has already been checked.
    pub(crate) fn insert_checked(&mut self, account: Account) {
        self.by_email.insert(account.email.clone(), account.id);
        self.by_key
            .insert(account.api_key.as_str().to_string(), account.id);
        self.accounts.insert(account.id, account);
    }

    pub(crate) fn get(&self, id: &AccountId) -> Option<Account> {
        self.accounts.get(id).cloned()
    }

    pub(crate) fn by_email(&self, email: &str) -> Option<Account> {
        self.by_email.get(email).and_then(|id| self.get(id))
    }

    pub(crate) fn by_key(&self, key: &str) -> Option<Account> {
        self.by_key.get(key).and_then(|id| self.get(id))
    }

    pub(crate) fn len(&self) -> usize {
        self.accounts.len()
    }
}

pub(crate) fn read_index(
    lock: &RwLock<AccountIndex>,
) -> AccountResult<RwLockReadGuard<'_, AccountIndex>> {
    lock.read()
        .map_err(|e| AccountError::Unavailable(format!("lock poisoned: {e}")))
}

pub(crate) fn write_index(
    lock: &RwLock<AccountIndex>,
) -> AccountResult<RwLockWriteGuard<'_, AccountIndex>> {
    lock.write()
        .map_err(|e| AccountError::Unavailable(format!("lock poisoned: {e}")))
}

/// In-memory account store. Data is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    index: RwLock<AccountIndex>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn insert(&self, account: &Account) -> AccountResult<()> {
        let mut index = write_index(&self.index)?;
        index.check_unique(account)?;
        index.insert_checked(account.clone());
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
        "memory"
    }
}
