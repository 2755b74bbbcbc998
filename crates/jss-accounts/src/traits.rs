use jss_types::AccountId;

use crate::account::Account;
use crate::error::AccountResult;

/// Persistence for account records.
///
/// `insert` must check email and API-key uniqueness and write the record as
/// one atomic step: either the account is fully stored and indexed, or
/// nothing changes.
pub trait AccountStore: Send + Sync {
    /// Store a new account. Fails with `DuplicateEmail` / `DuplicateApiKey`.
    fn insert(&self, account: &Account) -> AccountResult<()>;

    fn get(&self, id: &AccountId) -> AccountResult<Option<Account>>;

    /// Look up by normalized email.
    fn by_email(&self, email: &str) -> AccountResult<Option<Account>>;

    /// Look up by issued API key.
    fn by_api_key(&self, key: &str) -> AccountResult<Option<Account>>;

    /// Number of registered accounts.
    fn len(&self) -> AccountResult<usize>;

    fn is_empty(&self) -> AccountResult<bool> {
        Ok(self.len()? == 0)
    }

    fn backend_name(&self) -> &'static str;
}
