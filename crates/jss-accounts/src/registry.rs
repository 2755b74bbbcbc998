use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use jss_types::{AccountId, ApiKey};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::account::{normalize_email, Account};
use crate::error::{AccountError, AccountResult};
use crate::file::FileAccountStore;
use crate::memory::InMemoryAccountStore;
use crate::password::{HashingParams, PasswordHashing};
use crate::traits::AccountStore;

/// Attempts at issuing a key that no other account holds.
const MAX_KEY_ATTEMPTS: usize = 4;

/// Registry policy knobs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Minimum password length in characters.
    pub min_password_len: usize,
    pub hashing: HashingParams,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            min_password_len: 6,
            hashing: HashingParams::default(),
        }
    }
}

/// Registration, login, and API-key lookup over an [`AccountStore`].
pub struct AccountRegistry {
    store: Arc<dyn AccountStore>,
    hashing: PasswordHashing,
    config: RegistryConfig,
}

impl AccountRegistry {
    pub fn new(store: Arc<dyn AccountStore>, config: RegistryConfig) -> AccountResult<Self> {
        let hashing = PasswordHashing::new(&config.hashing)?;
        Ok(Self {
            store,
            hashing,
            config,
        })
    }

    /// A registry whose accounts live only as long as the process.
    pub fn in_memory(config: RegistryConfig) -> AccountResult<Self> {
        Self::new(Arc::new(InMemoryAccountStore::new()), config)
    }

    /// A registry persisted under `dir`.
    pub fn open(dir: impl AsRef<Path>, config: RegistryConfig) -> AccountResult<Self> {
        Self::new(Arc::new(FileAccountStore::open(dir)?), config)
    }

    /// Create an account and issue its API key.
    ///
    /// The email is stored normalized. On any error no account exists
    /// afterwards.
    pub fn register(&self, email: &str, password: &str) -> AccountResult<Account> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AccountError::MissingFields);
        }
        if password.chars().count() < self.config.min_password_len {
            return Err(AccountError::WeakPassword {
                min_len: self.config.min_password_len,
            });
        }
        // Skip the hashing cost for the common duplicate case. The store
        // re-checks atomically on insert.
        if self.store.by_email(&email)?.is_some() {
            return Err(AccountError::DuplicateEmail(email));
        }

        let password_hash = self.hashing.hash(password)?;
        let created_at = Utc::now();

        for attempt in 1..=MAX_KEY_ATTEMPTS {
            let account = Account {
                id: AccountId::generate(),
                email: email.clone(),
                password_hash: password_hash.clone(),
                api_key: ApiKey::generate(),
                created_at,
            };
            match self.store.insert(&account) {
                Ok(()) => {
                    info!(id = %account.id, key = %account.api_key.hint(), "account registered");
                    return Ok(account);
                }
                Err(AccountError::DuplicateApiKey) => {
                    warn!(attempt, "issued API key collided, retrying");
                }
                Err(e) => return Err(e),
            }
        }
        Err(AccountError::DuplicateApiKey)
    }

    /// Check credentials and return the account.
    ///
    /// Unknown email and wrong password are indistinguishable.
    pub fn login(&self, email: &str, password: &str) -> AccountResult<Account> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AccountError::MissingFields);
        }
        let Some(account) = self.store.by_email(&email)? else {
            debug!("login for unknown email");
            return Err(AccountError::InvalidCredentials);
        };
        if !self.hashing.verify(password, &account.password_hash)? {
            debug!(id = %account.id, "login with wrong password");
            return Err(AccountError::InvalidCredentials);
        }
        Ok(account)
    }

    pub fn get(&self, id: &AccountId) -> AccountResult<Option<Account>> {
        self.store.get(id)
    }

    /// Find the account an API key was issued to.
    pub fn by_api_key(&self, key: &str) -> AccountResult<Option<Account>> {
        if key.is_empty() {
            return Ok(None);
        }
        self.store.by_api_key(key)
    }

    pub fn len(&self) -> AccountResult<usize> {
        self.store.len()
    }

    pub fn is_empty(&self) -> AccountResult<bool> {
        self.store.is_empty()
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }
}

impl std::fmt::Debug for AccountRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountRegistry")
            .field("backend", &self.store.backend_name())
            .field("config", &self.config)
            .finish()
    }
}
