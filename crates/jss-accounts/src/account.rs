use std::fmt;

use chrono::{DateTime, Utc};
use jss_types::{AccountId, ApiKey, OwnerScope};
use serde::{Deserialize, Serialize};

/// A registered account as persisted.
///
/// This is the storage record and includes the password hash. Never send it
/// to a client as-is.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Normalized (trimmed, lowercased) email. Unique across accounts.
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Issued credential. Unique across accounts, never rotated.
    pub api_key: ApiKey,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// The owner scope requests authenticated as this account act in.
    pub fn scope(&self) -> OwnerScope {
        OwnerScope::Account(self.id)
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("api_key", &self.api_key)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Case-fold an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
