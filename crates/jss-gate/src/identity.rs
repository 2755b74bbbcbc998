use std::fmt;
use std::sync::Arc;

use jss_accounts::{Account, AccountRegistry, AccountResult};
use jss_types::{AccountId, ApiKey, OwnerScope};
use tracing::debug;

use crate::error::{GateError, GateResult};

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// What an inbound request presented as proof of identity.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    ApiKey(String),
    Anonymous,
}

impl Credentials {
    /// Pick the credential from a header value, falling back to a query
    /// parameter. Empty values count as absent.
    pub fn from_parts(header: Option<&str>, query: Option<&str>) -> Self {
        header
            .filter(|k| !k.is_empty())
            .or(query.filter(|k| !k.is_empty()))
            .map_or(Self::Anonymous, |k| Self::ApiKey(k.to_string()))
    }

    pub fn api_key(key: impl Into<String>) -> Self {
        let key = key.into();
        if key.is_empty() {
            Self::Anonymous
        } else {
            Self::ApiKey(key)
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("Credentials::ApiKey(<redacted>)"),
            Self::Anonymous => f.write_str("Credentials::Anonymous"),
        }
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A resolved caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identity {
    /// Holder of the administrative credential. Acts in the unscoped scope.
    Administrator,
    /// A registered account.
    Account {
        id: AccountId,
        email: String,
        api_key: ApiKey,
    },
}

impl Identity {
    /// The owner scope this identity acts in.
    pub fn scope(&self) -> OwnerScope {
        match self {
            Self::Administrator => OwnerScope::Unscoped,
            Self::Account { id, .. } => OwnerScope::Account(*id),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Administrator)
    }

    /// Short label for logs.
    pub fn label(&self) -> String {
        match self {
            Self::Administrator => OwnerScope::UNSCOPED_TAG.to_string(),
            Self::Account { id, .. } => id.to_string(),
        }
    }
}

impl From<Account> for Identity {
    fn from(account: Account) -> Self {
        Self::Account {
            id: account.id,
            email: account.email,
            api_key: account.api_key,
        }
    }
}

// ---------------------------------------------------------------------------
// CredentialDirectory
// ---------------------------------------------------------------------------

/// Source of per-account credentials.
pub trait CredentialDirectory: Send + Sync {
    /// The account a key was issued to, if any.
    fn account_for_key(&self, key: &str) -> AccountResult<Option<Account>>;
}

impl CredentialDirectory for AccountRegistry {
    fn account_for_key(&self, key: &str) -> AccountResult<Option<Account>> {
        self.by_api_key(key)
    }
}

// ---------------------------------------------------------------------------
// IdentityResolver
// ---------------------------------------------------------------------------

/// Maps credentials to identities.
///
/// The administrative key is injected at construction and held only as a
/// BLAKE3 digest. Digests are compared with `blake3::Hash`'s constant-time
/// equality.
pub struct IdentityResolver {
    admin_digest: Option<blake3::Hash>,
    directory: Arc<dyn CredentialDirectory>,
}

impl IdentityResolver {
    pub fn new(admin_api_key: Option<&str>, directory: Arc<dyn CredentialDirectory>) -> Self {
        let admin_digest = admin_api_key
            .filter(|k| !k.is_empty())
            .map(|k| blake3::hash(k.as_bytes()));
        Self {
            admin_digest,
            directory,
        }
    }

    /// Whether an administrative credential is configured.
    pub fn has_admin(&self) -> bool {
        self.admin_digest.is_some()
    }

    /// Resolve a credential. Directory failures propagate unchanged.
    pub fn resolve(&self, credentials: &Credentials) -> GateResult<Identity> {
        let key = match credentials {
            Credentials::ApiKey(k) if !k.is_empty() => k,
            _ => return Err(GateError::MissingCredential),
        };

        if let Some(admin) = &self.admin_digest {
            if blake3::hash(key.as_bytes()) == *admin {
                return Ok(Identity::Administrator);
            }
        }

        match self.directory.account_for_key(key)? {
            Some(account) => {
                debug!(account = %account.id, "credential resolved");
                Ok(account.into())
            }
            None => Err(GateError::InvalidCredential),
        }
    }
}

impl fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("has_admin", &self.has_admin())
            .finish_non_exhaustive()
    }
}
