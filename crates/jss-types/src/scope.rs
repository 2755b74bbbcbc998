use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::identity::AccountId;

/// The logical partition a document or request belongs to.
///
/// On the wire the unscoped value is the literal `"global"`; an account
/// scope is the account's UUID. The two can never collide because `"global"`
/// is not a valid UUID.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum OwnerScope {
    /// The administrative scope: sees and acts on every document.
    Unscoped,
    /// A specific registered account.
    Account(AccountId),
}

impl OwnerScope {
    /// Wire tag for [`OwnerScope::Unscoped`].
    pub const UNSCOPED_TAG: &'static str = "global";

    pub fn is_unscoped(&self) -> bool {
        matches!(self, Self::Unscoped)
    }

    /// The account behind this scope, if any.
    pub fn account(&self) -> Option<&AccountId> {
        match self {
            Self::Unscoped => None,
            Self::Account(id) => Some(id),
        }
    }

    /// Whether a request in this scope may see a document owned by `owner`.
    ///
    /// The unscoped scope sees everything; an account scope sees only its
    /// own documents.
    pub fn can_access(&self, owner: &OwnerScope) -> bool {
        match self {
            Self::Unscoped => true,
            Self::Account(_) => self == owner,
        }
    }

    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if s == Self::UNSCOPED_TAG {
            return Ok(Self::Unscoped);
        }
        AccountId::parse(s)
            .map(Self::Account)
            .map_err(|_| TypeError::InvalidScope(s.to_string()))
    }
}

impl From<AccountId> for OwnerScope {
    fn from(id: AccountId) -> Self {
        Self::Account(id)
    }
}

impl From<OwnerScope> for String {
    fn from(scope: OwnerScope) -> Self {
        scope.to_string()
    }
}

impl TryFrom<String> for OwnerScope {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl fmt::Debug for OwnerScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unscoped => write!(f, "OwnerScope(unscoped)"),
            Self::Account(id) => write!(f, "OwnerScope({id:?})"),
        }
    }
}

impl fmt::Display for OwnerScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unscoped => f.write_str(Self::UNSCOPED_TAG),
            Self::Account(id) => write!(f, "{id}"),
        }
    }
}
