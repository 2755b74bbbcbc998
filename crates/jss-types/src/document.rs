use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TypeError;
use crate::identity::DocumentId;
use crate::scope::OwnerScope;

/// A stored JSON document together with its metadata.
///
/// Serialized as `{id, user_id, name, data, created_at, updated_at}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    #[serde(rename = "user_id")]
    pub owner: OwnerScope,
    pub name: String,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Build a fresh document owned by `owner`, stamped at `now`.
    pub fn create(
        id: DocumentId,
        owner: OwnerScope,
        input: NewDocument,
        now: DateTime<Utc>,
    ) -> Result<Self, TypeError> {
        let input = input.validated()?;
        Ok(Self {
            id,
            owner,
            name: input.name,
            data: input.data.unwrap_or_else(empty_object),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Input for creating a document. Request body `{name, data}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl NewDocument {
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self {
            name: name.into(),
            data: Some(data),
        }
    }

    /// Reject an empty name and normalize missing or `null` content.
    pub fn validated(self) -> Result<Self, TypeError> {
        if self.name.is_empty() {
            return Err(TypeError::EmptyName);
        }
        Ok(Self {
            name: self.name,
            data: Some(self.data.filter(|v| !v.is_null()).unwrap_or_else(empty_object)),
        })
    }
}

/// Partial update. Request body `{name?, data?}`.
///
/// An empty `name` or a `null` `data` counts as not supplied.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl DocumentPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            data: None,
        }
    }

    pub fn data(data: Value) -> Self {
        Self {
            name: None,
            data: Some(data),
        }
    }

    /// Apply the supplied fields and refresh `updated_at`.
    pub fn apply(self, doc: &mut Document, now: DateTime<Utc>) {
        if let Some(name) = self.name.filter(|n| !n.is_empty()) {
            doc.name = name;
        }
        if let Some(data) = self.data.filter(|v| !v.is_null()) {
            doc.data = data;
        }
        // Never move the clock backwards relative to creation.
        doc.updated_at = now.max(doc.created_at);
    }
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}
