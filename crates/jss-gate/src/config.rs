use serde::{Deserialize, Serialize};

/// Configuration for the authorization gate.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// The process-wide administrative credential. `None` or empty disables
    /// the unscoped identity entirely.
    pub admin_api_key: Option<String>,
    /// Log every mutation made by the unscoped identity on the `audit` target.
    pub audit: bool,
}

impl GateConfig {
    pub fn with_admin_key(key: impl Into<String>) -> Self {
        Self {
            admin_api_key: Some(key.into()),
            audit: true,
        }
    }
}

impl std::fmt::Debug for GateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let admin = match self.admin_api_key.as_deref() {
            Some(k) if !k.is_empty() => "<redacted>",
            _ => "<none>",
        };
        f.debug_struct("GateConfig")
            .field("admin_api_key", &admin)
            .field("audit", &self.audit)
            .finish()
    }
}
