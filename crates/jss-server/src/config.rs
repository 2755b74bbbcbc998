use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jss_accounts::RegistryConfig;
use jss_gate::GateConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Server configuration, read from TOML with every field defaulted.
///
/// Precedence, lowest first: defaults, the config file, environment
/// variables (`PORT`, `API_KEY`, `DATA_DIR`, `STORAGE_TIMEOUT_MS`), then
/// command-line flags.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Root for file-backed storage. `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
    /// The administrative credential. `None` disables the unscoped identity.
    pub admin_api_key: Option<String>,
    /// How long a request may block on storage before it fails.
    pub storage_timeout_ms: u64,
    /// `max-age` advertised on public content responses, in seconds.
    pub public_cache_max_age: u64,
    pub audit_admin_writes: bool,
    pub accounts: RegistryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            data_dir: None,
            admin_api_key: None,
            storage_timeout_ms: 5_000,
            public_cache_max_age: 60,
            audit_admin_writes: true,
            accounts: RegistryConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Read a TOML config file.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> ServerResult<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply environment-style overrides from `lookup`. Empty values are
    /// ignored.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ServerResult<()> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(port) = get("PORT") {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|_| ServerError::Config(format!("PORT is not a port number: {port}")))?;
            self.bind_addr.set_port(port);
        }
        if let Some(key) = get("API_KEY") {
            self.admin_api_key = Some(key);
        }
        if let Some(dir) = get("DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(ms) = get("STORAGE_TIMEOUT_MS") {
            self.storage_timeout_ms = ms.trim().parse().map_err(|_| {
                ServerError::Config(format!("STORAGE_TIMEOUT_MS is not a number: {ms}"))
            })?;
        }
        Ok(())
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.storage_timeout_ms)
    }

    pub fn gate_config(&self) -> GateConfig {
        GateConfig {
            admin_api_key: self.admin_api_key.clone().filter(|k| !k.is_empty()),
            audit: self.audit_admin_writes,
        }
    }

    /// A copy safe to print: the administrative key is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.admin_api_key.is_some() {
            copy.admin_api_key = Some("<redacted>".into());
        }
        copy
    }

    pub fn to_toml(&self) -> ServerResult<String> {
        toml::to_string_pretty(self).map_err(|e| ServerError::Config(e.to_string()))
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("data_dir", &self.data_dir)
            .field("admin_api_key", &self.admin_api_key.as_ref().map(|_| "<redacted>"))
            .field("storage_timeout_ms", &self.storage_timeout_ms)
            .field("public_cache_max_age", &self.public_cache_max_age)
            .field("audit_admin_writes", &self.audit_admin_writes)
            .field("accounts", &self.accounts)
            .finish()
    }
}
