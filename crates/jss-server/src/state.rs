use std::sync::Arc;

use jss_accounts::AccountRegistry;
use jss_gate::{AuthorizationGate, PublicProjection};
use jss_store::{CommitToken, DocumentStore, FileRecordStore};
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<AuthorizationGate>,
    pub public: PublicProjection,
    pub accounts: Arc<AccountRegistry>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Wire the components together over the given backends.
    pub fn new(
        config: ServerConfig,
        documents: Arc<DocumentStore>,
        accounts: Arc<AccountRegistry>,
    ) -> Self {
        let gate = AuthorizationGate::new(&config.gate_config(), accounts.clone(), documents.clone());
        Self {
            gate: Arc::new(gate),
            public: PublicProjection::new(documents),
            accounts,
            config: Arc::new(config),
        }
    }

    /// Open the backends named by `config`.
    ///
    /// With a `data_dir`, documents live under `<data_dir>/documents` and
    /// accounts under `<data_dir>/accounts`. Any failure here is fatal.
    pub fn from_config(config: ServerConfig) -> ServerResult<Self> {
        let startup = |e: &dyn std::fmt::Display| ServerError::Startup(e.to_string());
        let (documents, accounts) = match &config.data_dir {
            Some(dir) => {
                let records = FileRecordStore::open(dir.join("documents")).map_err(|e| startup(&e))?;
                let accounts = AccountRegistry::open(dir.join("accounts"), config.accounts.clone())
                    .map_err(|e| startup(&e))?;
                (DocumentStore::new(Arc::new(records)), accounts)
            }
            None => (
                DocumentStore::in_memory(),
                AccountRegistry::in_memory(config.accounts.clone()).map_err(|e| startup(&e))?,
            ),
        };
        info!(
            documents = documents.backend_name(),
            accounts = accounts.backend_name(),
            admin = config.gate_config().admin_api_key.is_some(),
            "storage ready"
        );
        Ok(Self::new(config, Arc::new(documents), Arc::new(accounts)))
    }

    /// Run a blocking storage call on the blocking pool, bounded by the
    /// configured storage timeout. An elapsed timeout reports `Unavailable`.
    pub async fn blocking<T, E, F>(&self, f: F) -> ServerResult<T>
    where
        F: FnOnce(&AppState) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Into<ServerError> + Send + 'static,
    {
        self.committing(move |state, _| f(state)).await
    }

    /// Like [`blocking`](Self::blocking), for calls that write.
    ///
    /// The call receives a [`CommitToken`] to pass to the store. When the
    /// timeout fires before the write starts, the token is abandoned and the
    /// store writes nothing. When the write has already started, its outcome
    /// is awaited and returned instead.
    pub async fn committing<T, E, F>(&self, f: F) -> ServerResult<T>
    where
        F: FnOnce(&AppState, CommitToken) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Into<ServerError> + Send + 'static,
    {
        let state = self.clone();
        let token = CommitToken::abandonable();
        let worker = token.clone();
        let mut task = tokio::task::spawn_blocking(move || f(&state, worker));
        let joined = match tokio::time::timeout(self.config.storage_timeout(), &mut task).await {
            Ok(joined) => joined,
            Err(_) if token.abandon() => {
                return Err(ServerError::Unavailable(format!(
                    "storage call exceeded {}ms",
                    self.config.storage_timeout_ms
                )))
            }
            Err(_) => task.await,
        };
        match joined {
            Ok(result) => result.map_err(Into::into),
            Err(join) => Err(ServerError::Internal(format!("storage task failed: {join}"))),
        }
    }

    pub fn storage_backend(&self) -> &'static str {
        self.gate.documents().backend_name()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("gate", &self.gate)
            .field("accounts", &self.accounts)
            .field("config", &self.config)
            .finish()
    }
}
