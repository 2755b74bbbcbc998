use std::sync::Arc;

use jss_store::{CommitToken, DocumentStore};
use jss_types::{Document, DocumentPatch, NewDocument, OwnerScope};
use tracing::info;

use crate::config::GateConfig;
use crate::error::GateResult;
use crate::identity::{CredentialDirectory, Credentials, Identity, IdentityResolver};

// ---------------------------------------------------------------------------
// AuthorizationGate
// ---------------------------------------------------------------------------

/// The only credentialed path to the document store.
///
/// Resolves the credential first; a rejected credential never reaches the
/// store. The resolved scope is then handed to [`DocumentStore`], which is
/// where visibility is enforced.
pub struct AuthorizationGate {
    resolver: IdentityResolver,
    documents: Arc<DocumentStore>,
    audit: bool,
}

impl AuthorizationGate {
    pub fn new(
        config: &GateConfig,
        directory: Arc<dyn CredentialDirectory>,
        documents: Arc<DocumentStore>,
    ) -> Self {
        Self {
            resolver: IdentityResolver::new(config.admin_api_key.as_deref(), directory),
            documents,
            audit: config.audit,
        }
    }

    /// Resolve `credentials` into a session bound to the caller's scope.
    pub fn authorize(&self, credentials: &Credentials) -> GateResult<Session> {
        let identity = self.resolver.resolve(credentials)?;
        Ok(Session {
            identity,
            documents: Arc::clone(&self.documents),
            audit: self.audit,
            token: CommitToken::unbounded(),
        })
    }

    /// The identity behind `credentials`.
    pub fn whoami(&self, credentials: &Credentials) -> GateResult<Identity> {
        self.resolver.resolve(credentials)
    }

    pub fn list(&self, credentials: &Credentials) -> GateResult<Vec<Document>> {
        self.authorize(credentials)?.list()
    }

    pub fn create(&self, credentials: &Credentials, input: NewDocument) -> GateResult<Document> {
        self.authorize(credentials)?.create(input)
    }

    pub fn get(&self, credentials: &Credentials, id: &str) -> GateResult<Document> {
        self.authorize(credentials)?.get(id)
    }

    pub fn update(
        &self,
        credentials: &Credentials,
        id: &str,
        patch: DocumentPatch,
    ) -> GateResult<Document> {
        self.authorize(credentials)?.update(id, patch)
    }

    pub fn delete(&self, credentials: &Credentials, id: &str) -> GateResult<()> {
        self.authorize(credentials)?.delete(id)
    }

    pub fn documents(&self) -> &Arc<DocumentStore> {
        &self.documents
    }

    pub fn has_admin(&self) -> bool {
        self.resolver.has_admin()
    }
}

impl std::fmt::Debug for AuthorizationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationGate")
            .field("resolver", &self.resolver)
            .field("documents", &self.documents)
            .field("audit", &self.audit)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Document operations on behalf of one resolved identity.
pub struct Session {
    identity: Identity,
    documents: Arc<DocumentStore>,
    audit: bool,
    token: CommitToken,
}

impl Session {
    /// Make every mutation on this session conditional on `token`.
    pub fn with_token(mut self, token: CommitToken) -> Self {
        self.token = token;
        self
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn scope(&self) -> OwnerScope {
        self.identity.scope()
    }

    pub fn list(&self) -> GateResult<Vec<Document>> {
        Ok(self.documents.list(&self.scope())?)
    }

    pub fn create(&self, input: NewDocument) -> GateResult<Document> {
        let doc = self.documents.create_with(&self.scope(), input, &self.token)?;
        self.audit("create", &doc.id.to_string());
        Ok(doc)
    }

    pub fn get(&self, id: &str) -> GateResult<Document> {
        Ok(self.documents.get(&self.scope(), id)?)
    }

    pub fn update(&self, id: &str, patch: DocumentPatch) -> GateResult<Document> {
        let doc = self.documents.update_with(&self.scope(), id, patch, &self.token)?;
        self.audit("update", id);
        Ok(doc)
    }

    pub fn delete(&self, id: &str) -> GateResult<()> {
        self.documents.delete_with(&self.scope(), id, &self.token)?;
        self.audit("delete", id);
        Ok(())
    }

    fn audit(&self, op: &'static str, id: &str) {
        if self.audit && self.identity.is_admin() {
            info!(target: "audit", identity = %self.identity.label(), op, id, "unscoped mutation");
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity.label())
            .finish_non_exhaustive()
    }
}
