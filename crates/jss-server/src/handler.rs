use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json};
use chrono::{SecondsFormat, Utc};
use jss_accounts::Account;
use jss_gate::Identity;
use jss_types::{AccountId, Document, DocumentPatch, NewDocument, OwnerScope};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::Authorized;
use crate::envelope::ApiResponse;
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> ServerResult<T> {
    serde_json::from_slice(body).map_err(|_| ServerError::invalid_json())
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthInfo {
    pub version: &'static str,
    pub storage: &'static str,
    pub auth: &'static str,
    pub timestamp: String,
}

pub async fn health(State(state): State<AppState>) -> ApiResponse<HealthInfo> {
    ApiResponse::with_message(
        "JSON API Server is running",
        HealthInfo {
            version: env!("CARGO_PKG_VERSION"),
            storage: state.storage_backend(),
            auth: "api_key",
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        },
    )
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuthRequest {
    pub email: String,
    pub password: String,
}

/// The client-facing view of an account. Never includes the password hash.
#[derive(Debug, Serialize)]
pub struct AccountView {
    pub id: AccountId,
    pub email: String,
    pub api_key: String,
}

impl From<Account> for AccountView {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            api_key: account.api_key.as_str().to_string(),
        }
    }
}

pub async fn register(
    State(state): State<AppState>,
    body: Bytes,
) -> ServerResult<impl IntoResponse> {
    let req: AuthRequest = parse_body(&body)?;
    let account = state
        .blocking(move |s| s.accounts.register(&req.email, &req.password))
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("Account created successfully", AccountView::from(account)),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    body: Bytes,
) -> ServerResult<ApiResponse<AccountView>> {
    let req: AuthRequest = parse_body(&body)?;
    let account = state
        .blocking(move |s| s.accounts.login(&req.email, &req.password))
        .await?;
    Ok(ApiResponse::with_message("Login successful", account.into()))
}

pub async fn me(Authorized(session): Authorized) -> ApiResponse<Value> {
    let data = match session.identity() {
        Identity::Administrator => json!({
            "id": OwnerScope::UNSCOPED_TAG,
            "type": "api_key",
        }),
        Identity::Account { id, email, api_key } => json!({
            "id": id,
            "email": email,
            "api_key": api_key.as_str(),
        }),
    };
    ApiResponse::ok(data)
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

pub async fn list_documents(
    State(state): State<AppState>,
    Authorized(session): Authorized,
) -> ServerResult<ApiResponse<Vec<Document>>> {
    let docs = state.blocking(move |_| session.list()).await?;
    Ok(ApiResponse::ok(docs))
}

pub async fn create_document(
    State(state): State<AppState>,
    Authorized(session): Authorized,
    body: Bytes,
) -> ServerResult<impl IntoResponse> {
    let input: NewDocument = parse_body(&body)?;
    let doc = state
        .committing(move |_, token| session.with_token(token).create(input))
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("Document created successfully", doc),
    ))
}

pub async fn get_document(
    State(state): State<AppState>,
    Authorized(session): Authorized,
    Path(id): Path<String>,
) -> ServerResult<ApiResponse<Document>> {
    let doc = state.blocking(move |_| session.get(&id)).await?;
    Ok(ApiResponse::ok(doc))
}

pub async fn update_document(
    State(state): State<AppState>,
    Authorized(session): Authorized,
    Path(id): Path<String>,
    body: Bytes,
) -> ServerResult<ApiResponse<Document>> {
    let patch: DocumentPatch = parse_body(&body)?;
    let doc = state
        .committing(move |_, token| session.with_token(token).update(&id, patch))
        .await?;
    Ok(ApiResponse::with_message("Document updated", doc))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Authorized(session): Authorized,
    Path(id): Path<String>,
) -> ServerResult<ApiResponse<()>> {
    state
        .committing(move |_, token| session.with_token(token).delete(&id))
        .await?;
    Ok(ApiResponse::message("Document deleted"))
}

pub async fn document_id_required(Authorized(_): Authorized) -> ServerError {
    ServerError::missing_id()
}

// ---------------------------------------------------------------------------
// Public projection
// ---------------------------------------------------------------------------

/// Raw document content, no envelope, no credential.
pub async fn public_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let content = state.blocking(move |s| s.public.content(&id)).await?;
    let cache = format!("public, max-age={}", state.config.public_cache_max_age);
    Ok(([(header::CACHE_CONTROL, cache)], Json(content)))
}

pub async fn public_id_required() -> ServerError {
    ServerError::missing_id()
}

// ---------------------------------------------------------------------------
// Fallbacks
// ---------------------------------------------------------------------------

pub async fn method_not_allowed() -> ServerError {
    ServerError::MethodNotAllowed("Method not allowed")
}

pub async fn public_method_not_allowed() -> ServerError {
    ServerError::MethodNotAllowed("Only GET allowed")
}

pub async fn not_found() -> ServerError {
    ServerError::NotFound("Not found".into())
}
