use async_trait::async_trait;
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use jss_gate::{Credentials, Session};
use serde::Deserialize;

use crate::error::ServerError;
use crate::state::AppState;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// The `api_key` query parameter, accepted when the header is absent.
#[derive(Deserialize)]
struct ApiKeyQuery {
    api_key: Option<String>,
}

/// Read the credential from the `X-API-Key` header, falling back to the
/// `api_key` query parameter.
pub fn credentials_from_parts(parts: &Parts) -> Credentials {
    let header = parts
        .headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    let query = Query::<ApiKeyQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(q)| q.api_key);
    Credentials::from_parts(header, query.as_deref())
}

/// Extractor for a resolved session.
///
/// Runs before any body extractor, so a bad credential is rejected before
/// the body is read.
pub struct Authorized(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for Authorized {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let credentials = credentials_from_parts(parts);
        let session = state
            .blocking(move |s| s.gate.authorize(&credentials))
            .await?;
        Ok(Self(session))
    }
}
