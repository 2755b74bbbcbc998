use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all JSS endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/health",
            get(handler::health).fallback(handler::method_not_allowed),
        )
        .route(
            "/auth/register",
            post(handler::register).fallback(handler::method_not_allowed),
        )
        .route(
            "/auth/login",
            post(handler::login).fallback(handler::method_not_allowed),
        )
        .route(
            "/api/me",
            get(handler::me).fallback(handler::method_not_allowed),
        )
        .route(
            "/api/documents",
            get(handler::list_documents)
                .post(handler::create_document)
                .fallback(handler::method_not_allowed),
        )
        .route(
            "/api/documents/",
            get(handler::document_id_required)
                .put(handler::document_id_required)
                .delete(handler::document_id_required)
                .fallback(handler::method_not_allowed),
        )
        .route(
            "/api/documents/:id",
            get(handler::get_document)
                .put(handler::update_document)
                .delete(handler::delete_document)
                .fallback(handler::method_not_allowed),
        )
        .route(
            "/public/",
            get(handler::public_id_required).fallback(handler::public_method_not_allowed),
        )
        .route(
            "/public/:id",
            get(handler::public_content).fallback(handler::public_method_not_allowed),
        )
        .fallback(handler::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use jss_accounts::HashingParams;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    const ADMIN: &str = "admin-key";

    fn config() -> ServerConfig {
        let mut config = ServerConfig {
            admin_api_key: Some(ADMIN.into()),
            ..ServerConfig::default()
        };
        config.accounts.hashing = HashingParams::insecure_fast();
        config
    }

    struct TestApp {
        router: Router,
    }

    struct Reply {
        status: StatusCode,
        cache_control: Option<String>,
        body: Value,
    }

    impl TestApp {
        fn new() -> Self {
            Self::with_config(config())
        }

        fn with_config(config: ServerConfig) -> Self {
            Self {
                router: build_router(AppState::from_config(config).unwrap()),
            }
        }

        async fn raw(&self, method: &str, uri: &str, key: Option<&str>, body: &str) -> Reply {
            let mut req = Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json");
            if let Some(key) = key {
                req = req.header("X-API-Key", key);
            }
            let response = self
                .router
                .clone()
                .oneshot(req.body(Body::from(body.to_string())).unwrap())
                .await
                .unwrap();
            let status = response.status();
            let cache_control = response
                .headers()
                .get(header::CACHE_CONTROL)
                .map(|v| v.to_str().unwrap().to_string());
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            Reply {
                status,
                cache_control,
                body,
            }
        }

        async fn call(&self, method: &str, uri: &str, key: Option<&str>, body: Value) -> Reply {
            let body = if body.is_null() {
                String::new()
            } else {
                body.to_string()
            };
            self.raw(method, uri, key, &body).await
        }

        async fn register(&self, email: &str) -> String {
            let reply = self
                .call(
                    "POST",
                    "/auth/register",
                    None,
                    json!({"email": email, "password": "secret1"}),
                )
                .await;
            assert_eq!(reply.status, StatusCode::CREATED);
            reply.body["data"]["api_key"].as_str().unwrap().to_string()
        }

        async fn create(&self, key: &str, name: &str, data: Value) -> String {
            let reply = self
                .call(
                    "POST",
                    "/api/documents",
                    Some(key),
                    json!({"name": name, "data": data}),
                )
                .await;
            assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
            reply.body["data"]["id"].as_str().unwrap().to_string()
        }
    }

    fn error_of(reply: &Reply) -> &str {
        assert_eq!(reply.body["success"], json!(false));
        reply.body["error"].as_str().unwrap()
    }

    // -----------------------------------------------------------------------
    // Health and routing
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn health_reports_backend() {
        let app = TestApp::new();
        let reply = app.call("GET", "/health", None, Value::Null).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["success"], json!(true));
        assert_eq!(reply.body["message"], json!("JSON API Server is running"));
        assert_eq!(reply.body["data"]["storage"], json!("memory"));
        assert_eq!(reply.body["data"]["auth"], json!("api_key"));
        assert!(reply.body["data"]["version"].is_string());
        assert!(reply.body["data"]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn unknown_route_is_enveloped_404() {
        let app = TestApp::new();
        let reply = app.call("GET", "/nope", None, Value::Null).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_eq!(error_of(&reply), "Not found");
    }

    #[tokio::test]
    async fn wrong_methods_are_405() {
        let app = TestApp::new();
        let reply = app.call("PATCH", "/api/documents", Some(ADMIN), Value::Null).await;
        assert_eq!(reply.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(error_of(&reply), "Method not allowed");

        let reply = app.call("GET", "/auth/register", None, Value::Null).await;
        assert_eq!(reply.status, StatusCode::METHOD_NOT_ALLOWED);

        let reply = app.call("POST", "/public/abc", None, json!({})).await;
        assert_eq!(reply.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(error_of(&reply), "Only GET allowed");
    }

    #[tokio::test]
    async fn empty_id_paths_are_400() {
        let app = TestApp::new();
        let reply = app.call("GET", "/api/documents/", Some(ADMIN), Value::Null).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&reply), "Document ID is required");

        let reply = app.call("GET", "/public/", None, Value::Null).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&reply), "Document ID is required");
    }

    // -----------------------------------------------------------------------
    // Accounts
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn register_then_duplicate() {
        let app = TestApp::new();
        let first = app
            .call(
                "POST",
                "/auth/register",
                None,
                json!({"email": "a@x.com", "password": "secret1"}),
            )
            .await;
        assert_eq!(first.status, StatusCode::CREATED);
        assert_eq!(first.body["message"], json!("Account created successfully"));
        assert_eq!(first.body["data"]["email"], json!("a@x.com"));
        assert_eq!(first.body["data"]["api_key"].as_str().unwrap().len(), 64);
        assert!(first.body["data"].get("password_hash").is_none());

        let second = app
            .call(
                "POST",
                "/auth/register",
                None,
                json!({"email": "a@x.com", "password": "secret2"}),
            )
            .await;
        assert_eq!(second.status, StatusCode::CONFLICT);
        assert_eq!(error_of(&second), "Email already registered");
    }

    #[tokio::test]
    async fn register_validation() {
        let app = TestApp::new();
        let weak = app
            .call(
                "POST",
                "/auth/register",
                None,
                json!({"email": "a@x.com", "password": "12345"}),
            )
            .await;
        assert_eq!(weak.status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&weak), "Password must be at least 6 characters");

        let missing = app
            .call("POST", "/auth/register", None, json!({"email": "a@x.com"}))
            .await;
        assert_eq!(missing.status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&missing), "Email and password are required");

        let garbage = app.raw("POST", "/auth/register", None, "{not json").await;
        assert_eq!(garbage.status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&garbage), "Invalid JSON");
    }

    #[tokio::test]
    async fn login_returns_issued_key() {
        let app = TestApp::new();
        let key = app.register("Mixed@Case.com").await;

        let ok = app
            .call(
                "POST",
                "/auth/login",
                None,
                json!({"email": "mixed@case.com", "password": "secret1"}),
            )
            .await;
        assert_eq!(ok.status, StatusCode::OK);
        assert_eq!(ok.body["message"], json!("Login successful"));
        assert_eq!(ok.body["data"]["api_key"], json!(key));

        for body in [
            json!({"email": "mixed@case.com", "password": "wrong!!"}),
            json!({"email": "ghost@case.com", "password": "secret1"}),
        ] {
            let bad = app.call("POST", "/auth/login", None, body).await;
            assert_eq!(bad.status, StatusCode::UNAUTHORIZED);
            assert_eq!(error_of(&bad), "Invalid email or password");
        }
    }

    #[tokio::test]
    async fn me_describes_the_caller() {
        let app = TestApp::new();
        let admin = app.call("GET", "/api/me", Some(ADMIN), Value::Null).await;
        assert_eq!(admin.body["data"], json!({"id": "global", "type": "api_key"}));

        let key = app.register("me@x.com").await;
        let user = app.call("GET", "/api/me", Some(&key), Value::Null).await;
        assert_eq!(user.status, StatusCode::OK);
        assert_eq!(user.body["data"]["email"], json!("me@x.com"));
        assert_eq!(user.body["data"]["api_key"], json!(key));
    }

    // -----------------------------------------------------------------------
    // Credentials
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn credential_failures_are_401() {
        let app = TestApp::new();
        let missing = app.call("GET", "/api/documents", None, Value::Null).await;
        assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_of(&missing), "API key is required");

        let invalid = app
            .call("GET", "/api/documents", Some("wrong"), Value::Null)
            .await;
        assert_eq!(invalid.status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_of(&invalid), "Invalid API key");
    }

    #[tokio::test]
    async fn credential_is_checked_before_the_body() {
        let app = TestApp::new();
        let reply = app.raw("POST", "/api/documents", None, "{not json").await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn query_parameter_credential() {
        let app = TestApp::new();
        let uri = format!("/api/documents?api_key={ADMIN}");
        let reply = app.call("GET", &uri, None, Value::Null).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["data"], json!([]));
    }

    // -----------------------------------------------------------------------
    // Documents
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn admin_create_then_public_read() {
        let app = TestApp::new();
        let reply = app
            .call(
                "POST",
                "/api/documents",
                Some(ADMIN),
                json!({"name": "cfg", "data": {"x": 1}}),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED);
        assert_eq!(reply.body["message"], json!("Document created successfully"));
        let doc = &reply.body["data"];
        assert_eq!(doc["name"], json!("cfg"));
        assert_eq!(doc["user_id"], json!("global"));
        assert_eq!(doc["created_at"], doc["updated_at"]);
        let id = doc["id"].as_str().unwrap();

        let public = app
            .call("GET", &format!("/public/{id}"), None, Value::Null)
            .await;
        assert_eq!(public.status, StatusCode::OK);
        assert_eq!(public.body, json!({"x": 1}));
        assert_eq!(public.cache_control.as_deref(), Some("public, max-age=60"));
    }

    #[tokio::test]
    async fn public_cache_age_is_configurable() {
        let app = TestApp::with_config(ServerConfig {
            public_cache_max_age: 5,
            ..config()
        });
        let id = app.create(ADMIN, "n", json!([1])).await;
        let public = app
            .call("GET", &format!("/public/{id}"), None, Value::Null)
            .await;
        assert_eq!(public.cache_control.as_deref(), Some("public, max-age=5"));
    }

    #[tokio::test]
    async fn public_missing_is_404() {
        let app = TestApp::new();
        for uri in [
            "/public/0190f5c2-8d4e-7000-8000-000000000000",
            "/public/not-a-uuid",
        ] {
            let reply = app.call("GET", uri, None, Value::Null).await;
            assert_eq!(reply.status, StatusCode::NOT_FOUND);
            assert_eq!(error_of(&reply), "Document not found");
        }
    }

    #[tokio::test]
    async fn create_defaults_and_validation() {
        let app = TestApp::new();
        let reply = app
            .call("POST", "/api/documents", Some(ADMIN), json!({"name": "empty"}))
            .await;
        assert_eq!(reply.status, StatusCode::CREATED);
        assert_eq!(reply.body["data"]["data"], json!({}));

        let reply = app
            .call("POST", "/api/documents", Some(ADMIN), json!({"name": "", "data": 1}))
            .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&reply), "Document name is required");

        let reply = app.raw("POST", "/api/documents", Some(ADMIN), "[").await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&reply), "Invalid JSON");
    }

    #[tokio::test]
    async fn accounts_are_isolated() {
        let app = TestApp::new();
        let x = app.register("x@x.com").await;
        let y = app.register("y@x.com").await;
        let id = app.create(&x, "private", json!({"secret": true})).await;
        let path = format!("/api/documents/{id}");

        let list = app.call("GET", "/api/documents", Some(&y), Value::Null).await;
        assert_eq!(list.body["data"], json!([]));

        for (method, body) in [
            ("GET", Value::Null),
            ("PUT", json!({"name": "mine now"})),
            ("DELETE", Value::Null),
        ] {
            let reply = app.call(method, &path, Some(&y), body).await;
            assert_eq!(reply.status, StatusCode::NOT_FOUND, "{method}");
            assert_eq!(error_of(&reply), "Document not found");
        }

        let admin = app.call("GET", "/api/documents", Some(ADMIN), Value::Null).await;
        assert_eq!(admin.body["data"].as_array().unwrap().len(), 1);

        let owner = app.call("GET", &path, Some(&x), Value::Null).await;
        assert_eq!(owner.status, StatusCode::OK);
        assert_eq!(owner.body["data"]["name"], json!("private"));
    }

    #[tokio::test]
    async fn partial_updates() {
        let app = TestApp::new();
        let key = app.register("u@x.com").await;
        let id = app.create(&key, "before", json!({"v": [1, 2, 3]})).await;
        let path = format!("/api/documents/{id}");

        let renamed = app
            .call("PUT", &path, Some(&key), json!({"name": "after"}))
            .await;
        assert_eq!(renamed.status, StatusCode::OK);
        assert_eq!(renamed.body["message"], json!("Document updated"));
        assert_eq!(renamed.body["data"]["name"], json!("after"));
        assert_eq!(renamed.body["data"]["data"], json!({"v": [1, 2, 3]}));

        let rewritten = app
            .call("PUT", &path, Some(&key), json!({"data": "plain", "name": ""}))
            .await;
        assert_eq!(rewritten.body["data"]["name"], json!("after"));
        assert_eq!(rewritten.body["data"]["data"], json!("plain"));

        let nulled = app
            .call("PUT", &path, Some(&key), json!({"data": null}))
            .await;
        assert_eq!(nulled.body["data"]["data"], json!("plain"));
    }

    #[tokio::test]
    async fn delete_then_get_is_404() {
        let app = TestApp::new();
        let id = app.create(ADMIN, "gone", json!({})).await;
        let path = format!("/api/documents/{id}");

        let deleted = app.call("DELETE", &path, Some(ADMIN), Value::Null).await;
        assert_eq!(deleted.status, StatusCode::OK);
        assert_eq!(
            deleted.body,
            json!({"success": true, "message": "Document deleted"})
        );

        let again = app.call("DELETE", &path, Some(ADMIN), Value::Null).await;
        assert_eq!(again.status, StatusCode::NOT_FOUND);
        let get = app.call("GET", &path, Some(ADMIN), Value::Null).await;
        assert_eq!(get.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn documents_survive_restart_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let on_disk = || ServerConfig {
            data_dir: Some(dir.path().to_path_buf()),
            ..config()
        };

        let (key, id) = {
            let app = TestApp::with_config(on_disk());
            let key = app.register("p@x.com").await;
            let id = app.create(&key, "kept", json!({"n": 7})).await;
            (key, id)
        };

        let app = TestApp::with_config(on_disk());
        let health = app.call("GET", "/health", None, Value::Null).await;
        assert_eq!(health.body["data"]["storage"], json!("filesystem"));
        let reply = app
            .call("GET", &format!("/api/documents/{id}"), Some(&key), Value::Null)
            .await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["data"]["data"], json!({"n": 7}));
    }
}
