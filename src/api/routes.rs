//! Route definitions for the API.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::handlers;
use crate::auth::require_jwt;
use crate::AppState;

/// Security scheme modifier for OpenAPI.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login,
        handlers::list_frutas,
        handlers::add_fruta,
        handlers::health_check,
    ),
    components(schemas(
        crate::api::types::LoginRequest,
        crate::api::types::LoginResponse,
        crate::api::types::HealthResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication endpoints"),
        (name = "frutas", description = "Token-gated fruit list"),
        (name = "health", description = "Health and status endpoints")
    ),
    info(
        title = "Frutas API",
        version = "0.1.0",
        description = "JWT login plus a token-gated, in-memory fruit list",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Build the API router.
///
/// `/api/frutas` sits behind [`require_jwt`]; login, health and the docs are
/// public.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Routes requiring a bearer token
    let protected_routes = Router::new()
        .route(
            "/api/frutas",
            get(handlers::list_frutas).post(handlers::add_fruta),
        )
        .layer(middleware::from_fn_with_state(
            state.jwt_manager.clone(),
            require_jwt,
        ))
        .with_state(state.clone());

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/auth/login", post(handlers::login))
        .route("/api/health", get(handlers::health_check))
        .with_state(state);

    Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use chrono::{Duration, Utc};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::api::types::LoginResponse;
    use crate::auth::{
        hash_password, ConfiguredUser, CredentialVerifier, JwtManager, Principal, UserStore,
    };
    use crate::store::{FruitStore, InMemoryFruitStore};

    const SECRET: &str = "router-test-secret-0123456789abcdef";

    fn jwt_manager() -> JwtManager {
        JwtManager::new(
            SECRET,
            "frutas-api".to_string(),
            "frutas-clients".to_string(),
            30,
        )
    }

    fn test_state() -> AppState {
        let users = UserStore::new(vec![ConfiguredUser {
            username: "admin".to_string(),
            password_hash: hash_password("123"),
        }]);
        let store = InMemoryFruitStore::new(vec![
            "Maçã".to_string(),
            "Banana".to_string(),
            "Laranja".to_string(),
        ]);

        AppState {
            store: Arc::new(store),
            jwt_manager: jwt_manager(),
            credentials: Arc::new(users),
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = app.clone().oneshot(request).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, body)
    }

    fn login_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn list_request(token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri("/api/frutas");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn append_request(token: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/frutas")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn login(app: &Router) -> String {
        let (status, body) = send(app, login_request(r#"{"username":"admin","password":"123"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        let resp: LoginResponse = serde_json::from_value(body).unwrap();
        resp.token
    }

    fn strings(body: &serde_json::Value) -> Vec<String> {
        serde_json::from_value(body.clone()).unwrap()
    }

    #[tokio::test]
    async fn login_with_valid_credentials_issues_token() {
        let app = build_router(test_state());

        let (status, body) = send(&app, login_request(r#"{"username":"admin","password":"123"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["expires_in"], 30 * 60);

        let token = body["token"].as_str().unwrap();
        let claims = jwt_manager().validate_token(token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[tokio::test]
    async fn login_with_wrong_credentials_is_unauthorized() {
        let app = build_router(test_state());

        for body in [
            r#"{"username":"admin","password":"1234"}"#,
            r#"{"username":"root","password":"123"}"#,
            r#"{"username":"ADMIN","password":"123"}"#,
        ] {
            let (status, body) = send(&app, login_request(body)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert!(body.get("token").is_none());
        }
    }

    #[tokio::test]
    async fn login_with_malformed_body_is_bad_request() {
        let app = build_router(test_state());

        for body in [
            "not json",
            r#"{"username":"admin"}"#,
            r#"{"username":"","password":"123"}"#,
            r#"{"username":"admin","password":""}"#,
        ] {
            let (status, body) = send(&app, login_request(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["code"], "BAD_REQUEST");
        }
    }

    #[tokio::test]
    async fn login_uses_injected_verifier() {
        struct OnlyTester;

        impl CredentialVerifier for OnlyTester {
            fn verify(&self, username: &str, password: &str) -> Option<Principal> {
                (username == "tester" && password == "pw").then(|| Principal {
                    username: username.to_string(),
                })
            }
        }

        let mut state = test_state();
        state.credentials = Arc::new(OnlyTester);
        let app = build_router(state);

        let (status, _) = send(&app, login_request(r#"{"username":"admin","password":"123"}"#)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&app, login_request(r#"{"username":"tester","password":"pw"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        let claims = jwt_manager()
            .validate_token(body["token"].as_str().unwrap())
            .unwrap();
        assert_eq!(claims.sub, "tester");
    }

    #[tokio::test]
    async fn list_without_token_is_unauthorized() {
        let app = build_router(test_state());

        let (status, body) = send(&app, list_request(None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "MISSING_TOKEN");
    }

    #[tokio::test]
    async fn list_with_valid_token_returns_seed() {
        let app = build_router(test_state());
        let token = login(&app).await;

        let (status, body) = send(&app, list_request(Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(strings(&body), vec!["Maçã", "Banana", "Laranja"]);
    }

    #[tokio::test]
    async fn lowercase_bearer_scheme_is_accepted() {
        let app = build_router(test_state());
        let token = login(&app).await;

        let req = Request::builder()
            .method("GET")
            .uri("/api/frutas")
            .header(header::AUTHORIZATION, format!("bearer {token}"))
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(strings(&body).len(), 3);
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let app = build_router(test_state());
        let expired = jwt_manager()
            .generate_token_at("admin", Utc::now() - Duration::minutes(45))
            .unwrap()
            .token;

        let (status, body) = send(&app, list_request(Some(&expired))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn tampered_token_is_rejected() {
        let app = build_router(test_state());
        let token = login(&app).await;

        let other = JwtManager::new(
            "a-completely-different-secret-value",
            "frutas-api".to_string(),
            "frutas-clients".to_string(),
            30,
        );
        let foreign = other.generate_token("admin").unwrap().token;

        // Keep our header and payload, graft on the foreign signature.
        let (head, _) = token.rsplit_once('.').unwrap();
        let (_, foreign_sig) = foreign.rsplit_once('.').unwrap();
        let tampered = format!("{head}.{foreign_sig}");

        let (status, _) = send(&app, list_request(Some(&tampered))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, append_request(&tampered, r#""Uva""#)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn append_then_list_preserves_order() {
        let app = build_router(test_state());
        let token = login(&app).await;

        let (status, body) = send(&app, append_request(&token, r#""Uva""#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(strings(&body), vec!["Maçã", "Banana", "Laranja", "Uva"]);

        let (status, body) = send(&app, list_request(Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(strings(&body), vec!["Maçã", "Banana", "Laranja", "Uva"]);
    }

    #[tokio::test]
    async fn identical_appends_add_two_entries() {
        let app = build_router(test_state());
        let token = login(&app).await;

        send(&app, append_request(&token, r#""Uva""#)).await;
        let (status, body) = send(&app, append_request(&token, r#""Uva""#)).await;
        assert_eq!(status, StatusCode::OK);

        let items = strings(&body);
        assert_eq!(items.len(), 5);
        assert_eq!(&items[3..], ["Uva", "Uva"]);
    }

    #[tokio::test]
    async fn append_without_token_leaves_store_untouched() {
        let state = test_state();
        let store = state.store.clone();
        let app = build_router(state);

        let req = Request::builder()
            .method("POST")
            .uri("/api/frutas")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#""Uva""#))
            .unwrap();

        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(store.count().await, 3);
    }

    #[tokio::test]
    async fn append_with_non_string_body_is_bad_request() {
        let app = build_router(test_state());
        let token = login(&app).await;

        let (status, _) = send(&app, append_request(&token, r#"{"name":"Uva"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, list_request(Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(strings(&body).len(), 3);
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = build_router(test_state());

        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["items"], 3);
    }
}
