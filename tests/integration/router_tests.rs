//! In-process router tests.
//!
//! The pool connects lazily, so only paths that finish before touching the
//! database are exercised here; see `api_tests.rs` for the full flows.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use mylib_server::{api::create_router, config::AppConfig, AppState};

fn app() -> Router {
    let config = AppConfig::default();
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database.url)
        .expect("Invalid database URL");
    create_router(AppState::new(config, pool))
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.expect("Request failed");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_on_both_prefixes() {
    for uri in ["/health", "/api/health"] {
        let (status, body) = send(get(uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "success": true, "message": "MyLib API is healthy", "data": null })
        );
    }
}

#[tokio::test]
async fn test_unknown_route_envelope() {
    let (status, body) = send(get("/api/nowhere?x=1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Route /api/nowhere?x=1 not found");
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_protected_routes_require_bearer_token() {
    for uri in ["/api/books", "/books", "/api/dashboard", "/users/1", "/transactions/mybooks/1"] {
        let (status, body) = send(get(uri)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body["message"], "Authorization header missing or malformed");
    }

    let basic = Request::builder()
        .uri("/api/books")
        .header(header::AUTHORIZATION, "Basic YWRtaW46YWRtaW4=")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(basic).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authorization header missing or malformed");
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let request = Request::builder()
        .uri("/api/dashboard")
        .header(header::AUTHORIZATION, "Bearer not.a.token")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_register_reports_invalid_fields() {
    let (status, body) = send(post_json(
        "/api/auth/register",
        json!({
            "fullName": "",
            "role": "member",
            "email": "not-an-email",
            "password": "abc",
            "confirmPassword": "abc"
        }),
    ))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");
    let fields: Vec<&str> = body["data"]["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert!(fields.contains(&"fullName"));
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
}

#[tokio::test]
async fn test_register_rejects_unknown_role() {
    let (status, body) = send(post_json(
        "/auth/register",
        json!({
            "fullName": "Jane Doe",
            "role": "superuser",
            "email": "jane@mylib.test",
            "password": "secret1",
            "confirmPassword": "secret1"
        }),
    ))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Invalid role. Allowed roles: admin, librarian, staff, member"
    );
}

#[tokio::test]
async fn test_register_rejects_password_mismatch() {
    let (status, body) = send(post_json(
        "/api/auth/register",
        json!({
            "fullName": "Jane Doe",
            "role": "member",
            "email": "jane@mylib.test",
            "password": "secret1",
            "confirmPassword": "secret2"
        }),
    ))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"]["errors"][0]["field"], "confirmPassword");
    assert_eq!(body["data"]["errors"][0]["message"], "Passwords do not match");
}

#[tokio::test]
async fn test_login_requires_valid_email() {
    let (status, body) = send(post_json(
        "/api/auth/login",
        json!({ "email": "admin", "password": "Password123!" }),
    ))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"]["errors"][0]["field"], "email");
    assert_eq!(body["data"]["errors"][0]["message"], "Valid email is required");
}

#[tokio::test]
async fn test_malformed_json_uses_envelope() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();
    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_openapi_document_served() {
    let (status, body) = send(get("/api-docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "MyLib API");
}
