use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use crate::config::Config;
use crate::server::build_app;
use reqhub_storage::test_utils::memory_pool;

fn test_config() -> Config {
    Config::from_lookup(|_| None).unwrap()
}

#[tokio::test]
async fn test_app_serves_health() {
    let app = build_app(memory_pool().await, &test_config()).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"]["service"], "reqhub-api");
}

#[tokio::test]
async fn test_cors_preflight_allows_identity_headers() {
    let app = build_app(memory_pool().await, &test_config()).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/requirement-review-meetings")
                .header("Origin", "http://localhost:5173")
                .header("Access-Control-Request-Method", "POST")
                .header("Access-Control-Request-Headers", "x-tenant-id,x-user-id")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:5173")
    );
}

#[tokio::test]
async fn test_invalid_cors_origin_is_an_error() {
    let mut config = test_config();
    config.cors_origin = "bad\norigin".to_string();

    assert!(build_app(memory_pool().await, &config).is_err());
}
