//! Authorization gate integration tests.
//!
//! Tests verify:
//! - The current token is accepted in raw and Bearer form
//! - Invalid, missing and foreign tokens are rejected on both protected routes
//! - A newer login supersedes an older, still cryptographically valid token

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};

use thumbpatch::{Credentials, TokenSigner};

use super::test_utils::{
    create_test_png, create_test_router, json_request, login, send, text, MockImageSource,
    PASSWORD, TEST_SECRET, USERNAME,
};

const IMAGE_URL: &str = "http://images.test/avatar.png";

fn patch_body() -> Value {
    json!({
        "jsonObject": {"foo": [1, 3]},
        "patch": [{"op": "add", "path": "/foo/1", "value": 2}]
    })
}

fn thumbnail_body() -> Value {
    json!({"url": IMAGE_URL})
}

fn router_with_image() -> axum::Router {
    create_test_router(MockImageSource::new().with_content(IMAGE_URL, create_test_png(120, 80)))
}

// =============================================================================
// Accepted Tokens
// =============================================================================

#[tokio::test]
async fn test_raw_token_accepted() {
    let router = router_with_image();
    let token = login(&router, USERNAME, PASSWORD).await;

    let (status, _) = send(&router, json_request("/api/patch", Some(&token), &patch_body())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &router,
        json_request("/api/getThumbnail", Some(&token), &thumbnail_body()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_bearer_token_accepted() {
    let router = router_with_image();
    let token = login(&router, USERNAME, PASSWORD).await;
    let header = format!("Bearer {}", token);

    let (status, body) =
        send(&router, json_request("/api/patch", Some(&header), &patch_body())).await;
    assert_eq!(status, StatusCode::OK);

    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["token"], token);
}

// =============================================================================
// Rejected Tokens
// =============================================================================

#[tokio::test]
async fn test_invalid_token_rejected_on_patch() {
    let router = router_with_image();
    login(&router, USERNAME, PASSWORD).await;

    let (status, body) = send(
        &router,
        json_request("/api/patch", Some("INVALID_TOKEN"), &patch_body()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(text(&body), "Invalid Token.");
}

#[tokio::test]
async fn test_invalid_token_rejected_on_thumbnail() {
    let router = router_with_image();
    login(&router, USERNAME, PASSWORD).await;

    let (status, body) = send(
        &router,
        json_request("/api/getThumbnail", Some("INVALID_TOKEN"), &thumbnail_body()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(text(&body), "Invalid Token Sent");
}

#[tokio::test]
async fn test_missing_header_rejected() {
    let router = router_with_image();
    login(&router, USERNAME, PASSWORD).await;

    let (status, body) = send(&router, json_request("/api/patch", None, &patch_body())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(text(&body), "Invalid Token.");

    let (status, body) =
        send(&router, json_request("/api/getThumbnail", None, &thumbnail_body())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(text(&body), "Invalid Token Sent");
}

#[tokio::test]
async fn test_no_login_yet_rejects_valid_signature() {
    let router = router_with_image();
    let token = TokenSigner::new(TEST_SECRET, None)
        .sign(&Credentials::new(USERNAME, PASSWORD))
        .unwrap();

    let (status, body) = send(&router, json_request("/api/patch", Some(&token), &patch_body())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(text(&body), "Invalid Token.");
}

#[tokio::test]
async fn test_foreign_secret_rejected() {
    let router = router_with_image();
    login(&router, USERNAME, PASSWORD).await;
    let forged = TokenSigner::new("some-other-secret", None)
        .sign(&Credentials::new(USERNAME, PASSWORD))
        .unwrap();

    let (status, body) =
        send(&router, json_request("/api/patch", Some(&forged), &patch_body())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(text(&body), "Invalid Token.");
}

#[tokio::test]
async fn test_gate_runs_before_body_validation() {
    let router = router_with_image();
    login(&router, USERNAME, PASSWORD).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/patch")
        .header("authorization", "INVALID_TOKEN")
        .header("content-type", "application/json")
        .body(Body::from("{broken"))
        .unwrap();
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(text(&body), "Invalid Token.");
}

// =============================================================================
// Single-Session Semantics
// =============================================================================

#[tokio::test]
async fn test_second_login_invalidates_first_token() {
    let router = router_with_image();

    let first = login(&router, USERNAME, PASSWORD).await;
    let second = login(&router, "AnotherUser", "AnotherPassword").await;

    // The old token is still a valid signature...
    assert!(TokenSigner::new(TEST_SECRET, None).verify(&first).is_ok());

    // ...but the gate no longer accepts it
    let (status, body) = send(&router, json_request("/api/patch", Some(&first), &patch_body())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(text(&body), "Invalid Token.");

    let (status, body) = send(
        &router,
        json_request("/api/getThumbnail", Some(&first), &thumbnail_body()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(text(&body), "Invalid Token Sent");

    let (status, _) = send(&router, json_request("/api/patch", Some(&second), &patch_body())).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_failed_login_does_not_end_session() {
    let router = router_with_image();
    let token = login(&router, USERNAME, PASSWORD).await;

    let (status, _) = send(
        &router,
        json_request("/api/login", None, &json!({"username": USERNAME})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&router, json_request("/api/patch", Some(&token), &patch_body())).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_health_is_public() {
    let router = router_with_image();

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);

    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["status"], "healthy");
}
