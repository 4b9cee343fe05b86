//! Thumbnail integration tests using an in-memory image source.
//!
//! Tests verify:
//! - Image URLs produce a 50x50 JPEG
//! - Non-image content yields "Invalid Image URL was given"
//! - Fetch failures surface their own message
//! - Fetch and processing timeouts are enforced

use std::sync::atomic::Ordering;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use thumbpatch::error::FetchError;
use thumbpatch::thumbnail::ThumbnailService;

use super::test_utils::{
    create_router_with_service, create_test_jpeg, create_test_png, create_test_router,
    image_dimensions, is_valid_jpeg, json_request, login, send, send_with_content_type, text,
    MockImageSource, PASSWORD, USERNAME,
};

const PNG_URL: &str = "http://images.test/wide.png";
const JPEG_URL: &str = "http://images.test/tall.jpg";
const HTML_URL: &str = "http://images.test/index.html";

#[tokio::test]
async fn test_thumbnail_is_50x50_jpeg() {
    let source = MockImageSource::new()
        .with_content(PNG_URL, create_test_png(640, 360))
        .with_content(JPEG_URL, create_test_jpeg(30, 400));
    let router = create_test_router(source);
    let token = login(&router, USERNAME, PASSWORD).await;

    for url in [PNG_URL, JPEG_URL] {
        let request = json_request("/api/getThumbnail", Some(&token), &json!({"url": url}));
        let (status, content_type, body) = send_with_content_type(&router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("image/jpeg"));
        assert!(is_valid_jpeg(&body));
        assert_eq!(image_dimensions(&body), (50, 50));
    }
}

#[tokio::test]
async fn test_non_image_content_rejected() {
    let source = MockImageSource::new().with_content(
        HTML_URL,
        b"<!doctype html><html><body>hello</body></html>".to_vec(),
    );
    let router = create_test_router(source);
    let token = login(&router, USERNAME, PASSWORD).await;

    let request = json_request("/api/getThumbnail", Some(&token), &json!({"url": HTML_URL}));
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(text(&body), "Invalid Image URL was given");
}

#[tokio::test]
async fn test_corrupt_image_rejected() {
    let mut data = create_test_png(64, 64);
    data.truncate(data.len() / 2);
    let source = MockImageSource::new().with_content(PNG_URL, data);
    let router = create_test_router(source);
    let token = login(&router, USERNAME, PASSWORD).await;

    let request = json_request("/api/getThumbnail", Some(&token), &json!({"url": PNG_URL}));
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(text(&body), "Invalid Image URL was given");
}

#[tokio::test]
async fn test_fetch_error_message_is_surfaced() {
    let source = MockImageSource::new().with_error(
        PNG_URL,
        FetchError::Request {
            url: PNG_URL.to_string(),
            message: "connection refused".to_string(),
        },
    );
    let router = create_test_router(source);
    let token = login(&router, USERNAME, PASSWORD).await;

    let request = json_request("/api/getThumbnail", Some(&token), &json!({"url": PNG_URL}));
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(text(&body).contains("connection refused"));
}

#[tokio::test]
async fn test_not_found_status_is_surfaced() {
    let router = create_test_router(MockImageSource::new());
    let token = login(&router, USERNAME, PASSWORD).await;

    let request = json_request(
        "/api/getThumbnail",
        Some(&token),
        &json!({"url": "http://images.test/missing.png"}),
    );
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(text(&body).contains("404"));
}

#[tokio::test]
async fn test_invalid_url_never_fetched() {
    let source = MockImageSource::new();
    let counter = source.request_counter();
    let router = create_test_router(source);
    let token = login(&router, USERNAME, PASSWORD).await;

    for body in [
        json!({"url": "not a url"}),
        json!({"url": "ftp://images.test/a.png"}),
        json!({"url": 42}),
        json!({}),
    ] {
        let (status, response) =
            send(&router, json_request("/api/getThumbnail", Some(&token), &body)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(text(&response).starts_with("Only absolute http(s) URLs are supported"));
    }

    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_fetch_timeout() {
    let source = MockImageSource::new()
        .with_content(PNG_URL, create_test_png(10, 10))
        .with_delay(Duration::from_secs(30));
    let service = ThumbnailService::new(source).with_fetch_timeout(Duration::from_millis(50));
    let router = create_router_with_service(service);
    let token = login(&router, USERNAME, PASSWORD).await;

    let request = json_request("/api/getThumbnail", Some(&token), &json!({"url": PNG_URL}));
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(text(&body).contains("timed out after 50ms"));
}

#[tokio::test]
async fn test_process_timeout() {
    let source = MockImageSource::new().with_content(PNG_URL, create_test_png(3000, 3000));
    let service = ThumbnailService::new(source).with_process_timeout(Duration::from_millis(1));
    let router = create_router_with_service(service);
    let token = login(&router, USERNAME, PASSWORD).await;

    let request = json_request("/api/getThumbnail", Some(&token), &json!({"url": PNG_URL}));
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(text(&body), "Invalid Image URL was given");
}

#[tokio::test]
async fn test_each_request_fetches_again() {
    let source = MockImageSource::new().with_content(PNG_URL, create_test_png(80, 80));
    let counter = source.request_counter();
    let router = create_test_router(source);
    let token = login(&router, USERNAME, PASSWORD).await;

    for _ in 0..3 {
        let request = json_request("/api/getThumbnail", Some(&token), &json!({"url": PNG_URL}));
        let (status, _) = send(&router, request).await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(counter.load(Ordering::SeqCst), 3);
}
