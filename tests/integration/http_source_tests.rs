//! HTTP image source tests against a local mock server.
//!
//! Tests verify:
//! - Images served over HTTP become 50x50 thumbnails end to end
//! - Non-2xx responses map to status errors
//! - Oversized bodies are rejected
//! - Unreachable hosts surface as request errors

use std::time::Duration;

use axum::http::StatusCode;
use httpmock::prelude::*;
use serde_json::json;
use url::Url;

use thumbpatch::error::FetchError;
use thumbpatch::thumbnail::{HttpImageSource, ImageSource, ThumbnailService};

use super::test_utils::{
    create_router_with_service, create_test_png, image_dimensions, is_valid_jpeg, json_request,
    login, send, text, PASSWORD, USERNAME,
};

const MAX_BYTES: usize = 1024 * 1024;

fn http_source() -> HttpImageSource {
    HttpImageSource::new(Duration::from_secs(5), MAX_BYTES).unwrap()
}

#[tokio::test]
async fn test_served_png_becomes_thumbnail() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/photo.png");
            then.status(200)
                .header("content-type", "image/png")
                .body(create_test_png(300, 200));
        })
        .await;

    let router = create_router_with_service(ThumbnailService::new(http_source()));
    let token = login(&router, USERNAME, PASSWORD).await;

    let request = json_request(
        "/api/getThumbnail",
        Some(&token),
        &json!({"url": server.url("/photo.png")}),
    );
    let (status, body) = send(&router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(is_valid_jpeg(&body));
    assert_eq!(image_dimensions(&body), (50, 50));

    mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn test_html_page_is_invalid_image() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200)
                .header("content-type", "text/html")
                .body("<html><body>not an image</body></html>");
        })
        .await;

    let router = create_router_with_service(ThumbnailService::new(http_source()));
    let token = login(&router, USERNAME, PASSWORD).await;

    let request = json_request(
        "/api/getThumbnail",
        Some(&token),
        &json!({"url": server.url("/")}),
    );
    let (status, body) = send(&router, request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(text(&body), "Invalid Image URL was given");
}

#[tokio::test]
async fn test_not_found_maps_to_status_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/missing.png");
            then.status(404);
        })
        .await;

    let url = Url::parse(&server.url("/missing.png")).unwrap();
    let err = http_source().fetch(&url).await.unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/huge.png");
            then.status(200).body(vec![0u8; 4096]);
        })
        .await;

    let source = HttpImageSource::new(Duration::from_secs(5), 1024).unwrap();
    assert_eq!(source.max_bytes(), 1024);
    let url = Url::parse(&server.url("/huge.png")).unwrap();
    let err = source.fetch(&url).await.unwrap_err();

    assert!(matches!(err, FetchError::TooLarge { limit: 1024, .. }));
}

#[tokio::test]
async fn test_unreachable_host_is_request_error() {
    let url = Url::parse("http://127.0.0.1:1/image.png").unwrap();
    let err = http_source().fetch(&url).await.unwrap_err();

    assert!(matches!(err, FetchError::Request { .. }));
}
