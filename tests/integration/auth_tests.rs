//! Authentication integration tests.
//!
//! Tests verify:
//! - The configured key authorizes requests
//! - Missing and wrong keys are rejected before the body is looked at
//! - An empty configured key rejects everything
//! - The health endpoint stays public

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use bg_remover::removal::RemovalService;
use bg_remover::{create_router, RouterConfig};

use super::test_utils::{
    form_body, image_request, removebg_request, rgb_jpeg, to_base64, RecordingExtractor,
    TEST_API_KEY,
};

async fn assert_unauthorized(response: axum::response::Response) {
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error, serde_json::json!({"detail": "invalid or missing API key"}));
}

fn valid_body() -> String {
    let encoded = to_base64(&rgb_jpeg());
    form_body(&[("image_file_b64", encoded.as_str())])
}

// =============================================================================
// Valid Key
// =============================================================================

#[tokio::test]
async fn test_valid_key_succeeds() {
    let extractor = RecordingExtractor::new();
    let router = create_router(
        RemovalService::new(extractor.clone()),
        RouterConfig::new(TEST_API_KEY),
    );

    let response = router.oneshot(image_request(&rgb_jpeg(), None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extractor.call_count(), 1);
}

// =============================================================================
// Rejected Keys
// =============================================================================

#[tokio::test]
async fn test_missing_key_rejected() {
    let extractor = RecordingExtractor::new();
    let router = create_router(
        RemovalService::new(extractor.clone()),
        RouterConfig::new(TEST_API_KEY),
    );

    let response = router
        .oneshot(removebg_request(None, valid_body()))
        .await
        .unwrap();

    assert_unauthorized(response).await;
    assert_eq!(extractor.call_count(), 0);
}

#[tokio::test]
async fn test_wrong_key_rejected() {
    let router = create_router(
        RemovalService::new(RecordingExtractor::new()),
        RouterConfig::new(TEST_API_KEY),
    );

    let response = router
        .oneshot(removebg_request(Some("not-the-key"), valid_body()))
        .await
        .unwrap();

    assert_unauthorized(response).await;
}

#[tokio::test]
async fn test_key_prefix_rejected() {
    let router = create_router(
        RemovalService::new(RecordingExtractor::new()),
        RouterConfig::new(TEST_API_KEY),
    );

    let prefix = &TEST_API_KEY[..TEST_API_KEY.len() - 1];
    let response = router
        .oneshot(removebg_request(Some(prefix), valid_body()))
        .await
        .unwrap();

    assert_unauthorized(response).await;
}

#[tokio::test]
async fn test_empty_key_header_rejected() {
    let router = create_router(
        RemovalService::new(RecordingExtractor::new()),
        RouterConfig::new(TEST_API_KEY),
    );

    let response = router
        .oneshot(removebg_request(Some(""), valid_body()))
        .await
        .unwrap();

    assert_unauthorized(response).await;
}

#[tokio::test]
async fn test_bad_key_wins_over_bad_body() {
    // Garbage payload and no content type: auth still answers first
    for body in ["image_file_b64=%%%", "", "{\"json\": true}"] {
        let router = create_router(
            RemovalService::new(RecordingExtractor::new()),
            RouterConfig::new(TEST_API_KEY),
        );

        let request = Request::builder()
            .method("POST")
            .uri("/removebg")
            .header("x-api-key", "wrong")
            .body(Body::from(body))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_unauthorized(response).await;
    }
}

// =============================================================================
// Unconfigured Server
// =============================================================================

#[tokio::test]
async fn test_empty_configured_key_rejects_everything() {
    for provided in [None, Some(""), Some(TEST_API_KEY)] {
        let extractor = RecordingExtractor::new();
        let router = create_router(RemovalService::new(extractor.clone()), RouterConfig::new(""));

        let response = router
            .oneshot(removebg_request(provided, valid_body()))
            .await
            .unwrap();

        assert_unauthorized(response).await;
        assert_eq!(extractor.call_count(), 0);
    }
}

// =============================================================================
// Public Endpoints
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_public() {
    for api_key in [TEST_API_KEY, ""] {
        let router = create_router(
            RemovalService::new(RecordingExtractor::new()),
            RouterConfig::new(api_key),
        );

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }
}
