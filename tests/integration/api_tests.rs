//! API integration tests for background removal and error handling.
//!
//! Tests verify:
//! - Successful removal returns a PNG
//! - Decode failures map to 400 with the decoder's message
//! - Extraction failures map to 422 with a stable label
//! - The size hint never changes the response
//! - The built-in extractor works end-to-end

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use bg_remover::extract::{ExtractOptions, NativeExtractor, QualityPreset};
use bg_remover::removal::RemovalService;
use bg_remover::{create_router, ForegroundExtractor, RouterConfig};

use super::test_utils::{
    form_body, grayscale_png, image_request, is_valid_png, palette_gif, removebg_request, rgb_jpeg,
    subject_on_white_png, to_base64, transparent_png, FailingExtractor, RecordingExtractor,
    TEST_API_KEY,
};

fn router_with<E: ForegroundExtractor + 'static>(extractor: E) -> Router {
    create_router(RemovalService::new(extractor), RouterConfig::new(TEST_API_KEY))
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let router = router_with(RecordingExtractor::new());

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json, serde_json::json!({"status": "ok"}));
}

// =============================================================================
// Successful Removal
// =============================================================================

#[tokio::test]
async fn test_removal_success_returns_png() {
    let extractor = RecordingExtractor::new();
    let router = router_with(extractor.clone());

    let response = router
        .oneshot(image_request(&rgb_jpeg(), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-type").unwrap(), "image/png");

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(!body.is_empty());
    assert!(is_valid_png(&body));
    assert_eq!(body.as_ref(), transparent_png().as_slice());
    assert_eq!(extractor.call_count(), 1);
}

#[tokio::test]
async fn test_extractor_receives_original_bytes() {
    let extractor = RecordingExtractor::new();
    let router = router_with(extractor.clone());
    let gray = grayscale_png();

    let response = router.oneshot(image_request(&gray, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(extractor.last_input().unwrap(), gray);
}

#[tokio::test]
async fn test_grayscale_and_palette_images_proceed() {
    for image in [grayscale_png(), palette_gif()] {
        let extractor = RecordingExtractor::new();
        let router = router_with(extractor.clone());

        let response = router.oneshot(image_request(&image, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(extractor.call_count(), 1);
    }
}

#[tokio::test]
async fn test_size_hint_does_not_change_response() {
    let image = rgb_jpeg();
    let mut bodies = Vec::new();

    for size in [None, Some("auto"), Some("preview"), Some("4k"), Some("")] {
        let router = router_with(RecordingExtractor::new());
        let response = router.oneshot(image_request(&image, size)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        bodies.push(response.into_body().collect().await.unwrap().to_bytes());
    }

    assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
}

// =============================================================================
// Invalid Input
// =============================================================================

#[tokio::test]
async fn test_invalid_base64_rejected() {
    let extractor = RecordingExtractor::new();
    let router = router_with(extractor.clone());

    let body = form_body(&[("image_file_b64", "not*valid*base64")]);
    let response = router
        .oneshot(removebg_request(Some(TEST_API_KEY), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    let detail = json["detail"].as_str().unwrap();
    assert!(detail.starts_with("invalid image data: "));
    assert!(detail.contains("Invalid symbol"), "detail: {}", detail);
    assert!(json.get("error").is_none());
    assert_eq!(extractor.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_format_rejected() {
    let extractor = RecordingExtractor::new();
    let router = router_with(extractor.clone());

    let payload = to_base64(b"hello, this is definitely not an image");
    let body = form_body(&[("image_file_b64", payload.as_str())]);
    let response = router
        .oneshot(removebg_request(Some(TEST_API_KEY), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert!(json["detail"]
        .as_str()
        .unwrap()
        .starts_with("invalid image data: "));
    assert_eq!(extractor.call_count(), 0);
}

#[tokio::test]
async fn test_truncated_image_rejected() {
    let router = router_with(RecordingExtractor::new());

    let png = subject_on_white_png(32, 8);
    let response = router
        .oneshot(image_request(&png[..png.len() / 2], None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_image_field_rejected() {
    let router = router_with(RecordingExtractor::new());

    let body = form_body(&[("size", "auto")]);
    let response = router
        .oneshot(removebg_request(Some(TEST_API_KEY), body))
        .await
        .unwrap();

    assert!(response.status().is_client_error());

    let json = json_body(response).await;
    assert!(json["detail"].is_string());
}

#[tokio::test]
async fn test_body_over_limit_rejected() {
    let extractor = RecordingExtractor::new();
    let router = create_router(
        RemovalService::new(extractor.clone()),
        RouterConfig::new(TEST_API_KEY).with_max_body_size(1024),
    );

    let payload = "A".repeat(4096);
    let body = form_body(&[("image_file_b64", payload.as_str())]);
    let response = router
        .oneshot(removebg_request(Some(TEST_API_KEY), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(extractor.call_count(), 0);
}

// =============================================================================
// Extraction Failures
// =============================================================================

#[tokio::test]
async fn test_extraction_failure_returns_422() {
    let router = router_with(FailingExtractor::new("subject too blurry"));

    let response = router
        .oneshot(image_request(&rgb_jpeg(), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = json_body(response).await;
    assert_eq!(json["error"], "could not identify foreground");
    assert_eq!(json["detail"], "subject too blurry");
}

#[tokio::test]
async fn test_decode_failure_takes_precedence_over_extractor() {
    let router = router_with(FailingExtractor::new("unreachable"));

    let body = form_body(&[("image_file_b64", "%%%")]);
    let response = router
        .oneshot(removebg_request(Some(TEST_API_KEY), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Native Extractor
// =============================================================================

#[tokio::test]
async fn test_native_extractor_end_to_end() {
    let extractor = NativeExtractor::new(ExtractOptions::from_preset(QualityPreset::Fast));
    let router = router_with(extractor);

    let response = router
        .oneshot(image_request(&subject_on_white_png(60, 20), Some("auto")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-type").unwrap(), "image/png");

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let cutout = image::load_from_memory(&body).unwrap().to_rgba8();
    assert_eq!(cutout.dimensions(), (60, 60));

    // Subject center is opaque, backdrop corner is transparent
    assert!(cutout.get_pixel(30, 30)[3] > 200);
    assert!(cutout.get_pixel(0, 0)[3] < 10);
}

#[tokio::test]
async fn test_native_extractor_uniform_image_returns_422() {
    let router = router_with(NativeExtractor::default());

    let blank = image::RgbImage::from_pixel(40, 40, image::Rgb([200, 200, 200]));
    let mut png = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(blank)
        .write_to(&mut png, image::ImageFormat::Png)
        .unwrap();

    let response = router
        .oneshot(image_request(png.get_ref(), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = json_body(response).await;
    assert_eq!(json["error"], "could not identify foreground");
    assert_eq!(
        json["detail"],
        "no foreground pixels remained after segmentation"
    );
}
