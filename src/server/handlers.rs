//! HTTP request handlers for the background removal API.
//!
//! # Endpoints
//!
//! - `POST /removebg` - Remove the background of a base64-encoded image
//! - `GET /health` - Health check endpoint

use axum::{
    extract::{rejection::FormRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::{AuthError, RemoveBgError};
use crate::extract::ForegroundExtractor;
use crate::removal::{RemovalRequest, RemovalResponse, RemovalService, DEFAULT_SIZE_HINT};

/// Detail sent with every 401, whatever the underlying reason.
pub const UNAUTHORIZED_DETAIL: &str = "invalid or missing API key";

/// Stable label of the 422 body.
pub const EXTRACTION_FAILED_LABEL: &str = "could not identify foreground";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the removal service.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<E: ForegroundExtractor> {
    pub removal: RemovalService<E>,
}

impl<E: ForegroundExtractor + 'static> AppState<E> {
    pub fn new(removal: RemovalService<E>) -> Self {
        Self { removal }
    }
}

impl<E: ForegroundExtractor> Clone for AppState<E> {
    fn clone(&self) -> Self {
        Self {
            removal: self.removal.clone(),
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Form fields of `POST /removebg`.
#[derive(Debug, Deserialize)]
pub struct RemoveBgForm {
    /// Base64-encoded image
    pub image_file_b64: String,

    /// Output size hint ("auto" by default); accepted and ignored
    #[serde(default = "default_size")]
    pub size: String,
}

fn default_size() -> String {
    DEFAULT_SIZE_HINT.to_string()
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error body.
///
/// Most errors only carry `detail`; extraction failures add a stable `error`
/// label so clients can branch on it without parsing the message.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Human-readable error message
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            error: None,
            detail: detail.into(),
        }
    }

    pub fn labelled(error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            detail: detail.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Map the error taxonomy to HTTP responses.
///
/// | Error          | Status | Body                                      |
/// |----------------|--------|-------------------------------------------|
/// | `Unauthorized` | 401    | `{"detail": "invalid or missing API key"}`|
/// | `InvalidInput` | 400    | `{"detail": "invalid image data: ..."}`   |
/// | `Extraction`   | 422    | `{"error": "...", "detail": "..."}`       |
/// | `Internal`     | 500    | `{"detail": "internal server error"}`     |
impl IntoResponse for RemoveBgError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            RemoveBgError::Unauthorized(reason) => {
                match reason {
                    AuthError::InvalidKey => warn!(
                        status = 401,
                        "Authentication failed: {}",
                        reason
                    ),
                    AuthError::NotConfigured => warn!(
                        status = 401,
                        "Authentication failed: {} (set BG_API_KEY)",
                        reason
                    ),
                    AuthError::MissingKey => debug!(
                        status = 401,
                        "Authentication failed: {}",
                        reason
                    ),
                }
                (StatusCode::UNAUTHORIZED, ErrorResponse::new(UNAUTHORIZED_DETAIL))
            }

            RemoveBgError::InvalidInput(cause) => {
                let detail = format!("invalid image data: {}", cause);
                warn!(status = 400, "Client error: {}", detail);
                (StatusCode::BAD_REQUEST, ErrorResponse::new(detail))
            }

            RemoveBgError::Extraction(cause) => {
                warn!(status = 422, "Extraction failed: {}", cause);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorResponse::labelled(EXTRACTION_FAILED_LABEL, cause.to_string()),
                )
            }

            RemoveBgError::Internal(message) => {
                error!(status = 500, "Server error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("internal server error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Turn a form extraction failure (wrong content type, missing field, body
/// too large) into the same JSON shape as the other errors.
fn form_rejection_response(rejection: FormRejection) -> Response {
    let status = rejection.status();
    let detail = rejection.body_text();
    debug!(status = status.as_u16(), "Rejected form body: {}", detail);

    (status, Json(ErrorResponse::new(detail))).into_response()
}

fn png_response(response: RemovalResponse) -> Response {
    (
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        response.png,
    )
        .into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle background removal requests.
///
/// # Endpoint
///
/// `POST /removebg` (`application/x-www-form-urlencoded`)
///
/// # Form Fields
///
/// - `image_file_b64`: base64-encoded image (required)
/// - `size`: output size hint, default `auto`; has no effect
///
/// # Headers
///
/// - `X-Api-Key`: shared secret (checked by the auth middleware)
///
/// # Response
///
/// - `200 OK`: PNG with alpha channel, `Content-Type: image/png`
/// - `400 Bad Request`: payload is not base64 or not a readable image
/// - `401 Unauthorized`: missing or wrong API key
/// - `422 Unprocessable Entity`: no foreground found, or a required form field is missing
pub async fn remove_bg_handler<E: ForegroundExtractor + 'static>(
    State(state): State<AppState<E>>,
    form: Result<Form<RemoveBgForm>, FormRejection>,
) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => return form_rejection_response(rejection),
    };

    let request = RemovalRequest::new(form.image_file_b64).with_size(form.size);

    match state.removal.remove(request).await {
        Ok(response) => {
            info!(
                width = response.info.width,
                height = response.info.height,
                output_bytes = response.png.len(),
                "Background removed"
            );
            png_response(response)
        }
        Err(err) => err.into_response(),
    }
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body `{"status": "ok"}`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
