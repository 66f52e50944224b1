//! Shared-secret API key authentication.
//!
//! Callers present the key in the `X-Api-Key` header. A request is authorized
//! only when the server has a non-empty key configured and the header matches
//! it exactly:
//!
//! ```text
//! POST /removebg
//! X-Api-Key: <BG_API_KEY>
//! ```
//!
//! # Security Properties
//!
//! - **Fail closed**: an empty or missing server key rejects every request
//! - **Constant-time comparison**: keys are compared with `subtle` so response
//!   timing does not reveal how many leading bytes matched
//! - **Non-leaking errors**: every rejection carries the same message
//!
//! # Example
//!
//! ```rust
//! use bg_remover::server::auth::ApiKeyAuth;
//!
//! let auth = ApiKeyAuth::new("my-secret-key");
//! assert!(auth.verify(Some("my-secret-key")).is_ok());
//! assert!(auth.verify(Some("guess")).is_err());
//! assert!(auth.verify(None).is_err());
//! ```

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::error::{AuthError, RemoveBgError};

/// Header carrying the caller's API key.
pub const API_KEY_HEADER: &str = "x-api-key";

// =============================================================================
// API Key Authentication
// =============================================================================

/// Verifies caller-supplied keys against the configured secret.
#[derive(Clone)]
pub struct ApiKeyAuth {
    secret: Vec<u8>,
}

impl ApiKeyAuth {
    /// Create an authenticator for the given secret.
    ///
    /// An empty secret is allowed and makes every call to [`verify`](Self::verify)
    /// fail.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Whether a non-empty secret is configured.
    pub fn is_configured(&self) -> bool {
        !self.secret.is_empty()
    }

    /// Check a caller-supplied key.
    pub fn verify(&self, provided: Option<&str>) -> Result<(), AuthError> {
        if !self.is_configured() {
            return Err(AuthError::NotConfigured);
        }

        let provided = provided.ok_or(AuthError::MissingKey)?;

        if provided.as_bytes().ct_eq(&self.secret).into() {
            Ok(())
        } else {
            Err(AuthError::InvalidKey)
        }
    }

    /// Check the `X-Api-Key` header of a request.
    ///
    /// A header that is not valid visible ASCII counts as a wrong key.
    pub fn verify_headers(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        match headers.get(API_KEY_HEADER) {
            None => self.verify(None),
            Some(value) => match value.to_str() {
                Ok(key) => self.verify(Some(key)),
                Err(_) if self.is_configured() => Err(AuthError::InvalidKey),
                Err(_) => Err(AuthError::NotConfigured),
            },
        }
    }
}

impl std::fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyAuth")
            .field("configured", &self.is_configured())
            .finish()
    }
}

// =============================================================================
// Axum Middleware
// =============================================================================

/// Axum middleware rejecting requests without a valid API key.
///
/// Runs before the body is read, so an unauthorized request gets a 401 no
/// matter what it carries.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, middleware, routing::post};
/// use bg_remover::server::auth::{ApiKeyAuth, api_key_middleware};
///
/// let auth = ApiKeyAuth::new("secret-key");
/// let app = Router::new()
///     .route("/removebg", post(remove_bg_handler))
///     .layer(middleware::from_fn_with_state(auth, api_key_middleware));
/// ```
pub async fn api_key_middleware(
    State(auth): State<ApiKeyAuth>,
    request: Request,
    next: Next,
) -> Result<Response, RemoveBgError> {
    auth.verify_headers(request.headers())?;
    Ok(next.run(request).await)
}

// =============================================================================
// Tests
// =============================================================================
