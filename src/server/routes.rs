//! Router configuration for the background removal service.
//!
//! # Route Structure
//!
//! ```text
//! /health      - Health check (public)
//! /removebg    - Background removal (API key required)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use bg_remover::extract::NativeExtractor;
//! use bg_remover::removal::RemovalService;
//! use bg_remover::server::routes::{create_router, RouterConfig};
//!
//! let service = RemovalService::new(NativeExtractor::default());
//! let config = RouterConfig::new("my-secret-key")
//!     .with_cors_origins(vec!["https://example.com".to_string()]);
//!
//! let router = create_router(service, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use http::header::{CONTENT_TYPE, HeaderName};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::{api_key_middleware, ApiKeyAuth, API_KEY_HEADER};
use super::handlers::{health_handler, remove_bg_handler, AppState};
use crate::extract::ForegroundExtractor;
use crate::removal::RemovalService;

/// Default request body limit for `/removebg` (64 MiB of base64 text).
pub const DEFAULT_MAX_BODY_SIZE: usize = 64 * 1024 * 1024;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone)]
pub struct RouterConfig {
    /// Shared API key; empty means every `/removebg` call is rejected
    pub api_key: String,

    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Maximum accepted request body size in bytes
    pub max_body_size: usize,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a router configuration with the given API key.
    ///
    /// By default:
    /// - CORS allows any origin
    /// - Body limit is [`DEFAULT_MAX_BODY_SIZE`]
    /// - Tracing is enabled
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            cors_origins: None,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    pub fn with_max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

impl std::fmt::Debug for RouterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterConfig")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("cors_origins", &self.cors_origins)
            .field("max_body_size", &self.max_body_size)
            .field("enable_tracing", &self.enable_tracing)
            .finish()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// - `/health` is public
/// - `/removebg` sits behind the API key middleware, which runs before the
///   request body is read
/// - CORS and (optionally) request tracing wrap everything
pub fn create_router<E>(removal: RemovalService<E>, config: RouterConfig) -> Router
where
    E: ForegroundExtractor + 'static,
{
    let app_state = AppState::new(removal);
    let auth = ApiKeyAuth::new(&config.api_key);

    let protected_routes = Router::new()
        .route("/removebg", post(remove_bg_handler::<E>))
        .with_state(app_state)
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .layer(middleware::from_fn_with_state(auth, api_key_middleware));

    let public_routes = Router::new().route("/health", get(health_handler));

    let router = Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .layer(build_cors_layer(&config));

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(API_KEY_HEADER)])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
