//! # bg-remover
//!
//! An HTTP service that removes the background of an image.
//!
//! Callers POST a base64-encoded image and receive a PNG whose background
//! pixels are transparent, at the same resolution as the input.
//!
//! ## Features
//!
//! - **Single endpoint**: `POST /removebg` with form fields `image_file_b64` and `size`
//! - **API key auth**: one shared secret, compared in constant time, fail-closed
//! - **Format support**: PNG, JPEG, GIF, BMP, WebP and TIFF inputs
//! - **Built-in extractor**: color-model segmentation with morphology and
//!   guided/bilateral/blur edge refinement; no model files needed
//! - **Pluggable**: any [`ForegroundExtractor`] can be served
//!
//! ## Architecture
//!
//! - [`config`] - CLI and configuration types
//! - [`decode`] - base64 payload and raster decoding
//! - [`extract`] - foreground extraction trait and native implementation
//! - [`removal`] - request orchestration (decode, then extract)
//! - [`server`] - Axum-based HTTP server, auth and routes
//!
//! ## Example
//!
//! ```rust,no_run
//! use bg_remover::{create_router, NativeExtractor, RemovalService, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = RemovalService::new(NativeExtractor::default());
//!     let router = create_router(service, RouterConfig::new("my-secret-key"));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod decode;
pub mod error;
pub mod extract;
pub mod removal;
pub mod server;

// Re-export commonly used types
pub use config::{Cli, Command, ExtractArgs, RemoveConfig, ServeConfig};
pub use decode::{decode_base64, decode_payload, ColorMode, DecodedImage, ImageInfo, ValidatedPayload};
pub use error::{AuthError, DecodeError, ExtractionError, RemoveBgError};
pub use extract::{EdgeMode, ExtractOptions, ForegroundExtractor, NativeExtractor, QualityPreset};
pub use removal::{RemovalRequest, RemovalResponse, RemovalService};
pub use server::{
    api_key_middleware, create_router, health_handler, remove_bg_handler, ApiKeyAuth, AppState,
    ErrorResponse, HealthResponse, RemoveBgForm, RouterConfig,
};
