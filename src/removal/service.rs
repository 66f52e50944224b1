//! Orchestrates one background removal request.

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use crate::decode::{decode_payload, ImageInfo};
use crate::error::RemoveBgError;
use crate::extract::ForegroundExtractor;

/// Value of the `size` field when the caller leaves it out.
pub const DEFAULT_SIZE_HINT: &str = "auto";

// =============================================================================
// Request / Response
// =============================================================================

/// An authenticated request to remove a background.
#[derive(Debug, Clone)]
pub struct RemovalRequest {
    /// Base64-encoded image
    pub image_b64: String,

    /// Requested output size. Accepted for compatibility and ignored: the
    /// output always has the input's resolution.
    pub size: String,
}

impl RemovalRequest {
    pub fn new(image_b64: impl Into<String>) -> Self {
        Self {
            image_b64: image_b64.into(),
            size: DEFAULT_SIZE_HINT.to_string(),
        }
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
        self
    }
}

/// Result of a successful removal.
#[derive(Debug, Clone)]
pub struct RemovalResponse {
    /// PNG with alpha channel
    pub png: Bytes,

    /// What the decoder saw in the input
    pub info: ImageInfo,
}

// =============================================================================
// Removal Service
// =============================================================================

/// Decodes a payload and hands the original bytes to a [`ForegroundExtractor`].
///
/// Holds no per-request state, so one instance is shared by every request.
pub struct RemovalService<E: ForegroundExtractor> {
    extractor: Arc<E>,
}

impl<E: ForegroundExtractor + 'static> RemovalService<E> {
    pub fn new(extractor: E) -> Self {
        Self {
            extractor: Arc::new(extractor),
        }
    }

    /// Create a service around an extractor that is shared elsewhere.
    pub fn with_shared_extractor(extractor: Arc<E>) -> Self {
        Self { extractor }
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    /// Run a request on the current thread.
    ///
    /// Decoding failures become [`RemoveBgError::InvalidInput`], extractor
    /// failures [`RemoveBgError::Extraction`].
    pub fn remove_blocking(&self, request: &RemovalRequest) -> Result<RemovalResponse, RemoveBgError> {
        process(self.extractor.as_ref(), request)
    }

    /// Run a request on tokio's blocking pool.
    ///
    /// Decoding and extraction are CPU-bound; keeping them off the async
    /// workers lets other requests (and health checks) proceed meanwhile.
    pub async fn remove(&self, request: RemovalRequest) -> Result<RemovalResponse, RemoveBgError> {
        let extractor = Arc::clone(&self.extractor);

        tokio::task::spawn_blocking(move || process(extractor.as_ref(), &request))
            .await
            .map_err(|e| RemoveBgError::Internal(format!("removal task failed: {}", e)))?
    }
}

impl<E: ForegroundExtractor> Clone for RemovalService<E> {
    fn clone(&self) -> Self {
        Self {
            extractor: Arc::clone(&self.extractor),
        }
    }
}

fn process<E: ForegroundExtractor + ?Sized>(
    extractor: &E,
    request: &RemovalRequest,
) -> Result<RemovalResponse, RemoveBgError> {
    let payload = decode_payload(&request.image_b64)?;
    debug!(
        width = payload.info.width,
        height = payload.info.height,
        format = ?payload.info.format,
        mode = %payload.info.source_mode,
        size_hint = %request.size,
        "decoded image payload"
    );

    let png = extractor.extract(&payload.raw)?;
    debug!(
        extractor = extractor.name(),
        output_bytes = png.len(),
        "foreground extracted"
    );

    Ok(RemovalResponse {
        png,
        info: payload.info,
    })
}

// =============================================================================
// Tests
// =============================================================================
