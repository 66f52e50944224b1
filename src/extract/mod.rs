//! Foreground extraction.
//!
//! The request handler only knows the [`ForegroundExtractor`] trait: raw image
//! bytes in, PNG with an alpha channel out. [`NativeExtractor`] is the built-in
//! implementation; tests and embedders can plug in their own.
//!
//! # Pipeline of the native extractor
//!
//! ```text
//! raw bytes ─► decode ─► segment (color models) ─► close/open ─► edge filter ─► RGBA PNG
//!                             │                                     │
//!                        border inset                     blur | bilateral | guided
//! ```

mod native;
mod options;
mod refine;
mod segment;

pub use native::{encode_png, NativeExtractor};
pub use options::{EdgeMode, ExtractOptions, QualityPreset, MAX_ITERATIONS, MIN_ITERATIONS};
pub use segment::{segment, Segmentation, BACKGROUND, FOREGROUND};

use bytes::Bytes;

use crate::error::ExtractionError;

/// Separates the subject of an image from its background.
///
/// Implementations must be deterministic for a given input and free of side
/// effects the caller could observe. `extract` is CPU-bound and blocking; async
/// callers should run it on a blocking thread.
pub trait ForegroundExtractor: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Produce a PNG, at the input's pixel dimensions, whose alpha channel is
    /// transparent wherever background was removed.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`] when no foreground can be identified or
    /// the image cannot be processed.
    fn extract(&self, image: &[u8]) -> Result<Bytes, ExtractionError>;
}
