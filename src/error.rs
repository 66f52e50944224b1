use thiserror::Error;

/// Reasons a request fails the API key check.
///
/// Every variant is reported to the caller with the same fixed message; the
/// distinction only exists for logging.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The server has no API key configured, so nobody can be authorized
    #[error("no API key is configured on the server")]
    NotConfigured,

    /// The request did not carry an `X-Api-Key` header
    #[error("request has no API key")]
    MissingKey,

    /// The supplied key does not match the configured one
    #[error("API key does not match")]
    InvalidKey,
}

/// Errors produced while turning a base64 payload into a raster image.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Payload is not valid base64
    #[error("{0}")]
    Base64(#[from] base64::DecodeError),

    /// Decoded bytes do not start with the signature of any supported format
    #[error("cannot identify image file ({len} bytes)")]
    UnknownFormat { len: usize },

    /// Format was recognised but the image could not be decoded
    #[error("{0}")]
    Image(#[from] image::ImageError),
}

/// Errors produced by a foreground extractor.
#[derive(Debug, Clone, Error)]
pub enum ExtractionError {
    /// The extractor could not read the image bytes it was handed
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// The border inset leaves no interior to search for a subject
    #[error("image is too small ({width}x{height}) for a {inset_x}x{inset_y} px border inset")]
    ImageTooSmall {
        width: u32,
        height: u32,
        inset_x: u32,
        inset_y: u32,
    },

    /// Segmentation finished without any pixel labelled as foreground
    #[error("no foreground pixels remained after segmentation")]
    NoForeground,

    /// The cut-out could not be encoded as PNG
    #[error("failed to encode PNG: {0}")]
    Encode(String),

    /// Failure reported by a third-party extraction backend
    #[error("{0}")]
    Backend(String),
}

/// Top-level error for a background removal request.
///
/// This is the single taxonomy the HTTP layer maps to status codes.
#[derive(Debug, Error)]
pub enum RemoveBgError {
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AuthError),

    #[error("invalid image data: {0}")]
    InvalidInput(#[from] DecodeError),

    #[error("could not identify foreground: {0}")]
    Extraction(#[from] ExtractionError),

    /// Anything outside the taxonomy above (e.g. a panicked worker task)
    #[error("internal error: {0}")]
    Internal(String),
}
