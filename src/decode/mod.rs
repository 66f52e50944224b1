//! Request payload decoding.
//!
//! Turns the `image_file_b64` form field into raw image bytes and checks that
//! those bytes are an image the service can work with.
//!
//! ```text
//! base64 text ──► raw bytes ──► DecodedImage (RGB or RGBA)
//!                     │                │
//!                     │                └── dropped after validation
//!                     ▼
//!              forwarded to the extractor unchanged
//! ```
//!
//! The normalized raster only proves the bytes are decodable. Extraction always
//! works from the original bytes so nothing about the input (resolution, bit
//! depth, embedded alpha) is lost on the way.

mod payload;
mod raster;

pub use payload::decode_base64;
pub use raster::{ColorMode, DecodedImage, ImageInfo};

use crate::error::DecodeError;

/// A payload whose bytes are known to decode to a supported image.
#[derive(Debug, Clone)]
pub struct ValidatedPayload {
    /// The bytes exactly as the caller sent them, after base64 decoding
    pub raw: Vec<u8>,

    /// What the decoder saw in those bytes
    pub info: ImageInfo,
}

/// Decode a base64 payload and validate that it is a readable image.
///
/// The decoded raster is normalized to RGB/RGBA and then discarded; only the
/// raw bytes and a summary of the image are returned.
pub fn decode_payload(payload: &str) -> Result<ValidatedPayload, DecodeError> {
    let raw = decode_base64(payload)?;
    let info = DecodedImage::from_bytes(&raw)?.info();

    Ok(ValidatedPayload { raw, info })
}
