//! Base64 payload handling.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::DecodeError;

/// Decode a standard-alphabet, padded base64 string into bytes.
///
/// ASCII whitespace is ignored so payloads wrapped at 76 columns (as produced by
/// `base64` on most systems) are accepted. Any other byte outside the standard
/// alphabet is an error rather than being skipped.
pub fn decode_base64(payload: &str) -> Result<Vec<u8>, DecodeError> {
    let bytes = if payload.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: Vec<u8> = payload
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        STANDARD.decode(compact)?
    } else {
        STANDARD.decode(payload)?
    };

    Ok(bytes)
}
