//! Base64 `data:` URLs.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use super::client::AiError;

/// Encodes bytes as `data:{mime};base64,{payload}`.
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Decodes a base64 `data:` URL into its MIME type and bytes.
///
/// A missing MIME type defaults to `application/octet-stream`.
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>), AiError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| AiError::InvalidInput("expected a data: URL".to_string()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| AiError::InvalidInput("data URL has no payload".to_string()))?;
    let mime = meta
        .strip_suffix(";base64")
        .ok_or_else(|| AiError::InvalidInput("data URL is not base64 encoded".to_string()))?;
    let mime = if mime.is_empty() {
        "application/octet-stream"
    } else {
        mime
    };

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| AiError::InvalidInput(format!("invalid base64: {}", e)))?;
    Ok((mime.to_string(), bytes))
}
