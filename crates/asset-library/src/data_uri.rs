//! Data URI encoding for binary asset content

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Encode raw bytes as a `data:<mime>;base64,...` URI
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Extract the MIME type from a data URI, if it is one
pub fn mime_type(uri: &str) -> Option<&str> {
    let rest = uri.strip_prefix("data:")?;
    let end = rest.find([';', ','])?;
    Some(&rest[..end])
}
