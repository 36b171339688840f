//! Validation of raw model output

use serde_json::Value;

use crate::error::CodegenError;
use crate::types::CodeGeneration;

/// Validate the raw response text into a [`CodeGeneration`].
///
/// Both keys must be present as non-empty strings; anything else counts as
/// missing.
pub fn parse_generation(text: Option<&str>) -> Result<CodeGeneration, CodegenError> {
    let text = match text {
        Some(text) if !text.trim().is_empty() => text,
        _ => return Err(CodegenError::EmptyResponse),
    };

    let value: Value =
        serde_json::from_str(text).map_err(|e| CodegenError::MalformedResponse(e.to_string()))?;

    let explanation = non_empty_string(&value, "explanation");
    let code = non_empty_string(&value, "code");

    match (explanation, code) {
        (Some(explanation), Some(code)) => Ok(CodeGeneration {
            explanation: explanation.to_string(),
            code: code.to_string(),
        }),
        (explanation, code) => {
            let mut missing = Vec::new();
            if explanation.is_none() {
                missing.push("explanation");
            }
            if code.is_none() {
                missing.push("code");
            }
            Err(CodegenError::MissingKeys(missing))
        }
    }
}

fn non_empty_string<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
