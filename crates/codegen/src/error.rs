//! Error types for code generation

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("{0}")]
    NotConfigured(String),

    #[error("The AI returned an empty or invalid response. This could be due to a content safety filter.")]
    EmptyResponse,

    #[error("The AI response was not valid JSON: {0}")]
    MalformedResponse(String),

    #[error("AI response is missing 'explanation' or 'code' keys. (missing: {})", .0.join(", "))]
    MissingKeys(Vec<&'static str>),

    #[error("Model API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_message() {
        let err = CodegenError::MissingKeys(vec!["code"]);
        assert_eq!(
            err.to_string(),
            "AI response is missing 'explanation' or 'code' keys. (missing: code)"
        );
    }
}
