//! Gemini backend
//!
//! Calls `models/{model}:generateContent` over HTTP with a response schema that
//! forces a `{explanation, code}` JSON object.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::CodegenBackend;
use crate::error::CodegenError;
use crate::types::CodegenRequest;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Environment variables checked for an API key, in order
pub const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Gemini `generateContent` client
pub struct GeminiBackend {
    http_client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl GeminiBackend {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Backend using the first API key found in [`API_KEY_VARS`]
    pub fn from_env() -> Self {
        let api_key = API_KEY_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty());
        if api_key.is_none() {
            log::warn!("No Gemini API key found; set GEMINI_API_KEY to enable code generation");
        }
        Self::new(api_key)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Request body for `request`
    fn build_body(request: &CodegenRequest) -> Value {
        json!({
            "systemInstruction": {
                "parts": [{ "text": request.system_prompt }]
            },
            "contents": request.contents(),
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "explanation": {
                            "type": "STRING",
                            "description": "A user-friendly, conversational explanation of the changes made. This should be in markdown format."
                        },
                        "code": {
                            "type": "STRING",
                            "description": format!(
                                "The complete, self-contained {} component code for the application. The component must be the default export or follow the SFC standard.",
                                request.framework
                            )
                        }
                    },
                    "required": ["explanation", "code"]
                }
            }
        })
    }

    /// Concatenated text of the first candidate, if it has any
    fn extract_text(response: GenerateResponse) -> Option<String> {
        let content = response.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[async_trait]
impl CodegenBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, request: &CodegenRequest) -> Result<Option<String>, CodegenError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            CodegenError::NotConfigured(
                "Gemini API key is not configured. Set the GEMINI_API_KEY environment variable."
                    .to_string(),
            )
        })?;

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        log::debug!(
            "Sending {} messages to {} ({})",
            request.history.len() + 1,
            self.model,
            request.language
        );

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&Self::build_body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CodegenError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| CodegenError::MalformedResponse(e.to_string()))?;
        Ok(Self::extract_text(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;

    fn request() -> CodegenRequest {
        CodegenRequest {
            history: vec![ChatMessage::user("Build a counter")],
            system_prompt: "You are an expert React developer.".to_string(),
            current_code: "export default () => null;".to_string(),
            language: "jsx".to_string(),
            framework: "React".to_string(),
        }
    }

    #[test]
    fn test_body_carries_schema_and_history() {
        let body = GeminiBackend::build_body(&request());
        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "You are an expert React developer."
        );
        assert_eq!(body["contents"].as_array().unwrap().len(), 2);
        assert_eq!(body["contents"][1]["role"], "model");
        let schema = &body["generationConfig"]["responseSchema"];
        assert_eq!(schema["required"], json!(["explanation", "code"]));
        assert!(schema["properties"]["code"]["description"]
            .as_str()
            .unwrap()
            .contains("self-contained React component"));
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"role": "model", "parts": [{"text": "{\"explanation\""}, {"text": ": \"x\"}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(
            GeminiBackend::extract_text(response).as_deref(),
            Some(r#"{"explanation": "x"}"#)
        );
    }

    #[test]
    fn test_extract_text_blocked_candidate() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        assert!(GeminiBackend::extract_text(response).is_none());
        let empty: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(GeminiBackend::extract_text(empty).is_none());
    }

    #[tokio::test]
    async fn test_generate_requires_key() {
        let backend = GeminiBackend::new(None);
        assert!(!backend.is_configured());
        let err = backend.generate(&request()).await.unwrap_err();
        assert!(matches!(err, CodegenError::NotConfigured(_)));
    }
}
