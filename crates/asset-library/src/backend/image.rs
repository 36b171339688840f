//! Image generation via the Gemini image model

use serde_json::{json, Value};

use super::BackendError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";

/// Generates images from a text prompt
pub struct ImageGenerator {
    http_client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl ImageGenerator {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Generate an image and return it as a data URI
    pub async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        if prompt.trim().is_empty() {
            return Err(BackendError::InvalidInput("Please enter a prompt.".to_string()));
        }
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            BackendError::NotConfigured(
                "Gemini API key is not configured. Set the GEMINI_API_KEY environment variable."
                    .to_string(),
            )
        })?;

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseModalities": ["IMAGE"] },
        });

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BackendError::from_response("Gemini", response).await);
        }

        let body: Value = response.json().await?;
        extract_inline_image(&body).ok_or_else(|| {
            BackendError::MissingPayload("No image data found in the response.".to_string())
        })
    }
}

/// First inline image part of a `generateContent` response, as a data URI
fn extract_inline_image(body: &Value) -> Option<String> {
    let parts = body
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    parts.iter().find_map(|part| {
        let inline = part.get("inlineData")?;
        let mime = inline.get("mimeType")?.as_str()?;
        let data = inline.get("data")?.as_str()?;
        Some(format!("data:{};base64,{}", mime, data))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_inline_image_skips_text_parts() {
        let body = json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Here is your image" },
                        { "inlineData": { "mimeType": "image/png", "data": "AAA" } }
                    ]
                }
            }]
        });
        assert_eq!(
            extract_inline_image(&body),
            Some("data:image/png;base64,AAA".to_string())
        );
    }

    #[test]
    fn test_extract_inline_image_missing() {
        let body = json!({ "candidates": [{ "content": { "parts": [{ "text": "no" }] } }] });
        assert_eq!(extract_inline_image(&body), None);
        assert_eq!(extract_inline_image(&json!({})), None);
    }

    #[tokio::test]
    async fn test_generate_requires_key() {
        let generator = ImageGenerator::new(None);
        let err = generator.generate("a logo").await.unwrap_err();
        assert!(matches!(err, BackendError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_prompt() {
        let generator = ImageGenerator::new(Some("key".to_string()));
        let err = generator.generate("   ").await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter a prompt.");
    }
}
