//! Third-party asset generation backends
//!
//! Thin HTTP clients for the services that produce asset content:
//! - **Image**: Gemini image model, returns inline base64 image data
//! - **Speech**: ElevenLabs text-to-speech, returns `audio/mpeg` bytes
//! - **Stock**: Pexels photo search, returns remote image URLs
//!
//! Every backend resolves to a content locator (data URI) that the caller
//! stores through [`crate::AssetStore::create`]. Failures carry the raw HTTP
//! status and body so the originating panel can show them verbatim.

pub mod image;
pub mod speech;
pub mod stock;

pub use image::ImageGenerator;
pub use speech::{SpeechGenerator, Voice, VOICES};
pub use stock::{StockPhoto, StockPhotoSearch, StockPhotoSources};

/// Error types for backend calls
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Required API key is absent
    #[error("{0}")]
    NotConfigured(String),

    /// The user input was rejected before any request was made
    #[error("{0}")]
    InvalidInput(String),

    /// The service answered with a non-success status
    #[error("{service} API error ({status}): {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// The response was successful but lacked the expected payload field
    #[error("{0}")]
    MissingPayload(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl BackendError {
    /// Build a status error from a failed response, consuming its body
    pub(crate) async fn from_response(service: &'static str, response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        BackendError::Status {
            service,
            status,
            body,
        }
    }
}

/// Read an API key from the first non-empty environment variable in `names`
pub fn api_key_from_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}
