//! Text-to-speech via ElevenLabs

use serde::Serialize;
use serde_json::json;

use super::BackendError;
use crate::data_uri;

const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io/v1";
const MODEL_ID: &str = "eleven_monolingual_v1";

/// A selectable voice
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Voice {
    pub id: &'static str,
    pub name: &'static str,
}

/// Voices offered in the sound panel; the first is the default
pub const VOICES: &[Voice] = &[
    Voice { id: "21m00Tcm4TlvDq8ikWAM", name: "Rachel" },
    Voice { id: "AZnzlk1XvdvUeBnXmlld", name: "Domi" },
    Voice { id: "EXAVITQu4vr4xnSDxMaL", name: "Bella" },
    Voice { id: "ErXwobaYiN019PkySvjV", name: "Antoni" },
    Voice { id: "MF3mGyEYCl7XYWbV9V6O", name: "Elli" },
];

/// Synthesizes speech audio from text
pub struct SpeechGenerator {
    http_client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl SpeechGenerator {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Synthesize `text` with `voice_id` (default voice when `None`) and
    /// return the audio as a data URI
    pub async fn synthesize(&self, text: &str, voice_id: Option<&str>) -> Result<String, BackendError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            BackendError::NotConfigured(
                "ElevenLabs API key is not configured. Set the ELEVENLABS_API_KEY environment variable."
                    .to_string(),
            )
        })?;
        if text.trim().is_empty() {
            return Err(BackendError::InvalidInput(
                "Please enter some text to generate audio.".to_string(),
            ));
        }

        let voice_id = voice_id.unwrap_or(VOICES[0].id);
        let url = format!("{}/text-to-speech/{}", self.base_url, voice_id);
        let request = json!({
            "text": text,
            "model_id": MODEL_ID,
            "voice_settings": { "stability": 0.5, "similarity_boost": 0.5 },
        });

        let response = self
            .http_client
            .post(&url)
            .header("Accept", "audio/mpeg")
            .header("xi-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BackendError::from_response("ElevenLabs", response).await);
        }

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(BackendError::MissingPayload(
                "ElevenLabs returned an empty audio stream.".to_string(),
            ));
        }

        log::debug!("Synthesized {} bytes of audio with voice {}", audio.len(), voice_id);
        Ok(data_uri::encode("audio/mpeg", &audio))
    }
}
