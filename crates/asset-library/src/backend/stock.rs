//! Stock photo search via Pexels

use serde::{Deserialize, Serialize};

use super::BackendError;
use crate::data_uri;

const DEFAULT_BASE_URL: &str = "https://api.pexels.com/v1";
const RESULTS_PER_PAGE: u32 = 12;

/// Host that serves the photos a search returns; imports are limited to it
const PHOTO_HOST: &str = "images.pexels.com";

/// Image size variants returned for a photo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockPhotoSources {
    pub large: String,
    pub medium: String,
}

/// A single search result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockPhoto {
    pub id: u64,
    pub src: StockPhotoSources,
    #[serde(default)]
    pub alt: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    photos: Option<Vec<StockPhoto>>,
}

/// Searches stock photos and fetches the chosen one as asset content
pub struct StockPhotoSearch {
    http_client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl StockPhotoSearch {
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

    /// Search for photos; an empty query returns no results without a request
    pub async fn search(&self, query: &str) -> Result<Vec<StockPhoto>, BackendError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            BackendError::NotConfigured(
                "Pexels API key is not configured. Set the PEXELS_API_KEY environment variable."
                    .to_string(),
            )
        })?;

        let url = format!("{}/search", self.base_url);
        let per_page = RESULTS_PER_PAGE.to_string();
        let response = self
            .http_client
            .get(&url)
            .header("Authorization", api_key)
            .query(&[("query", query), ("per_page", per_page.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BackendError::from_response("Pexels", response).await);
        }

        let body: SearchResponse = response.json().await?;
        body.photos.ok_or_else(|| {
            BackendError::MissingPayload("Pexels response did not include photos.".to_string())
        })
    }

    /// Download a photo and encode it as a data URI.
    ///
    /// Only https URLs on the Pexels photo host are fetched; anything else is
    /// rejected before a request is made.
    pub async fn fetch_as_data_uri(&self, url: &str) -> Result<String, BackendError> {
        let url = photo_url(url)?;
        let response = self.http_client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(BackendError::from_response("Pexels", response).await);
        }

        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.split(';').next().unwrap_or(value).trim().to_string())
            .filter(|value| value.starts_with("image/"))
            .unwrap_or_else(|| "image/jpeg".to_string());

        let bytes = response.bytes().await?;
        Ok(data_uri::encode(&mime, &bytes))
    }
}

fn photo_url(raw: &str) -> Result<reqwest::Url, BackendError> {
    let rejected = || {
        log::warn!("Refusing to import stock photo from {:?}", raw);
        BackendError::InvalidInput("Only Pexels photo URLs can be imported.".to_string())
    };
    let url = reqwest::Url::parse(raw.trim()).map_err(|_| rejected())?;
    let allowed = url.scheme() == "https"
        && url.host_str() == Some(PHOTO_HOST)
        && url.port().is_none()
        && url.username().is_empty()
        && url.password().is_none();
    if allowed {
        Ok(url)
    } else {
        Err(rejected())
    }
}
