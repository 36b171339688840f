//! Asset library handlers

use asset_library::{
    import_uploads, placeholder_for, AssetKind, AssetRecord, BackendError, StockPhoto,
    UploadReport, UploadedFile, Voice, VOICES,
};
use axum::extract::{Multipart, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct SoundRequest {
    pub text: String,
    #[serde(default)]
    pub voice_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StockQuery {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct StockImportRequest {
    pub url: String,
}

/// A freshly created asset and the token that references it
#[derive(Debug, Serialize)]
pub struct CreatedAsset {
    pub id: String,
    pub kind: AssetKind,
    pub placeholder: String,
    /// Chat draft after the placeholder was inserted, when it was
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<String>,
}

fn created(state: &SharedState, content: String, kind: AssetKind) -> CreatedAsset {
    let id = state.assets.create(content, kind);
    CreatedAsset {
        placeholder: placeholder_for(&id),
        id,
        kind,
        draft: None,
    }
}

pub async fn list(State(state): State<SharedState>) -> Json<Vec<AssetRecord>> {
    Json(state.assets.snapshot())
}

/// Placeholders for every image asset, space-separated
pub async fn placeholders(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({ "all": state.assets.all_image_placeholders() }))
}

/// Import a multipart batch of image files
pub async fn upload(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadReport>> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let name = field
            .file_name()
            .or_else(|| field.name())
            .unwrap_or("upload")
            .to_string();
        let mime_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read the file: {}: {}", name, e)))?;
        files.push(UploadedFile {
            name,
            mime_type,
            bytes: bytes.to_vec(),
        });
    }

    let report = import_uploads(&state.assets, files);
    log::info!(
        "Upload batch: {} created, {} skipped, {} failed",
        report.created.len(),
        report.skipped.len(),
        report.failed.len()
    );
    Ok(Json(report))
}

pub async fn generate_image(
    State(state): State<SharedState>,
    Json(request): Json<ImageRequest>,
) -> ApiResult<Json<CreatedAsset>> {
    let uri = state.images.generate(&request.prompt).await?;
    Ok(Json(created(&state, uri, AssetKind::Image)))
}

pub async fn generate_sound(
    State(state): State<SharedState>,
    Json(request): Json<SoundRequest>,
) -> ApiResult<Json<CreatedAsset>> {
    let uri = state
        .speech
        .synthesize(&request.text, request.voice_id.as_deref())
        .await?;
    Ok(Json(created(&state, uri, AssetKind::Sound)))
}

pub async fn voices() -> Json<&'static [Voice]> {
    Json(VOICES)
}

pub async fn search_stock(
    State(state): State<SharedState>,
    Query(query): Query<StockQuery>,
) -> ApiResult<Json<Vec<StockPhoto>>> {
    Ok(Json(state.stock.search(&query.query).await?))
}

/// Fetch a stock photo into the library and insert its placeholder into the
/// chat draft
pub async fn import_stock(
    State(state): State<SharedState>,
    Json(request): Json<StockImportRequest>,
) -> ApiResult<Json<CreatedAsset>> {
    let uri = state
        .stock
        .fetch_as_data_uri(&request.url)
        .await
        .map_err(|e| match e {
            BackendError::InvalidInput(_) => ApiError::from(e),
            e => ApiError::Upstream(format!("Failed to process image: {}", e)),
        })?;
    let mut asset = created(&state, uri, AssetKind::Image);
    let draft = state
        .session
        .lock()
        .insert_placeholder(&asset.placeholder)
        .to_string();
    asset.draft = Some(draft);
    Ok(Json(asset))
}
