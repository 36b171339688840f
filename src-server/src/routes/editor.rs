//! Code editor and platform switch handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use preview_pipeline::Platform;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct CodeResponse {
    pub platform: Platform,
    pub language: &'static str,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCodeRequest {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct PlatformRequest {
    pub platform: String,
}

fn code_response(state: &SharedState) -> CodeResponse {
    let session = state.session.lock();
    let platform = session.platform();
    CodeResponse {
        platform,
        language: platform.code_language(),
        code: session.code().to_string(),
    }
}

pub async fn get_code(State(state): State<SharedState>) -> Json<CodeResponse> {
    Json(code_response(&state))
}

/// Manual edit of the active platform's code; the preview follows once
/// edits settle
pub async fn update_code(
    State(state): State<SharedState>,
    Json(request): Json<UpdateCodeRequest>,
) -> StatusCode {
    state.update_code(request.code);
    StatusCode::NO_CONTENT
}

pub async fn set_platform(
    State(state): State<SharedState>,
    Json(request): Json<PlatformRequest>,
) -> ApiResult<Json<CodeResponse>> {
    let platform: Platform = request.platform.parse().map_err(ApiError::BadRequest)?;
    state.switch_platform(platform);
    Ok(Json(code_response(&state)))
}
