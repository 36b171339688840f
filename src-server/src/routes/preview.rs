//! Preview pane handlers

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use preview_pipeline::{
    ErrorSurface, MessageDisposition, Platform, PreviewWarning, RenderOutcome,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct PreviewState {
    pub pane_id: String,
    pub platform: Platform,
    /// Generation of the loaded document; `None` before the first render
    pub generation: Option<u64>,
    pub mount_state: &'static str,
    pub warnings: Vec<PreviewWarning>,
    pub error: Option<String>,
    /// `iframe` markup for the loaded document
    pub embed: Option<String>,
}

pub async fn get_preview(State(state): State<SharedState>) -> Json<PreviewState> {
    let renderer = state.dispatcher.renderer();
    let document = renderer.document();
    Json(PreviewState {
        pane_id: renderer.pane_id().to_string(),
        platform: state.dispatcher.platform(),
        generation: renderer.current_generation(),
        mount_state: renderer.mount_state().as_str(),
        warnings: document
            .as_ref()
            .map(|doc| doc.warnings.clone())
            .unwrap_or_default(),
        error: state.banner.current(),
        embed: document.map(|_| renderer.embed_markup()),
    })
}

/// Render the current code now, bypassing the edit debounce
pub async fn render_now(State(state): State<SharedState>) -> ApiResult<Json<RenderOutcome>> {
    let code = state.current_code();
    let outcome = state.dispatcher.render(&code, &state.assets).await?;
    Ok(Json(outcome))
}

/// Message posted by the sandbox, forwarded by the host page
pub async fn post_message(
    State(state): State<SharedState>,
    Json(data): Json<Value>,
) -> Json<Value> {
    let disposition: MessageDisposition = state.dispatcher.renderer().handle_message(&data);
    Json(json!({ "disposition": disposition }))
}

/// Standalone document for the current code, for opening in its own tab
pub async fn export(State(state): State<SharedState>) -> ApiResult<Response> {
    let code = state.current_code();
    let document = match state.dispatcher.export(&code, &state.assets).await {
        Ok(document) => document,
        Err(e) => {
            let err = ApiError::Export(e);
            state.banner.show_error(&err.to_string());
            return Err(err);
        }
    };

    let filename = format!(
        "{}-preview-{}.html",
        document.platform,
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", filename),
            ),
        ],
        document.html,
    )
        .into_response())
}

pub async fn get_error(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({ "error": state.banner.current() }))
}

pub async fn dismiss_error(State(state): State<SharedState>) -> StatusCode {
    state.banner.clear_error();
    StatusCode::NO_CONTENT
}
