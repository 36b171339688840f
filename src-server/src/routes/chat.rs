//! Conversation handlers

use axum::extract::State;
use axum::Json;
use preview_pipeline::ErrorSurface;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::session::{PendingTurn, SessionSnapshot};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    pub draft: String,
}

#[derive(Debug, Deserialize)]
pub struct PlaceholderRequest {
    pub placeholder: String,
}

pub async fn get_state(State(state): State<SharedState>) -> Json<SessionSnapshot> {
    Json(state.session.lock().snapshot())
}

/// Run one generation turn.
///
/// Model failures are not HTTP errors: they are reported in the conversation
/// and the code is left unchanged. The turn runs on its own task, so it still
/// completes and frees the session if the client goes away mid-request.
pub async fn send_message(
    State(state): State<SharedState>,
    Json(request): Json<SendMessageRequest>,
) -> ApiResult<Json<SessionSnapshot>> {
    let turn = state.session.lock().begin_turn(&request.message)?;
    let Some(turn) = turn else {
        return Ok(Json(state.session.lock().snapshot()));
    };

    state.banner.clear_error();
    let task = tokio::spawn(run_turn(state.clone(), turn));
    match task.await {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(e) => {
            let mut session = state.session.lock();
            session.abandon_turn(&format!("generation task failed: {}", e));
            Ok(Json(session.snapshot()))
        }
    }
}

async fn run_turn(state: SharedState, turn: PendingTurn) -> SessionSnapshot {
    let result = state.gateway.generate(&turn.request).await;

    let (refreshed, snapshot) = {
        let mut session = state.session.lock();
        let refreshed = session.complete_turn(turn, result);
        (refreshed, session.snapshot())
    };
    if let Some(code) = refreshed {
        state.schedule_render(code);
    }
    snapshot
}

pub async fn set_draft(
    State(state): State<SharedState>,
    Json(request): Json<DraftRequest>,
) -> Json<Value> {
    let mut session = state.session.lock();
    session.set_draft(request.draft);
    Json(json!({ "draft": session.draft() }))
}

pub async fn insert_placeholder(
    State(state): State<SharedState>,
    Json(request): Json<PlaceholderRequest>,
) -> Json<Value> {
    let mut session = state.session.lock();
    let draft = session.insert_placeholder(&request.placeholder);
    Json(json!({ "draft": draft }))
}
