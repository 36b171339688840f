//! HTTP routes
//!
//! The builder UI is a single page served at `/`; everything else is a JSON
//! API over the shared [`AppState`](crate::state::AppState). The page and the
//! API share an origin, so no cross-origin access is granted.

mod assets;
mod chat;
mod editor;
mod preview;

use axum::routing::{get, post, put};
use axum::Router;

use crate::page;
use crate::state::SharedState;

/// Largest accepted upload batch
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(page::index))
        // Conversation
        .route("/api/state", get(chat::get_state))
        .route("/api/chat", post(chat::send_message))
        .route("/api/chat/draft", put(chat::set_draft))
        .route("/api/chat/placeholder", post(chat::insert_placeholder))
        // Editor
        .route("/api/code", get(editor::get_code).put(editor::update_code))
        .route("/api/platform", put(editor::set_platform))
        // Preview pane
        .route("/api/preview", get(preview::get_preview))
        .route("/api/preview/render", post(preview::render_now))
        .route("/api/preview/messages", post(preview::post_message))
        .route("/api/export", get(preview::export))
        .route(
            "/api/error",
            get(preview::get_error).delete(preview::dismiss_error),
        )
        // Asset library
        .route("/api/assets", get(assets::list))
        .route("/api/assets/placeholders", get(assets::placeholders))
        .route(
            "/api/assets/upload",
            post(assets::upload).layer(axum::extract::DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/assets/image", post(assets::generate_image))
        .route("/api/assets/sound", post(assets::generate_sound))
        .route("/api/assets/voices", get(assets::voices))
        .route(
            "/api/assets/stock",
            get(assets::search_stock).post(assets::import_stock),
        )
        .with_state(state)
}
