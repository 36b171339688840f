//! Builder UI page

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Single-page builder UI. The preview `iframe` is embedded from
/// `/api/preview`; messages it posts are forwarded to `/api/preview/messages`.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
