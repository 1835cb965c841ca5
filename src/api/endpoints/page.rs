//! The single page.

use axum::response::Html;

const PAGE: &str = include_str!("../page.html");

/// `GET /`
pub async fn index() -> Html<&'static str> {
    Html(PAGE)
}
