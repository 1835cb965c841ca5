//! Session snapshot endpoint.

use axum::extract::State;
use axum::Json;

use crate::api::types::ApiContext;
use crate::session::SessionSnapshot;

/// `GET /api/session`: current phase, status line, trigger state, the
/// displayed review, last result and last error. Polled by the page.
pub async fn snapshot(State(ctx): State<ApiContext>) -> Json<SessionSnapshot> {
    Json(ctx.session.snapshot())
}
