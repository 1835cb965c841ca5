//! Analyze trigger endpoint.

use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::presenter::AnalysisView;

/// `POST /api/analyze`: run one analysis.
///
/// `409` while another analysis is in flight, `503` before the session is
/// ready, `502` when the classifier fails.
pub async fn run(State(ctx): State<ApiContext>) -> Result<Json<AnalysisView>, ApiError> {
    let view = ctx.session.analyze().await?;
    Ok(Json(view))
}
