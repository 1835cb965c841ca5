//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;
use crate::session::Phase;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub phase: Phase,
    pub version: &'static str,
}

/// `GET /api/health`: liveness, independent of model readiness.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        phase: ctx.session.phase(),
        version: crate::config::APP_VERSION,
    })
}
