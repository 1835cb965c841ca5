//! Analytics credential endpoints.
//!
//! The token is persisted first, then pushed into the live emitter, so a
//! failed save never leaves analytics enabled with an unsaved token.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Deserialize)]
pub struct CredentialRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct CredentialStatus {
    pub analytics_enabled: bool,
}

/// `PUT /api/credential`: save the token and enable analytics.
pub async fn store(
    State(ctx): State<ApiContext>,
    Json(req): Json<CredentialRequest>,
) -> Result<Json<CredentialStatus>, ApiError> {
    let credentials = ctx.credentials.clone();
    let token = tokio::task::spawn_blocking(move || credentials.save(&req.token))
        .await
        .map_err(|e| ApiError::Internal(format!("Task failed: {e}")))??;

    ctx.session.analytics().set_credential(Some(token));
    Ok(Json(CredentialStatus {
        analytics_enabled: ctx.session.analytics().enabled(),
    }))
}

/// `DELETE /api/credential`: forget the token and disable analytics.
pub async fn clear(State(ctx): State<ApiContext>) -> Result<Json<CredentialStatus>, ApiError> {
    let credentials = ctx.credentials.clone();
    tokio::task::spawn_blocking(move || credentials.clear())
        .await
        .map_err(|e| ApiError::Internal(format!("Task failed: {e}")))??;

    ctx.session.analytics().set_credential(None);
    Ok(Json(CredentialStatus {
        analytics_enabled: false,
    }))
}
