use axum::{extract::State, Extension};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::middleware::{ApiResponse, ApiResult, CurrentSession};
use crate::services::security::SessionData;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: String,
    pub principal: String,
    #[serde(flatten)]
    pub data: SessionData,
}

/// GET /auth/session - the caller's session with its user resolved
pub async fn session_get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> ApiResult<SessionView> {
    let mut session = current.require()?;
    let data = state.security.get_session_data(&mut session).await;

    Ok(ApiResponse::success(SessionView {
        id: session.id,
        principal: session.principal,
        data,
    }))
}

/// POST /auth/logout - end the caller's session
pub async fn session_logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> ApiResult<Value> {
    let session = current.require()?;
    let removed = state.security.close_session(&session.id).await?;
    info!("User {} logged out", session.principal);

    Ok(ApiResponse::success(json!({ "logged_out": removed })))
}
