// handlers/public/auth/register.rs - POST /auth/register handler

use axum::{extract::State, Form};
use serde_json::{json, Value};
use tracing::warn;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::security::Registration;
use crate::state::AppState;

/// POST /auth/register - create a cloud account and its local user
///
/// Responds 201 with `{"success": true, "data": {"id": <cloud user id>}}`. Local
/// validation failures are 400 with the failing rule as the message.
pub async fn register_post(State(state): State<AppState>, Form(registration): Form<Registration>) -> ApiResult<Value> {
    let id = state.security.register(&registration).await?;
    if id == 0 {
        warn!("Registration was not completed by the cloud session service");
        return Err(ApiError::bad_gateway("Cloud session service unavailable"));
    }

    Ok(ApiResponse::created(json!({ "id": id })))
}
