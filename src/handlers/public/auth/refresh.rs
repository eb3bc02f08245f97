// handlers/public/auth/refresh.rs - POST /auth/refresh handler

use axum::{extract::State, http::HeaderMap};
use tracing::{debug, info};

use super::TokenResponse;
use crate::error::ApiError;
use crate::middleware::auth::extract_jwt_from_headers;
use crate::middleware::{client_host, ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /auth/refresh - trade a live session's token (within the refresh grace after `exp`) for a new session
///
/// The account is looked up again by its cloud id, so blocked or deleted accounts
/// cannot keep renewing.
pub async fn refresh_post(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<TokenResponse> {
    let token = extract_jwt_from_headers(&headers).map_err(|msg| {
        debug!("Refresh rejected: {}", msg);
        ApiError::unauthorized(msg)
    })?;

    let issued = state.security.renew_session(&token, client_host(&headers)).await?;
    info!("Renewed session {} for {}", issued.session.id, issued.session.principal);

    Ok(ApiResponse::success(TokenResponse::new(issued)))
}
