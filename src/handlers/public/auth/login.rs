// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{extract::State, http::HeaderMap, Form};
use serde::Deserialize;

use super::TokenResponse;
use crate::error::ApiError;
use crate::middleware::{client_host, ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
    /// Browser locale; pushed to the cloud account on first use of the session.
    pub locale: Option<String>,
}

/// POST /auth/login - authenticate with the cloud session service and open a session
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "data": {
///     "token": "eyJhbGciOiJIUzI1NiI...",
///     "expires_in": 604800,
///     "user": { "id": 17, "email": "ada@example.org", "screenname": "ada", "locale": "en" }
///   }
/// }
/// ```
pub async fn login_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> ApiResult<TokenResponse> {
    let email = form
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::bad_request("email is required"))?;
    let password = form
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("password is required"))?;

    let user = state.security.authenticate_local_user(email, password).await?;
    let issued = state
        .security
        .open_session(&user, client_host(&headers), form.locale)
        .await?;

    Ok(ApiResponse::success(TokenResponse::new(issued)))
}
