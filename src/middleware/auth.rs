use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::error::ApiError;
use crate::services::security::AuthSession;
use crate::state::AppState;

/// Session attached to the request by [`session_middleware`]. `None` for anonymous callers.
#[derive(Clone, Debug, Default)]
pub struct CurrentSession(pub Option<AuthSession>);

impl CurrentSession {
    /// The session, or 401 for anonymous callers.
    pub fn require(self) -> Result<AuthSession, ApiError> {
        self.0.ok_or_else(|| ApiError::unauthorized("Not logged in"))
    }
}

/// Resolve the bearer token, if any, to a live session.
///
/// Missing or rejected tokens leave the request anonymous; each handler decides how
/// to answer that. Only a failing session store aborts the request.
pub async fn session_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    let session = match extract_jwt_from_headers(&headers) {
        Ok(token) => match state.security.load_session(&token).await {
            Ok(session) => session,
            Err(e) => return ApiError::from(e).into_response(),
        },
        Err(msg) => {
            debug!("Anonymous request: {}", msg);
            None
        }
    };

    request.extensions_mut().insert(CurrentSession(session));
    next.run(request).await
}

/// Extract JWT token from Authorization header
pub fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

/// Client address as reported by the fronting proxy.
pub fn client_host(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
