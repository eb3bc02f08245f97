// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::cloudsession::CloudSessionError;
use crate::database::DatabaseError;
use crate::filter::FilterError;
use crate::services::{ProjectError, SecurityError};

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 406 Not Acceptable (malformed list or form parameters)
    NotAcceptable(String),

    // 409 Conflict
    Conflict(String),

    // 429 Too Many Requests
    TooManyRequests(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (cloud session service issues)
    BadGateway(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::NotAcceptable(_) => 406,
            ApiError::Conflict(_) => 409,
            ApiError::TooManyRequests(_) => 429,
            ApiError::InternalServerError(_) => 500,
            ApiError::BadGateway(_) => 502,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::NotAcceptable(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::TooManyRequests(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::BadGateway(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::ValidationError { message, field_errors } => {
                let mut response = json!({
                    "error": true,
                    "message": message,
                    "code": "VALIDATION_ERROR"
                });

                if let Some(field_errors) = field_errors {
                    response["field_errors"] = json!(field_errors);
                }

                response
            }
            _ => {
                json!({
                    "error": true,
                    "message": self.message(),
                    "code": self.error_code()
                })
            }
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::NotAcceptable(_) => "NOT_ACCEPTABLE",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::TooManyRequests(_) => "TOO_MANY_REQUESTS",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(message: impl Into<String>, field_errors: Option<HashMap<String, String>>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn not_acceptable(message: impl Into<String>) -> Self {
        ApiError::NotAcceptable(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        ApiError::TooManyRequests(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::ConfigMissing(_) | DatabaseError::InvalidDatabaseUrl => {
                tracing::error!("Database misconfigured: {}", err);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::QueryError(msg) => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Database query error: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            DatabaseError::Sqlx(sqlx_err) => {
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
            DatabaseError::MigrationError(e) => {
                tracing::error!("Migration error: {}", e);
                ApiError::service_unavailable("Service is being updated, please try again later")
            }
        }
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        tracing::warn!("List parameter rejected: {}", err);
        ApiError::not_acceptable(err.to_string())
    }
}

impl From<ProjectError> for ApiError {
    fn from(err: ProjectError) -> Self {
        match err {
            ProjectError::Unauthorized => ApiError::unauthorized("Not authorized"),
            ProjectError::NotFound(id) => ApiError::not_found(format!("Project {} not found", id)),
            ProjectError::Database(e) => e.into(),
        }
    }
}

impl From<CloudSessionError> for ApiError {
    fn from(err: CloudSessionError) -> Self {
        match err {
            CloudSessionError::UnknownUser(_) | CloudSessionError::UnknownUserId(_) => {
                ApiError::unauthorized("Unknown user or invalid credentials")
            }
            CloudSessionError::WrongAuthenticationSource => ApiError::unauthorized(err.to_string()),
            CloudSessionError::UserBlocked | CloudSessionError::EmailNotConfirmed => ApiError::forbidden(err.to_string()),
            CloudSessionError::InsufficientBucketTokens => ApiError::too_many_requests(err.to_string()),
            CloudSessionError::NonUniqueEmail | CloudSessionError::ScreennameUsed => ApiError::conflict(err.to_string()),
            CloudSessionError::PasswordVerify | CloudSessionError::PasswordComplexity => {
                ApiError::bad_request(err.to_string())
            }
            CloudSessionError::Server(msg) => {
                tracing::error!("Cloud session server error: {}", msg);
                ApiError::bad_gateway("Cloud session service unavailable")
            }
            CloudSessionError::Config(msg) => {
                tracing::error!("Cloud session misconfigured: {}", msg);
                ApiError::internal_server_error("Cloud session service is not configured")
            }
        }
    }
}

impl From<SecurityError> for ApiError {
    fn from(err: SecurityError) -> Self {
        match err {
            SecurityError::Validation(code) | SecurityError::Precondition(code) => {
                ApiError::validation_error(code, None)
            }
            SecurityError::Cloud(e) => e.into(),
            SecurityError::Database(e) => e.into(),
            SecurityError::Token(e) => ApiError::unauthorized(e.to_string()),
            SecurityError::InvalidSession => ApiError::unauthorized(err.to_string()),
            SecurityError::RemoteUnavailable => ApiError::bad_gateway(err.to_string()),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloud_session_failures_map_to_statuses() {
        let status = |e: CloudSessionError| ApiError::from(e).status_code();
        assert_eq!(status(CloudSessionError::UnknownUser("a@b.org".into())), 401);
        assert_eq!(status(CloudSessionError::WrongAuthenticationSource), 401);
        assert_eq!(status(CloudSessionError::UserBlocked), 403);
        assert_eq!(status(CloudSessionError::EmailNotConfirmed), 403);
        assert_eq!(status(CloudSessionError::InsufficientBucketTokens), 429);
        assert_eq!(status(CloudSessionError::NonUniqueEmail), 409);
        assert_eq!(status(CloudSessionError::PasswordComplexity), 400);
        assert_eq!(status(CloudSessionError::Server("down".into())), 502);
    }

    #[test]
    fn filter_errors_are_not_acceptable() {
        let err = ApiError::from(FilterError::InvalidSort("password".into()));
        assert_eq!(err.status_code(), 406);
        assert_eq!(err.to_json()["code"], "NOT_ACCEPTABLE");
    }

    #[test]
    fn registration_rejections_carry_their_reason() {
        let err = ApiError::from(SecurityError::Precondition("sponsor-email-required"));
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_json()["message"], "sponsor-email-required");
    }
}
