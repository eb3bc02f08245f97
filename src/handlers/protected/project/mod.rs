// handlers/protected/project/mod.rs - Project persistence endpoints
//
// All routes sit behind the session middleware. Anonymous callers get 403 on the
// list endpoint and 401 everywhere else.

pub mod get;
pub mod list;
pub mod save;

pub use get::project_get;
pub use list::project_list;
pub use save::{project_code_as_post, project_code_post, project_post};

use crate::middleware::CurrentSession;
use crate::state::AppState;

/// Local user id of the caller, resolving it on first use.
pub(crate) async fn current_user_id(state: &AppState, current: CurrentSession) -> Option<i64> {
    let mut session = current.0?;
    state.security.get_session_data(&mut session).await.id_user
}

/// Parse a mandatory numeric form field.
pub(crate) fn parse_id(value: Option<&str>) -> Result<i64, crate::error::ApiError> {
    let raw = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| crate::error::ApiError::not_acceptable("Project id is required"))?;
    raw.parse()
        .map_err(|_| crate::error::ApiError::not_acceptable(format!("Invalid project id '{}'", raw)))
}

/// A mandatory text form field, rejected with 406 when absent or blank.
pub(crate) fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, crate::error::ApiError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| crate::error::ApiError::not_acceptable(format!("Missing '{}' parameter", field)))
}
