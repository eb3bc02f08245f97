use axum::{
    extract::{Query, State},
    Extension, Json,
};
use tracing::info;

use crate::api::format::ProjectList;
use crate::error::ApiError;
use crate::filter::{Filter, ListQuery};
use crate::middleware::CurrentSession;
use crate::state::AppState;

use super::current_user_id;

/// GET /project/list - page through the caller's own projects
pub async fn project_list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ProjectList>, ApiError> {
    info!("REST:/project/list/ Get request received");

    let id_user = current_user_id(&state, current)
        .await
        .ok_or_else(|| ApiError::forbidden("Not logged in"))?;

    let filter = Filter::from_query(&query, state.config.api.request_limit)?;
    if query.requested_limit()?.is_some_and(|limit| limit != filter.limit) {
        info!("Limit throttle to {} entries", filter.limit);
    }

    let rows = state.projects.get_user_projects(id_user, &filter).await?;
    let total = state.projects.count_user_projects(id_user).await?;

    Ok(Json(ProjectList::new(&rows, total)))
}
