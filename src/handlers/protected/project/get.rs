use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tracing::info;

use crate::api::format::ProjectView;
use crate::error::ApiError;
use crate::middleware::CurrentSession;
use crate::state::AppState;

use super::{current_user_id, parse_id};

/// GET /project/get/:id - a single project, owner only
pub async fn project_get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    Path(raw_id): Path<String>,
) -> Result<Json<ProjectView>, ApiError> {
    let id = parse_id(Some(raw_id.as_str()))?;
    info!("REST:/project/get/ Get request received for project '{}'", id);

    let Some(project) = state.projects.get_project(id).await? else {
        info!("Project {} was not found", id);
        return Err(ApiError::not_found(format!("Project {} not found", id)));
    };

    let id_user = current_user_id(&state, current).await;
    match id_user {
        Some(id_user) if project.is_owned_by(id_user) => Ok(Json(ProjectView::new(project, id_user))),
        _ => {
            info!("User not authorized to get project {}", id);
            Err(ApiError::unauthorized("Not authorized"))
        }
    }
}
