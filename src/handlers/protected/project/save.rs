use axum::{extract::State, Extension, Form, Json};
use serde::Deserialize;
use tracing::{debug, info};

use crate::api::format::SavedView;
use crate::database::models::ProjectType;
use crate::error::ApiError;
use crate::middleware::CurrentSession;
use crate::services::SaveProject;
use crate::state::AppState;

use super::{current_user_id, parse_id, required};

#[derive(Debug, Deserialize)]
pub struct CodeForm {
    pub id: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CodeAsForm {
    pub id: Option<String>,
    pub code: Option<String>,
    pub name: Option<String>,
    pub board: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectForm {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "description-html")]
    pub description_html: Option<String>,
    pub sharing: Option<String>,
    #[serde(rename = "type")]
    pub project_type: Option<String>,
    pub board: Option<String>,
}

async fn require_user(state: &AppState, current: CurrentSession) -> Result<i64, ApiError> {
    current_user_id(state, current)
        .await
        .ok_or_else(|| ApiError::unauthorized("Not logged in"))
}

/// POST /project/code - store new code for an existing project
pub async fn project_code_post(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    Form(form): Form<CodeForm>,
) -> Result<Json<SavedView>, ApiError> {
    let id = parse_id(form.id.as_deref())?;
    info!("REST:/project/code/ POST request received for project '{}'", id);

    let id_user = require_user(&state, current).await?;
    let code = required(&form.code, "code")?;

    let saved = state.projects.save_project_code(id_user, id, code).await?;
    if saved.created {
        info!("Code for project {} was saved as new project {}", id, saved.project.id);
    } else {
        debug!("Code for project {} has been saved", id);
    }
    Ok(Json(SavedView::new(saved, id_user)))
}

/// POST /project/code-as - store code as a new project
pub async fn project_code_as_post(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    Form(form): Form<CodeAsForm>,
) -> Result<Json<SavedView>, ApiError> {
    let id = parse_id(form.id.as_deref())?;
    info!("REST:/project/code-as/ POST request received for project '{}'", id);

    let id_user = require_user(&state, current).await?;
    let name = required(&form.name, "name")?;
    let board = required(&form.board, "board")?;
    let code = required(&form.code, "code")?;

    info!("Saving project '{}', '{}' as a new project", id, name);
    let saved = state
        .projects
        .save_project_code_as(id_user, id, code, name, board)
        .await?;
    Ok(Json(SavedView::new(saved, id_user)))
}

/// POST /project/ - create a project or update its metadata
pub async fn project_post(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    Form(form): Form<ProjectForm>,
) -> Result<Json<SavedView>, ApiError> {
    let id = match form.id.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => Some(parse_id(Some(raw))?),
        None => None,
    };
    info!("REST:/project/ POST request received for project '{:?}'", id);

    let id_user = require_user(&state, current).await?;
    let project_type: ProjectType = required(&form.project_type, "type")?
        .parse()
        .map_err(ApiError::not_acceptable)?;
    let (private, shared) = sharing_flags(form.sharing.as_deref());

    let project = SaveProject {
        id,
        name: required(&form.name, "name")?.to_string(),
        description: form.description,
        description_html: form.description_html,
        private,
        shared,
        project_type,
        board: required(&form.board, "board")?.to_string(),
    };

    let saved = state.projects.save_project(id_user, &project).await?;
    debug!("Project {} has been saved", saved.project.id);
    Ok(Json(SavedView::new(saved, id_user)))
}

/// `private` and `shared` flags from the `sharing` form value. Anything else sets neither.
fn sharing_flags(sharing: Option<&str>) -> (bool, bool) {
    match sharing {
        Some(s) if s.eq_ignore_ascii_case("private") => (true, false),
        Some(s) if s.eq_ignore_ascii_case("shared") => (false, true),
        _ => (false, false),
    }
}
