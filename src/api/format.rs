//! JSON shapes returned by the project endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::database::models::Project;
use crate::services::Saved;

/// Row of `GET /project/list`.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectListItem {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub project_type: String,
    pub board: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl From<&Project> for ProjectListItem {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id,
            name: project.name.clone(),
            description: project.description.clone(),
            project_type: project.project_type.clone(),
            board: project.board.clone(),
            created: project.created,
            modified: project.modified,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectList {
    pub rows: Vec<ProjectListItem>,
    pub total: i64,
}

impl ProjectList {
    pub fn new(projects: &[Project], total: i64) -> Self {
        Self {
            rows: projects.iter().map(ProjectListItem::from).collect(),
            total,
        }
    }
}

/// Full project as seen by `viewer`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectView {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub description_html: Option<String>,
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub project_type: String,
    pub board: String,
    pub private: bool,
    pub shared: bool,
    pub based_on: Option<i64>,
    pub yours: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl ProjectView {
    pub fn new(project: Project, viewer: i64) -> Self {
        Self {
            yours: project.is_owned_by(viewer),
            id: project.id,
            name: project.name,
            description: project.description,
            description_html: project.description_html,
            code: project.code,
            project_type: project.project_type,
            board: project.board,
            private: project.private,
            shared: project.shared,
            based_on: project.based_on,
            created: project.created,
            modified: project.modified,
        }
    }
}

/// Response of the save endpoints. `new-project` tells the caller a row was created.
#[derive(Debug, Clone, Serialize)]
pub struct SavedView {
    #[serde(flatten)]
    pub project: ProjectView,
    pub success: bool,
    #[serde(rename = "new-project")]
    pub new_project: bool,
}

impl SavedView {
    pub fn new(saved: Saved, viewer: i64) -> Self {
        Self {
            project: ProjectView::new(saved.project, viewer),
            success: true,
            new_project: saved.created,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> Project {
        let now = Utc::now();
        Project {
            id: 7,
            id_user: 1,
            name: "blink".into(),
            description: Some("led".into()),
            description_html: Some("<p>led</p>".into()),
            code: Some("<xml/>".into()),
            project_type: "PROPC".into(),
            board: "activity-board".into(),
            private: true,
            shared: false,
            based_on: None,
            created: now,
            modified: now,
        }
    }

    #[test]
    fn saved_view_flattens_project_fields() {
        let value = serde_json::to_value(SavedView::new(Saved { project: project(), created: true }, 1)).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["type"], "PROPC");
        assert_eq!(value["description-html"], "<p>led</p>");
        assert_eq!(value["yours"], true);
        assert_eq!(value["success"], true);
        assert_eq!(value["new-project"], true);
    }

    #[test]
    fn list_items_omit_code() {
        let value = serde_json::to_value(ProjectList::new(&[project()], 12)).unwrap();
        assert_eq!(value["total"], 12);
        assert!(value["rows"][0].get("code").is_none());
        assert_eq!(value["rows"][0]["board"], "activity-board");
    }
}
