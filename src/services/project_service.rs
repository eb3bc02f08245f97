use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::database::models::{NewProject, OwnedUpdate, Project, ProjectDetails, ProjectType};
use crate::database::{DatabaseError, ProjectStore};
use crate::filter::Filter;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not authorized to modify project")]
    Unauthorized,
    #[error("Project {0} not found")]
    NotFound(i64),
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Result of a save. `created` is set whenever the save produced a new row.
#[derive(Debug, Clone)]
pub struct Saved {
    pub project: Project,
    pub created: bool,
}

impl Saved {
    fn updated(project: Project) -> Self {
        Self { project, created: false }
    }

    fn created(project: Project) -> Self {
        Self { project, created: true }
    }
}

/// Metadata submitted to `POST /project/`.
#[derive(Debug, Clone)]
pub struct SaveProject {
    pub id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub description_html: Option<String>,
    pub private: bool,
    pub shared: bool,
    pub project_type: ProjectType,
    pub board: String,
}

impl SaveProject {
    fn details(&self) -> ProjectDetails {
        ProjectDetails {
            name: self.name.clone(),
            description: self.description.clone(),
            description_html: self.description_html.clone(),
            project_type: self.project_type,
            board: self.board.clone(),
            private: self.private,
            shared: self.shared,
        }
    }
}

#[derive(Clone)]
pub struct ProjectService {
    store: Arc<dyn ProjectStore>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn ProjectStore>) -> Self {
        Self { store }
    }

    pub async fn get_user_projects(&self, id_user: i64, filter: &Filter) -> Result<Vec<Project>, ProjectError> {
        debug!(
            "Listing projects for user {} ({} {}, limit {}, offset {})",
            id_user,
            filter.sort.as_str(),
            filter.order.to_sql(),
            filter.limit,
            filter.offset
        );
        Ok(self.store.list_by_user(id_user, filter).await?)
    }

    pub async fn count_user_projects(&self, id_user: i64) -> Result<i64, ProjectError> {
        Ok(self.store.count_by_user(id_user).await?)
    }

    pub async fn get_project(&self, id: i64) -> Result<Option<Project>, ProjectError> {
        Ok(self.store.get(id).await?)
    }

    /// Store new code for a project.
    ///
    /// The owner's project is updated in place. A project shared by someone else is
    /// forked into a new project for `id_user`.
    pub async fn save_project_code(&self, id_user: i64, id: i64, code: &str) -> Result<Saved, ProjectError> {
        match self.store.update_owned_code(id, id_user, code).await? {
            OwnedUpdate::Updated(project) => {
                debug!("Updated code for project {}", id);
                Ok(Saved::updated(project))
            }
            OwnedUpdate::NotOwned(source) if source.shared => {
                let copy = self
                    .store
                    .create(NewProject {
                        id_user,
                        name: source.name.clone(),
                        description: source.description.clone(),
                        description_html: source.description_html.clone(),
                        code: Some(code.to_string()),
                        project_type: source_type(&source),
                        board: source.board.clone(),
                        private: true,
                        shared: false,
                        based_on: Some(source.id),
                    })
                    .await?;
                info!("Saved code of shared project {} as new project {} for user {}", id, copy.id, id_user);
                Ok(Saved::created(copy))
            }
            OwnedUpdate::NotOwned(_) => {
                warn!("User {} may not save code to project {}", id_user, id);
                Err(ProjectError::Unauthorized)
            }
            OwnedUpdate::Missing => Err(ProjectError::NotFound(id)),
        }
    }

    /// Store code as a new project derived from `id`, which the caller must be able to read.
    pub async fn save_project_code_as(
        &self,
        id_user: i64,
        id: i64,
        code: &str,
        name: &str,
        board: &str,
    ) -> Result<Saved, ProjectError> {
        let source = self.store.get(id).await?.ok_or(ProjectError::NotFound(id))?;
        if !source.is_readable_by(id_user) {
            warn!("User {} may not copy project {}", id_user, id);
            return Err(ProjectError::Unauthorized);
        }

        let copy = self
            .store
            .create(NewProject {
                id_user,
                name: name.to_string(),
                description: source.description.clone(),
                description_html: source.description_html.clone(),
                code: Some(code.to_string()),
                project_type: source_type(&source),
                board: board.to_string(),
                private: source.private,
                shared: source.shared,
                based_on: Some(source.id),
            })
            .await?;
        info!("Saved project {} as new project {} for user {}", id, copy.id, id_user);
        Ok(Saved::created(copy))
    }

    /// Create or update project metadata.
    ///
    /// Without an id, or with an id that does not exist, a new project is created.
    pub async fn save_project(&self, id_user: i64, project: &SaveProject) -> Result<Saved, ProjectError> {
        if let Some(id) = project.id {
            match self.store.update_owned_details(id, id_user, &project.details()).await? {
                OwnedUpdate::Updated(updated) => return Ok(Saved::updated(updated)),
                OwnedUpdate::NotOwned(_) => {
                    warn!("User {} may not update project {}", id_user, id);
                    return Err(ProjectError::Unauthorized);
                }
                OwnedUpdate::Missing => {
                    info!("Project {} does not exist, creating a new project", id);
                }
            }
        }

        let created = self
            .store
            .create(NewProject {
                id_user,
                name: project.name.clone(),
                description: project.description.clone(),
                description_html: project.description_html.clone(),
                code: None,
                project_type: project.project_type,
                board: project.board.clone(),
                private: project.private,
                shared: project.shared,
                based_on: None,
            })
            .await?;
        info!("Created project {} for user {}", created.id, id_user);
        Ok(Saved::created(created))
    }
}

// Stored rows are constrained to known types; fall back for rows written elsewhere.
fn source_type(project: &Project) -> ProjectType {
    project.project_type.parse().unwrap_or(ProjectType::Propc)
}
