use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    NewProject, NewSession, OwnedUpdate, Project, ProjectDetails, SessionRecord, User,
};
use crate::database::repository::{ProjectStore, SessionStore, UserStore};
use crate::filter::{Filter, TableOrder, TableSort};

#[derive(Debug, Default)]
struct Tables {
    projects: HashMap<i64, Project>,
    users: HashMap<i64, User>,
    sessions: HashMap<String, SessionRecord>,
    next_project_id: i64,
    next_user_id: i64,
}

/// In-process store. Every operation holds the table lock for its whole duration,
/// so check-then-write sequences are atomic.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn compare(a: &Project, b: &Project, sort: TableSort) -> Ordering {
    let primary = match sort {
        TableSort::Name => a.name.cmp(&b.name),
        TableSort::Description => a.description.cmp(&b.description),
        TableSort::Type => a.project_type.cmp(&b.project_type),
        TableSort::Board => a.board.cmp(&b.board),
        TableSort::Created => a.created.cmp(&b.created),
        TableSort::Modified => a.modified.cmp(&b.modified),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn list_by_user(&self, id_user: i64, filter: &Filter) -> Result<Vec<Project>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Project> = tables
            .projects
            .values()
            .filter(|p| p.id_user == id_user)
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            let ord = compare(a, b, filter.sort);
            match filter.order {
                TableOrder::Asc => ord,
                TableOrder::Desc => ord.reverse(),
            }
        });

        Ok(rows
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn count_by_user(&self, id_user: i64) -> Result<i64, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.projects.values().filter(|p| p.id_user == id_user).count() as i64)
    }

    async fn get(&self, id: i64) -> Result<Option<Project>, DatabaseError> {
        Ok(self.tables.read().await.projects.get(&id).cloned())
    }

    async fn create(&self, project: NewProject) -> Result<Project, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&project.id_user) {
            return Err(DatabaseError::QueryError(format!(
                "project owner {} does not exist",
                project.id_user
            )));
        }

        tables.next_project_id += 1;
        let now = Utc::now();
        let row = Project {
            id: tables.next_project_id,
            id_user: project.id_user,
            name: project.name,
            description: project.description,
            description_html: project.description_html,
            code: project.code,
            project_type: project.project_type.as_str().to_string(),
            board: project.board,
            private: project.private,
            shared: project.shared,
            based_on: project.based_on,
            created: now,
            modified: now,
        };
        tables.projects.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_owned_code(&self, id: i64, owner: i64, code: &str) -> Result<OwnedUpdate, DatabaseError> {
        let mut tables = self.tables.write().await;
        let Some(project) = tables.projects.get_mut(&id) else {
            return Ok(OwnedUpdate::Missing);
        };
        if !project.is_owned_by(owner) {
            return Ok(OwnedUpdate::NotOwned(project.clone()));
        }
        project.code = Some(code.to_string());
        project.modified = Utc::now();
        Ok(OwnedUpdate::Updated(project.clone()))
    }

    async fn update_owned_details(
        &self,
        id: i64,
        owner: i64,
        details: &ProjectDetails,
    ) -> Result<OwnedUpdate, DatabaseError> {
        let mut tables = self.tables.write().await;
        let Some(project) = tables.projects.get_mut(&id) else {
            return Ok(OwnedUpdate::Missing);
        };
        if !project.is_owned_by(owner) {
            return Ok(OwnedUpdate::NotOwned(project.clone()));
        }
        project.name = details.name.clone();
        project.description = details.description.clone();
        project.description_html = details.description_html.clone();
        project.project_type = details.project_type.as_str().to_string();
        project.board = details.board.clone();
        project.private = details.private;
        project.shared = details.shared;
        project.modified = Utc::now();
        Ok(OwnedUpdate::Updated(project.clone()))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, id_cloud_user: i64, screenname: &str, locale: &str) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.id_cloud_user == id_cloud_user) {
            return Err(DatabaseError::QueryError(format!(
                "duplicate cloud user id {}",
                id_cloud_user
            )));
        }
        Ok(insert_user(&mut tables, id_cloud_user, screenname, locale))
    }

    async fn find_by_cloud_id(&self, id_cloud_user: i64) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.id_cloud_user == id_cloud_user).cloned())
    }

    async fn get_or_create(&self, id_cloud_user: i64, screenname: &str, locale: &str) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if let Some(user) = tables.users.values().find(|u| u.id_cloud_user == id_cloud_user) {
            return Ok(user.clone());
        }
        Ok(insert_user(&mut tables, id_cloud_user, screenname, locale))
    }

    async fn update_locale(&self, id_cloud_user: i64, locale: &str) -> Result<Option<User>, DatabaseError> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.values_mut().find(|u| u.id_cloud_user == id_cloud_user) else {
            return Ok(None);
        };
        user.locale = locale.to_string();
        user.modified = Utc::now();
        Ok(Some(user.clone()))
    }
}

fn insert_user(tables: &mut Tables, id_cloud_user: i64, screenname: &str, locale: &str) -> User {
    tables.next_user_id += 1;
    let now = Utc::now();
    let user = User {
        id: tables.next_user_id,
        id_cloud_user,
        screenname: screenname.to_string(),
        locale: locale.to_string(),
        created: now,
        modified: now,
    };
    tables.users.insert(user.id, user.clone());
    user
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create(&self, session: NewSession) -> Result<SessionRecord, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.sessions.contains_key(&session.idsession) {
            return Err(DatabaseError::QueryError(format!(
                "duplicate session id {}",
                session.idsession
            )));
        }
        let now = Utc::now();
        let row = SessionRecord {
            idsession: session.idsession,
            start_timestamp: now,
            last_access_time: now,
            timeout: session.timeout,
            host: session.host,
            attributes: session.attributes,
        };
        tables.sessions.insert(row.idsession.clone(), row.clone());
        Ok(row)
    }

    async fn get(&self, idsession: &str) -> Result<Option<SessionRecord>, DatabaseError> {
        Ok(self.tables.read().await.sessions.get(idsession).cloned())
    }

    async fn touch(&self, idsession: &str, at: DateTime<Utc>) -> Result<(), DatabaseError> {
        if let Some(session) = self.tables.write().await.sessions.get_mut(idsession) {
            session.last_access_time = at;
        }
        Ok(())
    }

    async fn update_attributes(&self, idsession: &str, attributes: &str) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let session = tables
            .sessions
            .get_mut(idsession)
            .ok_or_else(|| DatabaseError::NotFound(format!("session {}", idsession)))?;
        session.attributes = Some(attributes.to_string());
        Ok(())
    }

    async fn delete(&self, idsession: &str) -> Result<bool, DatabaseError> {
        Ok(self.tables.write().await.sessions.remove(idsession).is_some())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.sessions.len();
        tables.sessions.retain(|_, session| !session.is_expired(now));
        Ok((before - tables.sessions.len()) as u64)
    }
}
