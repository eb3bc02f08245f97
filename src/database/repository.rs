//! Storage seams used by the services.
//!
//! `PgStore` implements these against Postgres; `MemoryStore` keeps everything in
//! process for the `memory` backend and for tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::manager::DatabaseError;
use crate::database::models::{
    NewProject, NewSession, OwnedUpdate, Project, ProjectDetails, SessionRecord, User,
};
use crate::filter::Filter;

#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// One page of a user's projects, ordered by the filter.
    async fn list_by_user(&self, id_user: i64, filter: &Filter) -> Result<Vec<Project>, DatabaseError>;

    async fn count_by_user(&self, id_user: i64) -> Result<i64, DatabaseError>;

    async fn get(&self, id: i64) -> Result<Option<Project>, DatabaseError>;

    async fn create(&self, project: NewProject) -> Result<Project, DatabaseError>;

    /// Replace the code of `id` if, and only if, `owner` owns it.
    async fn update_owned_code(&self, id: i64, owner: i64, code: &str) -> Result<OwnedUpdate, DatabaseError>;

    /// Replace the metadata of `id` if, and only if, `owner` owns it.
    async fn update_owned_details(
        &self,
        id: i64,
        owner: i64,
        details: &ProjectDetails,
    ) -> Result<OwnedUpdate, DatabaseError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, id_cloud_user: i64, screenname: &str, locale: &str) -> Result<User, DatabaseError>;

    async fn find_by_cloud_id(&self, id_cloud_user: i64) -> Result<Option<User>, DatabaseError>;

    /// Local user for a cloud account, inserted on first sight.
    async fn get_or_create(&self, id_cloud_user: i64, screenname: &str, locale: &str) -> Result<User, DatabaseError>;

    /// Record a locale change made on the cloud account. `None` if no local user exists.
    async fn update_locale(&self, id_cloud_user: i64, locale: &str) -> Result<Option<User>, DatabaseError>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, session: NewSession) -> Result<SessionRecord, DatabaseError>;

    async fn get(&self, idsession: &str) -> Result<Option<SessionRecord>, DatabaseError>;

    async fn touch(&self, idsession: &str, at: DateTime<Utc>) -> Result<(), DatabaseError>;

    async fn update_attributes(&self, idsession: &str, attributes: &str) -> Result<(), DatabaseError>;

    async fn delete(&self, idsession: &str) -> Result<bool, DatabaseError>;

    /// Remove every session idle past its timeout. Returns the number removed.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DatabaseError>;
}
