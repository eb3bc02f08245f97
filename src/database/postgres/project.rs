use async_trait::async_trait;

use super::PgStore;
use crate::database::manager::DatabaseError;
use crate::database::models::{NewProject, OwnedUpdate, Project, ProjectDetails};
use crate::database::repository::ProjectStore;
use crate::filter::Filter;

const PROJECT_COLUMNS: &str = "id, id_user, name, description, description_html, code, \"type\", board, \
                               private, shared, based_on, created, modified";

impl PgStore {
    /// Lock `id` for the rest of the transaction.
    async fn lock_project(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: i64,
    ) -> Result<Option<Project>, DatabaseError> {
        let sql = format!("SELECT {} FROM project WHERE id = $1 FOR UPDATE", PROJECT_COLUMNS);
        let row = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn list_by_user(&self, id_user: i64, filter: &Filter) -> Result<Vec<Project>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM project WHERE id_user = $1 {} LIMIT $2 OFFSET $3",
            PROJECT_COLUMNS,
            filter.order_clause()
        );
        let rows = sqlx::query_as::<_, Project>(&sql)
            .bind(id_user)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count_by_user(&self, id_user: i64) -> Result<i64, DatabaseError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM project WHERE id_user = $1")
            .bind(id_user)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    async fn get(&self, id: i64) -> Result<Option<Project>, DatabaseError> {
        let sql = format!("SELECT {} FROM project WHERE id = $1", PROJECT_COLUMNS);
        let row = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create(&self, project: NewProject) -> Result<Project, DatabaseError> {
        let sql = format!(
            "INSERT INTO project \
                (id_user, name, description, description_html, code, \"type\", board, private, shared, based_on) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {}",
            PROJECT_COLUMNS
        );
        let row = sqlx::query_as::<_, Project>(&sql)
            .bind(project.id_user)
            .bind(&project.name)
            .bind(&project.description)
            .bind(&project.description_html)
            .bind(&project.code)
            .bind(project.project_type.as_str())
            .bind(&project.board)
            .bind(project.private)
            .bind(project.shared)
            .bind(project.based_on)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_owned_code(&self, id: i64, owner: i64, code: &str) -> Result<OwnedUpdate, DatabaseError> {
        // Rolled back on drop for every early return.
        let mut tx = self.pool.begin().await?;

        let current = match Self::lock_project(&mut tx, id).await? {
            Some(project) => project,
            None => return Ok(OwnedUpdate::Missing),
        };
        if !current.is_owned_by(owner) {
            return Ok(OwnedUpdate::NotOwned(current));
        }

        let sql = format!(
            "UPDATE project SET code = $2, modified = now() WHERE id = $1 RETURNING {}",
            PROJECT_COLUMNS
        );
        let updated = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .bind(code)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(OwnedUpdate::Updated(updated))
    }

    async fn update_owned_details(
        &self,
        id: i64,
        owner: i64,
        details: &ProjectDetails,
    ) -> Result<OwnedUpdate, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let current = match Self::lock_project(&mut tx, id).await? {
            Some(project) => project,
            None => return Ok(OwnedUpdate::Missing),
        };
        if !current.is_owned_by(owner) {
            return Ok(OwnedUpdate::NotOwned(current));
        }

        let sql = format!(
            "UPDATE project SET name = $2, description = $3, description_html = $4, \"type\" = $5, \
                board = $6, private = $7, shared = $8, modified = now() \
             WHERE id = $1 RETURNING {}",
            PROJECT_COLUMNS
        );
        let updated = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .bind(&details.name)
            .bind(&details.description)
            .bind(&details.description_html)
            .bind(details.project_type.as_str())
            .bind(&details.board)
            .bind(details.private)
            .bind(details.shared)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(OwnedUpdate::Updated(updated))
    }
}
