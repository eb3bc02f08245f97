use async_trait::async_trait;

use super::PgStore;
use crate::database::manager::DatabaseError;
use crate::database::models::User;
use crate::database::repository::UserStore;

const USER_COLUMNS: &str = "id, id_cloud_user, screenname, locale, created, modified";

#[async_trait]
impl UserStore for PgStore {
    async fn create(&self, id_cloud_user: i64, screenname: &str, locale: &str) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO \"user\" (id_cloud_user, screenname, locale) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(id_cloud_user)
            .bind(screenname)
            .bind(locale)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_cloud_id(&self, id_cloud_user: i64) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM \"user\" WHERE id_cloud_user = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(id_cloud_user)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_or_create(&self, id_cloud_user: i64, screenname: &str, locale: &str) -> Result<User, DatabaseError> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let sql = format!(
            "INSERT INTO \"user\" (id_cloud_user, screenname, locale) VALUES ($1, $2, $3) \
             ON CONFLICT (id_cloud_user) DO UPDATE SET id_cloud_user = EXCLUDED.id_cloud_user \
             RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(id_cloud_user)
            .bind(screenname)
            .bind(locale)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_locale(&self, id_cloud_user: i64, locale: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!(
            "UPDATE \"user\" SET locale = $2, modified = now() WHERE id_cloud_user = $1 RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(id_cloud_user)
            .bind(locale)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
