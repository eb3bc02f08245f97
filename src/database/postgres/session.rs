use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::PgStore;
use crate::database::manager::DatabaseError;
use crate::database::models::{NewSession, SessionRecord};
use crate::database::repository::SessionStore;

const SESSION_COLUMNS: &str = "idsession, \"startTimestamp\", \"lastAccessTime\", timeout, host, attributes";

#[async_trait]
impl SessionStore for PgStore {
    async fn create(&self, session: NewSession) -> Result<SessionRecord, DatabaseError> {
        let sql = format!(
            "INSERT INTO session (idsession, timeout, host, attributes) VALUES ($1, $2, $3, $4) RETURNING {}",
            SESSION_COLUMNS
        );
        let row = sqlx::query_as::<_, SessionRecord>(&sql)
            .bind(&session.idsession)
            .bind(session.timeout)
            .bind(&session.host)
            .bind(&session.attributes)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get(&self, idsession: &str) -> Result<Option<SessionRecord>, DatabaseError> {
        let sql = format!("SELECT {} FROM session WHERE idsession = $1", SESSION_COLUMNS);
        let row = sqlx::query_as::<_, SessionRecord>(&sql)
            .bind(idsession)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn touch(&self, idsession: &str, at: DateTime<Utc>) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE session SET \"lastAccessTime\" = $2 WHERE idsession = $1")
            .bind(idsession)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_attributes(&self, idsession: &str, attributes: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE session SET attributes = $2 WHERE idsession = $1")
            .bind(idsession)
            .bind(attributes)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("session {}", idsession)));
        }
        Ok(())
    }

    async fn delete(&self, idsession: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM session WHERE idsession = $1")
            .bind(idsession)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "DELETE FROM session \
             WHERE timeout IS NOT NULL \
               AND \"lastAccessTime\" + timeout * INTERVAL '1 millisecond' <= $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
