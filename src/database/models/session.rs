use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the `session` table.
///
/// `timeout` is the idle timeout in milliseconds; `None` means the session never
/// expires on its own. `attributes` holds the serialized session payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SessionRecord {
    pub idsession: String,
    #[sqlx(rename = "startTimestamp")]
    pub start_timestamp: DateTime<Utc>,
    #[sqlx(rename = "lastAccessTime")]
    pub last_access_time: DateTime<Utc>,
    pub timeout: Option<i64>,
    pub host: Option<String>,
    pub attributes: Option<String>,
}

impl SessionRecord {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.timeout
            .map(|ms| self.last_access_time + Duration::milliseconds(ms))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map_or(false, |at| at <= now)
    }
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub idsession: String,
    pub timeout: Option<i64>,
    pub host: Option<String>,
    pub attributes: Option<String>,
}
