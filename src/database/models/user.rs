use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Local mirror of a cloud session account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub id_cloud_user: i64,
    pub screenname: String,
    pub locale: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}
