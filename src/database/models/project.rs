use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Language family a project's blocks compile to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProjectType {
    Spin,
    Propc,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Spin => "SPIN",
            ProjectType::Propc => "PROPC",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SPIN" => Ok(ProjectType::Spin),
            "PROPC" => Ok(ProjectType::Propc),
            other => Err(format!("unknown project type '{}'", other)),
        }
    }
}

/// A row of the `project` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: i64,
    pub id_user: i64,
    pub name: String,
    pub description: Option<String>,
    pub description_html: Option<String>,
    pub code: Option<String>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub project_type: String,
    pub board: String,
    pub private: bool,
    pub shared: bool,
    pub based_on: Option<i64>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Project {
    pub fn is_owned_by(&self, id_user: i64) -> bool {
        self.id_user == id_user
    }

    /// Owners can always read a project; everyone else only when it is shared.
    pub fn is_readable_by(&self, id_user: i64) -> bool {
        self.is_owned_by(id_user) || self.shared
    }
}

/// Values for a project insert.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub id_user: i64,
    pub name: String,
    pub description: Option<String>,
    pub description_html: Option<String>,
    pub code: Option<String>,
    pub project_type: ProjectType,
    pub board: String,
    pub private: bool,
    pub shared: bool,
    pub based_on: Option<i64>,
}

/// Metadata columns that `POST /project/` may change.
#[derive(Debug, Clone)]
pub struct ProjectDetails {
    pub name: String,
    pub description: Option<String>,
    pub description_html: Option<String>,
    pub project_type: ProjectType,
    pub board: String,
    pub private: bool,
    pub shared: bool,
}

/// Outcome of an ownership-checked update.
#[derive(Debug, Clone)]
pub enum OwnedUpdate {
    Updated(Project),
    NotOwned(Project),
    Missing,
}
