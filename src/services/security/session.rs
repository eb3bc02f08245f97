use serde::{Deserialize, Serialize};

use crate::cloudsession::CloudUser;

/// Per-session state carried between requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    /// Local user id, resolved lazily on the first authenticated request.
    #[serde(default)]
    pub id_user: Option<i64>,
    /// Cached cloud session account.
    #[serde(default)]
    pub user: Option<CloudUser>,
    /// Locale chosen in the browser for this session.
    #[serde(default)]
    pub locale: Option<String>,
}

/// What the `attributes` column of a session row holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionAttributes {
    pub principal: String,
    #[serde(default)]
    pub data: SessionData,
}

/// A loaded, validated session for the request in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub id: String,
    pub principal: String,
    pub data: SessionData,
}

impl AuthSession {
    pub fn is_authenticated(&self) -> bool {
        !self.principal.is_empty()
    }

    pub fn attributes(&self) -> SessionAttributes {
        SessionAttributes {
            principal: self.principal.clone(),
            data: self.data.clone(),
        }
    }
}

/// A freshly opened session, the bearer token that names it and the account it was opened for.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_in: i64,
    pub session: AuthSession,
    pub user: CloudUser,
}
