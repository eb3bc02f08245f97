// handlers/public/auth/mod.rs - Account and token endpoints
//
// Credentials are checked by the cloud session service; these handlers only open
// and rotate the local sessions that the issued tokens name.

pub mod login;
pub mod refresh;
pub mod register;

pub use login::login_post;
pub use refresh::refresh_post;
pub use register::register_post;

use serde::Serialize;

use crate::cloudsession::CloudUser;
use crate::services::security::IssuedSession;

/// Token payload shared by login and refresh.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: CloudUser,
}

impl TokenResponse {
    pub(crate) fn new(issued: IssuedSession) -> Self {
        Self {
            token: issued.token,
            expires_in: issued.expires_in,
            user: issued.user,
        }
    }
}
