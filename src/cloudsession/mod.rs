//! Client side of the remote cloud session (identity) service.
//!
//! Registration, credential checks and account lookups all live remotely; this
//! module only speaks the service's form-in / JSON-out protocol.

mod client;
mod error;
mod types;

pub use client::CloudSessionClient;
pub use error::CloudSessionError;
pub use types::{CloudUser, NewCloudUser};

use async_trait::async_trait;

#[async_trait]
pub trait CloudSession: Send + Sync {
    /// Create a remote account. Returns the new cloud user id.
    async fn register_user(&self, registration: &NewCloudUser) -> Result<i64, CloudSessionError>;

    async fn authenticate_local_user(&self, email: &str, password: &str) -> Result<CloudUser, CloudSessionError>;

    async fn get_user_by_id(&self, id: i64) -> Result<CloudUser, CloudSessionError>;

    async fn get_user_by_email(&self, email: &str) -> Result<CloudUser, CloudSessionError>;

    async fn change_user_locale(&self, id: i64, locale: &str) -> Result<CloudUser, CloudSessionError>;
}
