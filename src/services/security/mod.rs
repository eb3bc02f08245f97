//! Account and session services.
//!
//! Registration and credential checks are delegated to the cloud session service;
//! this layer validates input, keeps the local user mirror in step and owns the
//! server-side session rows.

mod registration;
mod session;

pub use registration::{is_coppa_eligible, is_valid_email, Registration, COPPA_AGE, DEFAULT_LOCALE, MIN_BIRTH_YEAR};
pub use session::{AuthSession, IssuedSession, SessionAttributes, SessionData};

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth::{self, Claims, JwtError};
use crate::cloudsession::{CloudSession, CloudSessionError, CloudUser};
use crate::config::SecurityConfig;
use crate::database::models::{NewSession, User};
use crate::database::{DatabaseError, SessionStore, UserStore};

#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("registration rejected: {0}")]
    Validation(&'static str),

    #[error("registration precondition failed: {0}")]
    Precondition(&'static str),

    #[error(transparent)]
    Cloud(#[from] CloudSessionError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error("session is invalid or has expired")]
    InvalidSession,

    #[error("cloud session service unavailable")]
    RemoteUnavailable,
}

#[derive(Clone)]
pub struct SecurityService {
    cloud: Arc<dyn CloudSession>,
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    config: SecurityConfig,
}

impl SecurityService {
    pub fn new(
        cloud: Arc<dyn CloudSession>,
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        config: SecurityConfig,
    ) -> Self {
        Self {
            cloud,
            users,
            sessions,
            config,
        }
    }

    /// Validate a new account, create it remotely and mirror it locally.
    ///
    /// Returns the cloud user id. A cloud session server failure is logged and
    /// reported as id `0`; every other remote failure is returned as an error.
    pub async fn register(&self, registration: &Registration) -> Result<i64, SecurityError> {
        debug!(
            "Registering screen name {:?} (birth {}/{}, sponsor source {})",
            registration.screenname,
            registration.birth_month,
            registration.birth_year,
            registration.parent_email_source
        );

        let new_user = registration.validate(Utc::now().date_naive())?;

        info!("Registering user account with cloud session service");
        let id_cloud_user = match self.cloud.register_user(&new_user).await {
            Ok(id) => id,
            Err(CloudSessionError::Server(msg)) => {
                error!("Server error detected during registration: {}", msg);
                return Ok(0);
            }
            Err(e) => {
                warn!("Registration refused by cloud session service: {}", e);
                return Err(e.into());
            }
        };

        if id_cloud_user > 0 {
            self.users.create(id_cloud_user, &new_user.screenname, &new_user.locale).await.map_err(|e| {
                error!("Cloud account {} created but local user insert failed: {}", id_cloud_user, e);
                e
            })?;
        }
        Ok(id_cloud_user)
    }

    /// Check credentials with the cloud session service. Failures propagate unchanged.
    pub async fn authenticate_local_user(&self, email: &str, password: &str) -> Result<CloudUser, CloudSessionError> {
        info!("Attempting to authenticate {}", email);
        match self.cloud.authenticate_local_user(email, password).await {
            Ok(user) => {
                info!("User authenticated");
                Ok(user)
            }
            Err(e) => {
                match &e {
                    CloudSessionError::UnknownUser(_) => error!("User account is unknown."),
                    CloudSessionError::UserBlocked => error!("User account is blocked."),
                    CloudSessionError::EmailNotConfirmed => error!("Attempt to log into an unconfirmed account."),
                    CloudSessionError::InsufficientBucketTokens => {
                        error!("Number of consecutive login attempts has been exceeded.")
                    }
                    CloudSessionError::WrongAuthenticationSource => {
                        error!("Attempting to authenticate to the wrong authentication source.")
                    }
                    other => error!("Authentication failed: {}", other),
                }
                Err(e)
            }
        }
    }

    /// Fetch an account by cloud id. A server failure yields `Ok(None)`.
    pub async fn authenticate_local_user_by_id(&self, id_cloud_user: i64) -> Result<Option<CloudUser>, CloudSessionError> {
        match self.cloud.get_user_by_id(id_cloud_user).await {
            Ok(user) => {
                info!("User {} authenticated by id", id_cloud_user);
                Ok(Some(user))
            }
            Err(CloudSessionError::Server(msg)) => {
                error!("Server error detected. {}", msg);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Session data for the request, resolving the local user on first use.
    ///
    /// Resolution fetches the cloud account for the session principal, pushes a
    /// changed session locale back to the cloud service, caches the account and
    /// records the local user id. Failures are logged and leave the id unset so
    /// a later request retries.
    pub async fn get_session_data(&self, session: &mut AuthSession) -> SessionData {
        debug!("Getting user session data for {}", session.id);

        if session.data.id_user.is_none() && session.is_authenticated() {
            debug!("Session data missing a local id for an authenticated user");
            match self.resolve_session_user(session).await {
                Ok(()) => self.store_attributes(session).await,
                Err(e) => error!("Unable to resolve session user {}: {}", session.principal, e),
            }
        }

        session.data.clone()
    }

    async fn resolve_session_user(&self, session: &mut AuthSession) -> Result<(), SecurityError> {
        let mut user = self.cloud.get_user_by_email(&session.principal).await?;
        debug!("Session user {} (cloud id {}, locale {:?})", user.screenname, user.id, user.locale);

        let wanted = session.data.locale.clone().filter(|l| !l.is_empty());
        if let Some(locale) = wanted {
            if user.locale.as_deref() != Some(locale.as_str()) {
                info!("Changing user {} locale", user.screenname);
                match self.cloud.change_user_locale(user.id, &locale).await {
                    Ok(updated) => user = updated,
                    Err(CloudSessionError::UnknownUserId(id)) => {
                        error!("UnknownUserId exception detected for {}", id);
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }

        let local = self.sync_local_user(&user).await;
        debug!("Setting session user data for {}", user.screenname);
        session.data.user = Some(user);

        match local {
            Ok(local) => {
                debug!("Setting local user id to {}", local.id);
                session.data.id_user = Some(local.id);
            }
            Err(e) => warn!("No local user id for session {}: {}", session.id, e),
        }
        Ok(())
    }

    /// Local mirror for a cloud account, with its locale brought in line with the cloud's.
    async fn sync_local_user(&self, user: &CloudUser) -> Result<User, DatabaseError> {
        let locale = user.locale.as_deref().filter(|l| !l.is_empty()).unwrap_or(DEFAULT_LOCALE);
        let local = self.users.get_or_create(user.id, &user.screenname, locale).await?;
        if local.locale == locale {
            return Ok(local);
        }

        info!("Updating local locale of {} to {}", user.screenname, locale);
        Ok(self.users.update_locale(user.id, locale).await?.unwrap_or(local))
    }

    async fn store_attributes(&self, session: &AuthSession) {
        let attributes = match serde_json::to_string(&session.attributes()) {
            Ok(json) => json,
            Err(e) => {
                error!("Unable to serialize session {}: {}", session.id, e);
                return;
            }
        };
        if let Err(e) = self.sessions.update_attributes(&session.id, &attributes).await {
            error!("Unable to store session {}: {}", session.id, e);
        }
    }

    /// Create a session row for an authenticated account and sign a token for it.
    pub async fn open_session(
        &self,
        user: &CloudUser,
        host: Option<String>,
        locale: Option<String>,
    ) -> Result<IssuedSession, SecurityError> {
        let session = AuthSession {
            id: Uuid::new_v4().simple().to_string(),
            principal: user.email.clone(),
            data: SessionData {
                id_user: None,
                user: None,
                locale: locale.filter(|l| !l.is_empty()).or_else(|| user.locale.clone()),
            },
        };

        let attributes = serde_json::to_string(&session.attributes())
            .map_err(|e| DatabaseError::QueryError(format!("session attributes: {}", e)))?;
        let timeout = Some(self.config.session_timeout_ms).filter(|ms| *ms > 0);

        self.sessions
            .create(NewSession {
                idsession: session.id.clone(),
                timeout,
                host,
                attributes: Some(attributes),
            })
            .await?;

        let claims = Claims::new(
            session.id.clone(),
            user.email.clone(),
            user.id,
            self.config.jwt_expiry_hours,
        );
        let token = auth::generate_jwt(&claims, &self.config.jwt_secret)?;
        info!("Opened session {} for {}", session.id, user.screenname);

        Ok(IssuedSession {
            token,
            expires_in: claims.exp - claims.iat,
            session,
            user: user.clone(),
        })
    }

    /// Resolve a bearer token to its live session.
    ///
    /// Bad tokens, unknown or expired sessions and principal mismatches all yield
    /// `Ok(None)`; only storage failures are errors. Expired rows are removed and
    /// live ones have their access time refreshed.
    pub async fn load_session(&self, token: &str) -> Result<Option<AuthSession>, SecurityError> {
        let claims = match auth::validate_jwt(token, &self.config.jwt_secret) {
            Ok(claims) => claims,
            Err(e) => {
                debug!("Rejected bearer token: {}", e);
                return Ok(None);
            }
        };

        let Some(record) = self.sessions.get(&claims.sid).await? else {
            debug!("Session {} not found", claims.sid);
            return Ok(None);
        };

        let now = Utc::now();
        if record.is_expired(now) {
            info!("Session {} expired", record.idsession);
            self.sessions.delete(&record.idsession).await?;
            return Ok(None);
        }

        let attributes: SessionAttributes = match record.attributes.as_deref().map(serde_json::from_str) {
            Some(Ok(attributes)) => attributes,
            Some(Err(e)) => {
                warn!("Session {} has unreadable attributes: {}", record.idsession, e);
                return Ok(None);
            }
            None => {
                warn!("Session {} has no attributes", record.idsession);
                return Ok(None);
            }
        };
        if attributes.principal != claims.sub {
            warn!("Session {} principal does not match its token", record.idsession);
            return Ok(None);
        }

        self.sessions.touch(&record.idsession, now).await?;

        Ok(Some(AuthSession {
            id: record.idsession,
            principal: attributes.principal,
            data: attributes.data,
        }))
    }

    /// Replace the token's session with a new one, re-checking the account by id.
    ///
    /// The token may be past `exp` by at most the configured grace, and its
    /// session row must still be live; a closed or expired session cannot be renewed.
    pub async fn renew_session(&self, token: &str, host: Option<String>) -> Result<IssuedSession, SecurityError> {
        let grace_secs = self.config.refresh_grace_hours.saturating_mul(3_600);
        let claims = auth::validate_jwt_within_grace(token, &self.config.jwt_secret, grace_secs)?;

        let Some(old) = self.sessions.get(&claims.sid).await? else {
            warn!("Refresh for unknown session {}", claims.sid);
            return Err(SecurityError::InvalidSession);
        };
        // Closed either way; an expired row is not renewed.
        self.sessions.delete(&old.idsession).await?;
        if old.is_expired(Utc::now()) {
            info!("Refresh for expired session {}", old.idsession);
            return Err(SecurityError::InvalidSession);
        }

        let attributes = old
            .attributes
            .as_deref()
            .and_then(|raw| serde_json::from_str::<SessionAttributes>(raw).ok())
            .filter(|attrs| attrs.principal == claims.sub)
            .ok_or(SecurityError::InvalidSession)?;

        let user = self
            .authenticate_local_user_by_id(claims.uid)
            .await?
            .ok_or(SecurityError::RemoteUnavailable)?;
        if !user.email.eq_ignore_ascii_case(&claims.sub) {
            warn!("Token principal {} no longer matches cloud user {}", claims.sub, claims.uid);
            return Err(SecurityError::InvalidSession);
        }

        self.open_session(&user, host, attributes.data.locale).await
    }

    pub async fn close_session(&self, idsession: &str) -> Result<bool, SecurityError> {
        let removed = self.sessions.delete(idsession).await?;
        info!("Closed session {}", idsession);
        Ok(removed)
    }

    pub async fn purge_expired_sessions(&self) -> Result<u64, SecurityError> {
        let removed = self.sessions.delete_expired(Utc::now()).await?;
        info!("Purged {} expired sessions", removed);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::MemoryStore;
    use crate::testing::FakeCloudSession;

    fn service(cloud: Arc<FakeCloudSession>, store: &MemoryStore) -> SecurityService {
        SecurityService::new(
            cloud,
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            AppConfig::development().security,
        )
    }

    fn registration(email: &str) -> Registration {
        Registration {
            screenname: Some("ada".into()),
            email: Some(email.into()),
            password: Some("pw-123456".into()),
            password_confirm: Some("pw-123456".into()),
            birth_month: 1,
            birth_year: 1990,
            parent_email: None,
            parent_email_source: 0,
        }
    }

    #[tokio::test]
    async fn register_creates_local_stub() {
        let cloud = Arc::new(FakeCloudSession::new());
        let store = MemoryStore::new();
        let security = service(cloud.clone(), &store);

        let id = security.register(&registration("ada@example.org")).await.unwrap();
        assert!(id > 0);
        let local = store.find_by_cloud_id(id).await.unwrap().unwrap();
        assert_eq!(local.screenname, "ada");
        assert_eq!(local.locale, DEFAULT_LOCALE);
    }

    #[tokio::test]
    async fn register_maps_server_error_to_zero() {
        let cloud = Arc::new(FakeCloudSession::new());
        cloud.fail_with_server_error(true);
        let store = MemoryStore::new();
        let security = service(cloud, &store);

        assert_eq!(security.register(&registration("ada@example.org")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn register_propagates_remote_refusals() {
        let cloud = Arc::new(FakeCloudSession::new());
        let store = MemoryStore::new();
        let security = service(cloud, &store);

        security.register(&registration("ada@example.org")).await.unwrap();
        assert!(matches!(
            security.register(&registration("ada@example.org")).await,
            Err(SecurityError::Cloud(CloudSessionError::NonUniqueEmail))
        ));
    }

    #[tokio::test]
    async fn authenticate_propagates_failures_verbatim() {
        let cloud = Arc::new(FakeCloudSession::new());
        cloud.add_user("ada@example.org", "pw", "ada", "en");
        cloud.block("ada@example.org");
        let store = MemoryStore::new();
        let security = service(cloud, &store);

        assert!(matches!(
            security.authenticate_local_user("ada@example.org", "pw").await,
            Err(CloudSessionError::UserBlocked)
        ));
        assert!(matches!(
            security.authenticate_local_user("nobody@example.org", "pw").await,
            Err(CloudSessionError::UnknownUser(_))
        ));
    }

    #[tokio::test]
    async fn session_data_resolves_user_and_pushes_locale() {
        let cloud = Arc::new(FakeCloudSession::new());
        let user = cloud.add_user("ada@example.org", "pw", "ada", "en");
        let store = MemoryStore::new();
        let security = service(cloud.clone(), &store);

        let issued = security
            .open_session(&user, None, Some("fr".into()))
            .await
            .unwrap();
        let mut session = security.load_session(&issued.token).await.unwrap().unwrap();
        assert_eq!(session.data.id_user, None);

        let data = security.get_session_data(&mut session).await;
        let id_user = data.id_user.expect("resolved local id");
        assert_eq!(data.user.unwrap().locale.as_deref(), Some("fr"));
        assert_eq!(cloud.user_by_email("ada@example.org").unwrap().locale.as_deref(), Some("fr"));
        assert_eq!(store.find_by_cloud_id(user.id).await.unwrap().unwrap().locale, "fr");

        // Resolution is persisted with the session.
        let reloaded = security.load_session(&issued.token).await.unwrap().unwrap();
        assert_eq!(reloaded.data.id_user, Some(id_user));

        // A later session in another locale updates the existing local mirror.
        let later = security.open_session(&user, None, Some("de".into())).await.unwrap();
        let mut session = security.load_session(&later.token).await.unwrap().unwrap();
        assert_eq!(security.get_session_data(&mut session).await.id_user, Some(id_user));
        assert_eq!(store.find_by_cloud_id(user.id).await.unwrap().unwrap().locale, "de");
    }

    #[tokio::test]
    async fn expired_sessions_are_dropped_on_load() {
        let cloud = Arc::new(FakeCloudSession::new());
        let user = cloud.add_user("ada@example.org", "pw", "ada", "en");
        let store = MemoryStore::new();
        let mut config = AppConfig::development().security;
        config.session_timeout_ms = 1;
        let security = SecurityService::new(cloud, Arc::new(store.clone()), Arc::new(store.clone()), config);

        let issued = security.open_session(&user, None, None).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert!(security.load_session(&issued.token).await.unwrap().is_none());
        assert!(SessionStore::get(&store, &issued.session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn renew_rotates_the_session() {
        let cloud = Arc::new(FakeCloudSession::new());
        let user = cloud.add_user("ada@example.org", "pw", "ada", "de");
        let store = MemoryStore::new();
        let security = service(cloud, &store);

        let first = security.open_session(&user, None, None).await.unwrap();
        let second = security.renew_session(&first.token, None).await.unwrap();

        assert_ne!(first.session.id, second.session.id);
        assert_eq!(second.session.data.locale.as_deref(), Some("de"));
        assert!(security.load_session(&first.token).await.unwrap().is_none());
        assert!(security.load_session(&second.token).await.unwrap().is_some());

        // The replaced token cannot be renewed a second time.
        assert!(matches!(
            security.renew_session(&first.token, None).await,
            Err(SecurityError::InvalidSession)
        ));
    }

    #[tokio::test]
    async fn closed_sessions_cannot_be_renewed() {
        let cloud = Arc::new(FakeCloudSession::new());
        let user = cloud.add_user("ada@example.org", "pw", "ada", "en");
        let store = MemoryStore::new();
        let security = service(cloud, &store);

        let issued = security.open_session(&user, None, None).await.unwrap();
        assert!(security.close_session(&issued.session.id).await.unwrap());
        assert!(matches!(
            security.renew_session(&issued.token, None).await,
            Err(SecurityError::InvalidSession)
        ));
    }

    #[tokio::test]
    async fn expired_sessions_cannot_be_renewed() {
        let cloud = Arc::new(FakeCloudSession::new());
        let user = cloud.add_user("ada@example.org", "pw", "ada", "en");
        let store = MemoryStore::new();
        let mut config = AppConfig::development().security;
        config.session_timeout_ms = 1;
        let security = SecurityService::new(cloud, Arc::new(store.clone()), Arc::new(store.clone()), config);

        let issued = security.open_session(&user, None, None).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert!(matches!(
            security.renew_session(&issued.token, None).await,
            Err(SecurityError::InvalidSession)
        ));
        assert!(SessionStore::get(&store, &issued.session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn tokens_past_the_refresh_grace_are_rejected() {
        let cloud = Arc::new(FakeCloudSession::new());
        let user = cloud.add_user("ada@example.org", "pw", "ada", "en");
        let store = MemoryStore::new();
        let config = AppConfig::development().security;
        let security = service(cloud, &store);

        let issued = security.open_session(&user, None, None).await.unwrap();
        let mut claims = auth::validate_jwt(&issued.token, &config.jwt_secret).unwrap();
        claims.exp = Utc::now().timestamp() - (config.refresh_grace_hours as i64 * 3_600) - 60;
        let stale = auth::generate_jwt(&claims, &config.jwt_secret).unwrap();

        assert!(matches!(
            security.renew_session(&stale, None).await,
            Err(SecurityError::Token(_))
        ));
    }
}
