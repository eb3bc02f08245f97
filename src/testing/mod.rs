//! In-process stand-ins for tests: a scripted cloud session service and a
//! memory-backed application state.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::cloudsession::{CloudSession, CloudSessionError, CloudUser, NewCloudUser};
use crate::config::{AppConfig, StorageBackend};
use crate::database::MemoryStore;
use crate::state::AppState;

#[derive(Debug, Clone)]
struct Account {
    user: CloudUser,
    password: String,
    blocked: bool,
    confirmed: bool,
}

/// Cloud session service kept in memory. Accounts registered through it are
/// confirmed immediately.
#[derive(Debug, Default)]
pub struct FakeCloudSession {
    accounts: Mutex<HashMap<String, Account>>,
    next_id: AtomicI64,
    server_down: AtomicBool,
}

impl FakeCloudSession {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1000),
            ..Self::default()
        }
    }

    /// Make every call fail as if the service returned HTTP 500.
    pub fn fail_with_server_error(&self, down: bool) {
        self.server_down.store(down, Ordering::SeqCst);
    }

    pub fn add_user(&self, email: &str, password: &str, screenname: &str, locale: &str) -> CloudUser {
        let user = CloudUser {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            email: email.to_string(),
            screenname: screenname.to_string(),
            locale: Some(locale.to_string()),
            authentication_source: Some("local".to_string()),
            birth_month: None,
            birth_year: None,
            parent_email: None,
            parent_email_source: None,
        };
        self.accounts().insert(
            email.to_ascii_lowercase(),
            Account {
                user: user.clone(),
                password: password.to_string(),
                blocked: false,
                confirmed: true,
            },
        );
        user
    }

    pub fn block(&self, email: &str) {
        if let Some(account) = self.accounts().get_mut(&email.to_ascii_lowercase()) {
            account.blocked = true;
        }
    }

    pub fn unconfirm(&self, email: &str) {
        if let Some(account) = self.accounts().get_mut(&email.to_ascii_lowercase()) {
            account.confirmed = false;
        }
    }

    pub fn user_by_email(&self, email: &str) -> Option<CloudUser> {
        self.accounts().get(&email.to_ascii_lowercase()).map(|a| a.user.clone())
    }

    fn accounts(&self) -> MutexGuard<'_, HashMap<String, Account>> {
        self.accounts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_server(&self) -> Result<(), CloudSessionError> {
        if self.server_down.load(Ordering::SeqCst) {
            return Err(CloudSessionError::Server("HTTP 500 Internal Server Error".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CloudSession for FakeCloudSession {
    async fn register_user(&self, registration: &NewCloudUser) -> Result<i64, CloudSessionError> {
        self.check_server()?;
        if self.user_by_email(&registration.email).is_some() {
            return Err(CloudSessionError::NonUniqueEmail);
        }
        if self.accounts().values().any(|a| a.user.screenname == registration.screenname) {
            return Err(CloudSessionError::ScreennameUsed);
        }
        if registration.password.len() < 8 {
            return Err(CloudSessionError::PasswordComplexity);
        }
        let user = self.add_user(
            &registration.email,
            &registration.password,
            &registration.screenname,
            &registration.locale,
        );
        Ok(user.id)
    }

    async fn authenticate_local_user(&self, email: &str, password: &str) -> Result<CloudUser, CloudSessionError> {
        self.check_server()?;
        let accounts = self.accounts();
        let account = accounts
            .get(&email.to_ascii_lowercase())
            .ok_or_else(|| CloudSessionError::UnknownUser(email.to_string()))?;
        if account.blocked {
            return Err(CloudSessionError::UserBlocked);
        }
        if !account.confirmed {
            return Err(CloudSessionError::EmailNotConfirmed);
        }
        if account.password != password {
            return Err(CloudSessionError::UnknownUser(email.to_string()));
        }
        Ok(account.user.clone())
    }

    async fn get_user_by_id(&self, id: i64) -> Result<CloudUser, CloudSessionError> {
        self.check_server()?;
        self.accounts()
            .values()
            .find(|a| a.user.id == id)
            .map(|a| a.user.clone())
            .ok_or(CloudSessionError::UnknownUserId(id))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<CloudUser, CloudSessionError> {
        self.check_server()?;
        self.user_by_email(email)
            .ok_or_else(|| CloudSessionError::UnknownUser(email.to_string()))
    }

    async fn change_user_locale(&self, id: i64, locale: &str) -> Result<CloudUser, CloudSessionError> {
        self.check_server()?;
        let mut accounts = self.accounts();
        let account = accounts
            .values_mut()
            .find(|a| a.user.id == id)
            .ok_or(CloudSessionError::UnknownUserId(id))?;
        account.user.locale = Some(locale.to_string());
        Ok(account.user.clone())
    }
}

/// Development configuration switched to the memory backend.
pub fn memory_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.database.backend = StorageBackend::Memory;
    config.database.run_migrations = false;
    config.api.enable_request_logging = false;
    config
}

/// Application state over a fresh [`MemoryStore`] and [`FakeCloudSession`].
pub fn memory_state() -> (AppState, Arc<FakeCloudSession>) {
    let cloud = Arc::new(FakeCloudSession::new());
    let state = AppState::with_memory(memory_config(), MemoryStore::new(), cloud.clone());
    (state, cloud)
}
