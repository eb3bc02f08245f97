use sqlx::PgPool;
use std::sync::Arc;

use crate::cloudsession::CloudSession;
use crate::config::AppConfig;
use crate::database::{MemoryStore, PgStore, ProjectStore, SessionStore, UserStore};
use crate::services::{ProjectService, SecurityService};

/// Everything a request handler needs, passed explicitly through axum state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub projects: ProjectService,
    pub security: SecurityService,
    /// Present when running on Postgres; used by the health check.
    pub database: Option<PgPool>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        projects: Arc<dyn ProjectStore>,
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        cloud: Arc<dyn CloudSession>,
        database: Option<PgPool>,
    ) -> Self {
        let security = SecurityService::new(cloud, users, sessions, config.security.clone());
        Self {
            config: Arc::new(config),
            projects: ProjectService::new(projects),
            security,
            database,
        }
    }

    pub fn with_postgres(config: AppConfig, pool: PgPool, cloud: Arc<dyn CloudSession>) -> Self {
        let store = Arc::new(PgStore::new(pool.clone()));
        Self::new(config, store.clone(), store.clone(), store, cloud, Some(pool))
    }

    pub fn with_memory(config: AppConfig, store: MemoryStore, cloud: Arc<dyn CloudSession>) -> Self {
        let store = Arc::new(store);
        Self::new(config, store.clone(), store.clone(), store, cloud, None)
    }
}
