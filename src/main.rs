use anyhow::Context;
use std::sync::Arc;
use tracing::info;

use blocklab_api::cloudsession::CloudSessionClient;
use blocklab_api::config::{AppConfig, StorageBackend};
use blocklab_api::database::{DatabaseManager, MemoryStore};
use blocklab_api::{app, logging, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();
    logging::init();

    let config = AppConfig::from_env();
    info!("Starting BlockLab API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set in {:?} mode", config.environment);
    }

    let cloud = Arc::new(CloudSessionClient::new(&config.cloudsession).context("cloud session client")?);
    info!("Cloud session service at {}", config.cloudsession.base_url);

    let state = match config.database.backend {
        StorageBackend::Postgres => {
            let pool = DatabaseManager::connect(&config.database)
                .await
                .context("failed to connect to database")?;
            if config.database.run_migrations {
                DatabaseManager::migrate(&pool).await.context("failed to run migrations")?;
            }
            AppState::with_postgres(config, pool, cloud)
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on exit");
            AppState::with_memory(config, MemoryStore::new(), cloud)
        }
    };

    let bind_addr = format!("0.0.0.0:{}", state.config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("BlockLab API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
