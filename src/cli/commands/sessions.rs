use chrono::Utc;
use serde_json::json;

use crate::cli::utils::{connect, output_success};
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::{PgStore, SessionStore};

pub async fn handle(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = PgStore::new(connect(config).await?);
    let removed = store.delete_expired(Utc::now()).await?;

    output_success(
        &output_format,
        &format!("Purged {} expired session(s)", removed),
        Some(json!({ "removed": removed })),
    )
}
