use serde_json::json;

use crate::cli::utils::{connect, output_error, output_success};
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::DatabaseManager;

pub async fn handle(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = connect(config).await?;

    match DatabaseManager::health_check(&pool).await {
        Ok(()) => output_success(
            &output_format,
            "Database is reachable",
            Some(json!({ "database": "ok" })),
        ),
        Err(e) => {
            output_error(&output_format, &e.to_string(), Some("DATABASE_UNAVAILABLE"))?;
            Err(e.into())
        }
    }
}
