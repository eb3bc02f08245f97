pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "blocklab")]
#[command(about = "BlockLab CLI - database and session maintenance for the BlockLab API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Delete sessions idle past their timeout")]
    PurgeSessions,

    #[command(about = "Check database connectivity")]
    Health,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate => commands::migrate::handle(&config, output_format).await,
        Commands::PurgeSessions => commands::sessions::handle(&config, output_format).await,
        Commands::Health => commands::health::handle(&config, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommands_and_global_flags() {
        let cli = Cli::try_parse_from(["blocklab", "purge-sessions", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::PurgeSessions));
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);

        let cli = Cli::try_parse_from(["blocklab", "migrate"]).unwrap();
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Text);

        assert!(Cli::try_parse_from(["blocklab", "drop-everything"]).is_err());
    }
}
