//! Harvest Market CLI - Database migrations.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! harvest-cli migrate
//!
//! # List applied and pending migrations without running them
//! harvest-cli migrate --dry-run
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "harvest-cli")]
#[command(author, version, about = "Harvest Market CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        /// Report pending migrations without applying them
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::migrate::MigrationError> {
    match cli.command {
        Commands::Migrate { dry_run: true } => commands::migrate::pending().await,
        Commands::Migrate { dry_run: false } => commands::migrate::run().await,
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_migrate_dry_run() {
        let cli = Cli::try_parse_from(["harvest-cli", "migrate", "--dry-run"]);
        assert!(matches!(
            cli.map(|cli| cli.command),
            Ok(Commands::Migrate { dry_run: true })
        ));
    }
}
