//! Database migration commands.
//!
//! # Environment Variables
//!
//! - `MARKET_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/server/migrations/` and are embedded at build
//! time:
//! ```text
//! migrations/
//! ├── 20260301000001_create_market_schema.sql
//! ├── 20260301000002_create_wishlists.sql
//! └── 20260301000003_create_sessions.sql
//! ```

use std::collections::HashSet;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::migrate::{Migrate, Migrator};

static MIGRATOR: Migrator = sqlx::migrate!("../server/migrations");

/// Migration command errors.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

fn database_url() -> Result<SecretString, MigrationError> {
    dotenvy::dotenv().ok();

    std::env::var("MARKET_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar("MARKET_DATABASE_URL"))
}

async fn connect() -> Result<PgPool, MigrationError> {
    let url = database_url()?;
    tracing::info!("Connecting to market database...");
    Ok(PgPool::connect(url.expose_secret()).await?)
}

/// Apply every pending migration.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running market migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Market migrations complete!");
    Ok(())
}

/// Log which embedded migrations have not been applied yet.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the migrations table
/// cannot be read.
pub async fn pending() -> Result<(), MigrationError> {
    let pool = connect().await?;
    let mut conn = pool.acquire().await?;

    conn.ensure_migrations_table().await?;
    let applied: HashSet<i64> = conn
        .list_applied_migrations()
        .await?
        .into_iter()
        .map(|migration| migration.version)
        .collect();

    let mut pending = 0_usize;
    for migration in MIGRATOR.iter() {
        if applied.contains(&migration.version) {
            tracing::info!(version = migration.version, "applied: {}", migration.description);
        } else {
            pending += 1;
            tracing::info!(version = migration.version, "pending: {}", migration.description);
        }
    }

    tracing::info!(pending, "Migration check complete");
    Ok(())
}
