//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! tp-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `MARKET_DATABASE_URL` - SQLite connection string (falls back to `DATABASE_URL`)

use secrecy::SecretString;
use thiserror::Error;

use tradepost_storefront::db;

/// Errors from the migrate command.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run the marketplace database migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database URL is missing or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("MARKET_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar("MARKET_DATABASE_URL"))?;

    tracing::info!("Connecting to marketplace database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    db::run_migrations(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
