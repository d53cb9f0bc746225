//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! sr-cli migrate
//! ```
//!
//! Migrations live in `crates/server/migrations/` and are embedded in the
//! binary at build time:
//! ```
//! migrations/
//! ├── 20260101000001_create_users.sql
//! ├── 20260101000002_create_stores.sql
//! └── 20260101000003_create_ratings.sql
//! ```

use store_ratings_server::db::MIGRATOR;

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the connection or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
