//! Subcommand implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;

use store_ratings_server::db;

/// Connect to the database named by `RATINGS_DATABASE_URL`.
///
/// # Errors
///
/// Returns an error if the variable is unset or the connection fails.
pub async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("RATINGS_DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| "RATINGS_DATABASE_URL not set")?;

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&database_url).await?)
}
