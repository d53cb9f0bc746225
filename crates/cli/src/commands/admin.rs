//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! RATINGS_ADMIN_PASSWORD='Admin@123' \
//!     sr-cli admin create -n "System Administrator Account" -e admin@example.com -a "Admin Office"
//! ```
//!
//! # Environment Variables
//!
//! - `RATINGS_DATABASE_URL` - `PostgreSQL` connection string
//! - `RATINGS_ADMIN_PASSWORD` - Password for the new account. Read from the
//!   environment so it never appears in shell history.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use store_ratings_core::{Role, UserId};
use store_ratings_server::services::{AccountForm, AuthError, AuthService};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Account with this email already exists.
    #[error("An account already exists with email: {0}")]
    UserExists(String),

    /// Field validation or persistence failed.
    #[error(transparent)]
    Auth(AuthError),
}

/// Create a new admin account.
///
/// Runs the same validate, hash and persist pipeline as the API.
///
/// # Errors
///
/// Returns an error if the password variable is missing, a field is invalid
/// or the email is taken.
pub async fn create_admin(
    name: &str,
    email: &str,
    address: &str,
) -> Result<UserId, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let password = std::env::var("RATINGS_ADMIN_PASSWORD")
        .map(SecretString::from)
        .map_err(|_| AdminError::MissingEnvVar("RATINGS_ADMIN_PASSWORD"))?;

    let form = AccountForm {
        name: name.to_owned(),
        email: email.to_owned(),
        password: password.expose_secret().to_owned(),
        address: address.to_owned(),
    };

    if let Err(errors) = form.validate(Role::Admin) {
        for error in errors.errors() {
            tracing::error!("  - {}: {}", error.field, error.message);
        }
        return Err(AdminError::Auth(AuthError::Validation(errors)).into());
    }

    let pool = super::connect().await?;

    tracing::info!("Creating admin account: {}", email);
    let user = AuthService::new(&pool)
        .create_user(&form, Role::Admin)
        .await
        .map_err(|e| match e {
            AuthError::UserAlreadyExists => AdminError::UserExists(email.to_owned()),
            other => AdminError::Auth(other),
        })?;

    tracing::info!(
        "Admin account created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(user.id)
}
