//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::RatingsConfig;
use crate::services::TokenKeys;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and is the only way handlers
/// reach the database pool and signing keys.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RatingsConfig,
    pool: PgPool,
    tokens: TokenKeys,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: RatingsConfig, pool: PgPool) -> Self {
        let tokens = TokenKeys::new(&config.jwt);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tokens,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &RatingsConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the token signing and verification keys.
    #[must_use]
    pub fn tokens(&self) -> &TokenKeys {
        &self.inner.tokens
    }
}
