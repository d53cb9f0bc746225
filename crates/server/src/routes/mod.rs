//! HTTP route handlers for the ratings API.
//!
//! # Route Structure
//!
//! ```text
//! # Auth (rate limited)
//! POST   /api/auth/register          - Register a `user` account
//! POST   /api/auth/login             - Exchange credentials for a token
//! GET    /api/auth/profile           - Caller's account
//! PUT    /api/auth/update-password   - Change caller's password
//!
//! # Users (admin)
//! GET    /api/users                  - Directory with filters and sorting
//! GET    /api/users/dashboard        - System-wide counts
//! GET    /api/users/{id}             - One account (+ owner rating)
//! POST   /api/users                  - Create an account with any role
//! PUT    /api/users/{id}             - Edit an account
//! DELETE /api/users/{id}             - Delete an account
//!
//! # Stores
//! GET    /api/stores                 - Browse (optional auth)
//! GET    /api/stores/{id}            - Detail with ratings (optional auth)
//! GET    /api/stores/owner/dashboard - Owner's stores and raters (store_owner)
//! POST   /api/stores                 - Register a store (admin)
//! PUT    /api/stores/{id}            - Edit a store (admin)
//! DELETE /api/stores/{id}            - Remove a store (admin)
//!
//! # Ratings
//! POST   /api/ratings                - Submit or overwrite (user)
//! GET    /api/ratings/store/{id}     - Caller's rating of a store (user)
//! DELETE /api/ratings/{id}           - Delete (author or admin)
//! ```

pub mod auth;
pub mod extract;
pub mod ratings;
pub mod stores;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Create all API routes, nested under `/api`.
pub fn routes(rate_limit: bool) -> Router<AppState> {
    let api = Router::new()
        .merge(auth::router(rate_limit))
        .merge(users::router())
        .merge(stores::router())
        .merge(ratings::router());

    Router::new().nest("/api", api)
}
