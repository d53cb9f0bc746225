//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (binary only)
//! 2. `TraceLayer` (request span with `request_id` and `user_id` fields)
//! 3. Request ID
//! 4. CORS
//! 5. Rate limiting on `/api/auth/*` (governor)
//!
//! Authentication is not a layer: handlers take [`Authorized`] or
//! [`OptionalAuth`] extractors.

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::{Authorized, OptionalAuth, gate};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
