//! Business logic services.
//!
//! Services are constructed per request from the pool in `AppState` and own
//! the repositories they need.

pub mod auth;
pub mod ratings;
pub mod stores;
pub mod users;

pub use auth::{AccountForm, AuthError, AuthService, TokenKeys};
pub use ratings::{RatingError, RatingLedger, Submission};
pub use stores::{StoreError, StoreForm, StoreRegistry, StoreUpdateForm};
pub use users::{UserError, UserService, UserUpdateForm};
