//! Domain models for the ratings API.
//!
//! These are validated domain objects, separate from database row types.
//! Every model serializes with camelCase field names.

pub mod rating;
pub mod store;
pub mod user;

pub use rating::{Rating, RatingWithUser};
pub use store::{
    NewStore, OwnerDashboard, Store, StoreChanges, StoreDetail, StoreFilter, StoreListing,
    StoreSort,
};
pub use user::{
    DashboardCounts, NewUser, User, UserChanges, UserDetail, UserFilter, UserSort, UserSummary,
};
