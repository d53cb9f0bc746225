//! Rating domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use store_ratings_core::{RatingId, RatingValue, StoreId, UserId};

use super::user::UserSummary;

/// One user's rating of one store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: RatingId,
    pub user_id: UserId,
    pub store_id: StoreId,
    pub rating: RatingValue,
    /// Set on first submission, kept on overwrite.
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A rating together with the account that left it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingWithUser {
    pub id: RatingId,
    pub rating: RatingValue,
    pub store_id: StoreId,
    pub created_at: DateTime<Utc>,
    pub user: UserSummary,
}
