//! Store domain types and read projections.

use chrono::{DateTime, Utc};
use serde::Serialize;

use store_ratings_core::{Email, RatingSummary, RatingValue, StoreId, UserId};

use super::rating::RatingWithUser;
use super::user::UserSummary;
use crate::db::SortOrder;

/// A store (domain type).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub email: Email,
    pub address: String,
    /// Always an account with the `store_owner` role.
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated store ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewStore {
    pub name: String,
    pub email: Email,
    pub address: String,
    pub owner_id: UserId,
}

/// Validated partial update of a store. `None` leaves the column as is.
#[derive(Debug, Clone, Default)]
pub struct StoreChanges {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub address: Option<String>,
    pub owner_id: Option<UserId>,
}

/// A store as listed: owner, aggregates, and the caller's own rating.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreListing {
    #[serde(flatten)]
    pub store: Store,
    pub owner: UserSummary,
    #[serde(flatten)]
    pub summary: RatingSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_rating: Option<RatingValue>,
}

/// A single store with every rating it received.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreDetail {
    #[serde(flatten)]
    pub listing: StoreListing,
    pub ratings: Vec<RatingWithUser>,
}

/// What a store owner sees about their own stores.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerDashboard {
    pub stores: Vec<StoreListing>,
    /// Newest first.
    pub rating_users: Vec<RatingWithUser>,
    pub overall_average_rating: f64,
}

/// Columns the store list can be sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreSort {
    #[default]
    Name,
    Email,
    Address,
    AverageRating,
}

impl StoreSort {
    /// Fixed SQL fragment for `ORDER BY`.
    pub(crate) const fn column(self) -> &'static str {
        match self {
            Self::Name => "s.name",
            Self::Email => "s.email",
            Self::Address => "s.address",
            Self::AverageRating => "average_rating",
        }
    }
}

impl std::str::FromStr for StoreSort {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "email" => Ok(Self::Email),
            "address" => Ok(Self::Address),
            "averageRating" => Ok(Self::AverageRating),
            _ => Err(()),
        }
    }
}

/// Store list filters. Text filters are case-insensitive substrings.
#[derive(Debug, Clone, Default)]
pub struct StoreFilter {
    pub name: Option<String>,
    pub address: Option<String>,
    pub sort: StoreSort,
    pub order: SortOrder,
}
