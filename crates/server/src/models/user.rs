//! Account domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use store_ratings_core::{Email, Role, UserId};

use crate::db::SortOrder;

/// An account (domain type).
///
/// The password hash never leaves the repository layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name, 20-60 characters.
    pub name: String,
    /// Login email, unique.
    pub email: Email,
    /// Postal address.
    pub address: String,
    /// Static role.
    pub role: Role,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The public face of an account, embedded in store and rating projections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

/// A validated account ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub address: String,
    pub role: Role,
}

/// Validated partial update of an account. `None` leaves the column as is.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub address: Option<String>,
    pub role: Option<Role>,
}

impl UserChanges {
    /// Whether no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.address.is_none() && self.role.is_none()
    }
}

/// Columns the account directory can be sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UserSort {
    #[default]
    Name,
    Email,
    Address,
    Role,
}

impl UserSort {
    /// Fixed SQL fragment for `ORDER BY`.
    pub(crate) const fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Address => "address",
            Self::Role => "role",
        }
    }
}

impl std::str::FromStr for UserSort {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "email" => Ok(Self::Email),
            "address" => Ok(Self::Address),
            "role" => Ok(Self::Role),
            _ => Err(()),
        }
    }
}

/// Account directory filters. Text filters are case-insensitive substrings.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<Role>,
    pub sort: UserSort,
    pub order: SortOrder,
}

/// An account as shown to admins, with the owner's overall average when the
/// account owns stores.
#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

/// System-wide counts for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounts {
    pub total_users: i64,
    pub total_stores: i64,
    pub total_ratings: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_user(role: Role) -> User {
        User {
            id: UserId::new(7),
            name: "Administrator Of The System".to_owned(),
            email: Email::parse("admin@example.com").unwrap(),
            address: "1 Main Street".to_owned(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_serializes_without_password() {
        let json = serde_json::to_value(sample_user(Role::StoreOwner)).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["role"], "store_owner");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
    }

    #[test]
    fn test_user_detail_rating_is_optional() {
        let plain = UserDetail {
            user: sample_user(Role::User),
            rating: None,
        };
        let json = serde_json::to_value(plain).unwrap();
        assert!(json.get("rating").is_none());
        assert_eq!(json["email"], "admin@example.com");

        let owner = UserDetail {
            user: sample_user(Role::StoreOwner),
            rating: Some(3.5),
        };
        let json = serde_json::to_value(owner).unwrap();
        assert_eq!(json["rating"], 3.5);
    }

    #[test]
    fn test_user_sort_parse() {
        assert_eq!("email".parse::<UserSort>(), Ok(UserSort::Email));
        assert_eq!("role".parse::<UserSort>().unwrap().column(), "role");
        assert!("password_hash".parse::<UserSort>().is_err());
    }

    #[test]
    fn test_user_changes_is_empty() {
        assert!(UserChanges::default().is_empty());
        let changes = UserChanges {
            role: Some(Role::Admin),
            ..UserChanges::default()
        };
        assert!(!changes.is_empty());
    }
}
