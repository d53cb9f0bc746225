//! Account roles.

use serde::{Deserialize, Serialize};

/// The three static roles an account can hold.
///
/// Self-registration always yields [`Role::User`]; the other roles are
/// assigned by an administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Manages users and stores.
    Admin,
    /// Browses stores and submits ratings.
    #[default]
    User,
    /// Owns one or more stores and sees their ratings.
    StoreOwner,
}

impl Role {
    /// All roles, in declaration order.
    pub const ALL: [Self; 3] = [Self::Admin, Self::User, Self::StoreOwner];

    /// The wire/database name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::StoreOwner => "store_owner",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the known roles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid role: {0}. Valid roles: admin, user, store_owner")]
pub struct RoleParseError(pub String);

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            "store_owner" => Ok(Self::StoreOwner),
            _ => Err(RoleParseError(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_role_rejects_unknown() {
        let err = "owner".parse::<Role>().unwrap_err();
        assert_eq!(err, RoleParseError("owner".to_owned()));
    }

    #[test]
    fn test_role_serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&Role::StoreOwner).unwrap(),
            "\"store_owner\""
        );
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn test_default_role_is_user() {
        assert_eq!(Role::default(), Role::User);
    }
}
