//! Account directory for admins: list, inspect, edit, delete, counts.

use sqlx::PgPool;
use thiserror::Error;

use store_ratings_core::{Role, UserId, ValidationErrors, owner_overall_average, validation};

use crate::db::{RepositoryError, StoreRepository, UserRepository};
use crate::models::user::{DashboardCounts, User, UserChanges, UserDetail, UserFilter};

/// Errors from the account directory.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("user not found")]
    NotFound,

    #[error("user already exists")]
    EmailTaken,

    /// The account owns stores, so it cannot be deleted or lose its role.
    #[error("user still owns stores")]
    OwnerHasStores,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl UserError {
    fn from_repository(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => Self::EmailTaken,
            RepositoryError::Referenced(_) => Self::OwnerHasStores,
            other => Self::Repository(other),
        }
    }
}

/// Partial account edit as submitted. Absent fields stay unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserUpdateForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
}

impl UserUpdateForm {
    /// Check the supplied fields with the registration rules.
    ///
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn validate(&self) -> Result<UserChanges, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(name) = &self.name {
            errors.check("name", validation::name(name));
        }
        let email = self
            .email
            .as_deref()
            .and_then(|email| errors.check("email", validation::email(email)));
        if let Some(address) = &self.address {
            errors.check("address", validation::address(address));
        }
        let role = match self.role.as_deref() {
            Some(raw) => match raw.parse::<Role>() {
                Ok(role) => Some(role),
                Err(e) => {
                    errors.push("role", e.to_string());
                    None
                }
            },
            None => None,
        };

        errors.into_result()?;

        Ok(UserChanges {
            name: self.name.clone(),
            email,
            address: self.address.clone(),
            role,
        })
    }
}

/// Admin-facing account operations.
pub struct UserService<'a> {
    users: UserRepository<'a>,
    stores: StoreRepository<'a>,
}

impl<'a> UserService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            stores: StoreRepository::new(pool),
        }
    }

    /// Accounts matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns `UserError::Repository` if the query fails.
    pub async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, UserError> {
        Ok(self.users.list(filter).await?)
    }

    /// One account. Store owners with at least one store also get their
    /// overall average rating.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` if the account does not exist.
    pub async fn detail(&self, id: UserId) -> Result<UserDetail, UserError> {
        let user = self.users.get_by_id(id).await?.ok_or(UserError::NotFound)?;

        let rating = if user.role == Role::StoreOwner {
            let stores = self.stores.list_by_owner(id).await?;
            (!stores.is_empty()).then(|| {
                owner_overall_average(stores.iter().map(|s| s.summary.average_rating))
            })
        } else {
            None
        };

        Ok(UserDetail { user, rating })
    }

    /// Edit an account.
    ///
    /// # Errors
    ///
    /// Returns `UserError::Validation` if a supplied field is invalid.
    /// Returns `UserError::NotFound` if the account does not exist.
    /// Returns `UserError::EmailTaken` if the new email belongs to another account.
    /// Returns `UserError::OwnerHasStores` if a store owner with stores would lose the role.
    pub async fn update(&self, id: UserId, form: &UserUpdateForm) -> Result<User, UserError> {
        let changes = form.validate()?;

        let user = self
            .users
            .update(id, &changes)
            .await
            .map_err(UserError::from_repository)?
            .ok_or(UserError::NotFound)?;

        tracing::info!(user_id = %id, "User updated");
        Ok(user)
    }

    /// Delete an account and, through the database, its ratings.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` if the account does not exist.
    /// Returns `UserError::OwnerHasStores` if the account still owns stores.
    pub async fn delete(&self, id: UserId) -> Result<(), UserError> {
        let deleted = self
            .users
            .delete(id)
            .await
            .map_err(UserError::from_repository)?;
        if !deleted {
            return Err(UserError::NotFound);
        }

        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Total accounts, stores and ratings.
    ///
    /// # Errors
    ///
    /// Returns `UserError::Repository` if the query fails.
    pub async fn dashboard(&self) -> Result<DashboardCounts, UserError> {
        Ok(self.users.dashboard_counts().await?)
    }
}
