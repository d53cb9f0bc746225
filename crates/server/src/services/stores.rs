//! Store registry: admin-managed stores and their read projections.

use std::collections::HashMap;

use sqlx::PgPool;
use thiserror::Error;

use store_ratings_core::{
    RatingValue, Role, StoreId, UserId, ValidationErrors, owner_overall_average, validation,
};

use crate::db::{RatingRepository, RepositoryError, StoreRepository};
use crate::models::store::{
    NewStore, OwnerDashboard, Store, StoreChanges, StoreDetail, StoreFilter, StoreListing,
};
use crate::models::user::User;

/// Errors from the store registry.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("store not found")]
    NotFound,

    #[error("store already exists")]
    EmailTaken,

    /// The owner id does not name a `store_owner` account.
    #[error("invalid store owner")]
    InvalidOwner,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl StoreError {
    fn from_repository(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => Self::EmailTaken,
            RepositoryError::InvalidReference(_) => Self::InvalidOwner,
            other => Self::Repository(other),
        }
    }
}

/// Fields supplied when a store is created.
#[derive(Debug, Clone)]
pub struct StoreForm {
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: Option<UserId>,
}

impl StoreForm {
    /// Check every field and collect all failures.
    ///
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn validate(&self) -> Result<NewStore, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check("name", validation::name(&self.name));
        let email = errors.check("email", validation::email(&self.email));
        errors.check("address", validation::address(&self.address));
        let owner_id = errors.check("ownerId", self.owner_id.ok_or("Store owner is required"));

        match (email, owner_id) {
            (Some(email), Some(owner_id)) if errors.is_empty() => Ok(NewStore {
                name: self.name.clone(),
                email,
                address: self.address.clone(),
                owner_id,
            }),
            _ => Err(errors),
        }
    }
}

/// Partial store edit as submitted. Absent fields stay unchanged.
#[derive(Debug, Clone, Default)]
pub struct StoreUpdateForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub owner_id: Option<UserId>,
}

impl StoreUpdateForm {
    /// Check the supplied fields.
    ///
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn validate(&self) -> Result<StoreChanges, ValidationErrors> {
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
        errors.into_result()?;

        Ok(StoreChanges {
            name: self.name.clone(),
            email,
            address: self.address.clone(),
            owner_id: self.owner_id,
        })
    }
}

/// Attach the caller's own rating to each listed store that has one.
/// Stores without an entry are left without the field.
pub fn annotate_with_caller_rating(
    listings: &mut [StoreListing],
    ratings: &HashMap<StoreId, RatingValue>,
) {
    for listing in listings {
        listing.user_rating = ratings.get(&listing.store.id).copied();
    }
}

/// The account whose ratings are attached to listings: only `user` callers.
fn rating_caller(caller: Option<&User>) -> Option<UserId> {
    caller
        .filter(|user| user.role == Role::User)
        .map(|user| user.id)
}

/// Store registry service.
pub struct StoreRegistry<'a> {
    stores: StoreRepository<'a>,
    ratings: RatingRepository<'a>,
}

impl<'a> StoreRegistry<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            stores: StoreRepository::new(pool),
            ratings: RatingRepository::new(pool),
        }
    }

    /// Register a store for a `store_owner` account.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` if a field is invalid.
    /// Returns `StoreError::EmailTaken` if the store email exists.
    /// Returns `StoreError::InvalidOwner` if the owner is not a store owner.
    pub async fn create(&self, form: &StoreForm) -> Result<Store, StoreError> {
        let new_store = form.validate()?;
        let store = self
            .stores
            .create(&new_store)
            .await
            .map_err(StoreError::from_repository)?;

        tracing::info!(store_id = %store.id, owner_id = %store.owner_id, "Store created");
        Ok(store)
    }

    /// Edit a store. Only supplied fields change.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the store does not exist, plus the
    /// errors of [`Self::create`].
    pub async fn update(&self, id: StoreId, form: &StoreUpdateForm) -> Result<Store, StoreError> {
        let changes = form.validate()?;
        let store = self
            .stores
            .update(id, &changes)
            .await
            .map_err(StoreError::from_repository)?
            .ok_or(StoreError::NotFound)?;

        tracing::info!(store_id = %id, "Store updated");
        Ok(store)
    }

    /// Remove a store and, through the database, its ratings.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the store does not exist.
    pub async fn delete(&self, id: StoreId) -> Result<(), StoreError> {
        if !self.stores.delete(id).await? {
            return Err(StoreError::NotFound);
        }

        tracing::info!(store_id = %id, "Store deleted");
        Ok(())
    }

    /// Get a store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the store does not exist.
    pub async fn get(&self, id: StoreId) -> Result<Store, StoreError> {
        self.stores.get(id).await?.ok_or(StoreError::NotFound)
    }

    /// Stores matching `filter`, annotated with the caller's ratings.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Repository` if a query fails.
    pub async fn list(
        &self,
        filter: &StoreFilter,
        caller: Option<&User>,
    ) -> Result<Vec<StoreListing>, StoreError> {
        let mut listings = self.stores.list(filter).await?;

        if let Some(user_id) = rating_caller(caller) {
            let ids: Vec<StoreId> = listings.iter().map(|l| l.store.id).collect();
            let ratings = self.ratings.values_for_user(user_id, &ids).await?;
            annotate_with_caller_rating(&mut listings, &ratings);
        }

        Ok(listings)
    }

    /// One store with all its ratings, annotated with the caller's rating.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the store does not exist.
    pub async fn detail(&self, id: StoreId, caller: Option<&User>) -> Result<StoreDetail, StoreError> {
        let mut listing = self.stores.listing(id).await?.ok_or(StoreError::NotFound)?;
        let ratings = self.ratings.list_for_stores(&[id]).await?;

        if let Some(user_id) = rating_caller(caller) {
            listing.user_rating = ratings
                .iter()
                .find(|r| r.user.id == user_id)
                .map(|r| r.rating);
        }

        Ok(StoreDetail { listing, ratings })
    }

    /// The owner's stores, every rating on them and the overall average.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Repository` if a query fails.
    pub async fn owner_dashboard(&self, owner_id: UserId) -> Result<OwnerDashboard, StoreError> {
        let stores = self.stores.list_by_owner(owner_id).await?;
        let ids: Vec<StoreId> = stores.iter().map(|l| l.store.id).collect();
        let rating_users = self.ratings.list_for_stores(&ids).await?;

        // Unrated stores count as 0 here, unlike the per-store average.
        let overall_average_rating =
            owner_overall_average(stores.iter().map(|l| l.summary.average_rating));

        Ok(OwnerDashboard {
            stores,
            rating_users,
            overall_average_rating,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::Utc;
    use store_ratings_core::{Email, RatingSummary};

    use super::*;
    use crate::models::user::UserSummary;

    fn listing(id: i32) -> StoreListing {
        StoreListing {
            store: Store {
                id: StoreId::new(id),
                name: format!("Sample Store Number {id:02} Name"),
                email: Email::parse(&format!("store{id}@example.com")).unwrap(),
                address: "123 Market Street".to_owned(),
                owner_id: UserId::new(2),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            owner: UserSummary {
                id: UserId::new(2),
                name: "Store Owner Number One Account".to_owned(),
                email: Email::parse("owner1@example.com").unwrap(),
            },
            summary: RatingSummary::default(),
            user_rating: None,
        }
    }

    fn caller(role: Role) -> User {
        User {
            id: UserId::new(9),
            name: "Normal User Account Number One".to_owned(),
            email: Email::parse("user1@example.com").unwrap(),
            address: "101 User Street".to_owned(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_annotation_only_where_rated() {
        let mut listings = vec![listing(1), listing(2)];
        let ratings = HashMap::from([(StoreId::new(2), RatingValue::new(4).unwrap())]);

        annotate_with_caller_rating(&mut listings, &ratings);

        assert_eq!(listings[0].user_rating, None);
        assert_eq!(listings[1].user_rating, Some(RatingValue::new(4).unwrap()));

        let json = serde_json::to_value(&listings).unwrap();
        assert!(json[0].get("userRating").is_none());
        assert_eq!(json[1]["userRating"], 4);
    }

    #[test]
    fn test_only_user_role_gets_annotations() {
        assert_eq!(rating_caller(None), None);
        assert_eq!(rating_caller(Some(&caller(Role::User))), Some(UserId::new(9)));
        assert_eq!(rating_caller(Some(&caller(Role::Admin))), None);
        assert_eq!(rating_caller(Some(&caller(Role::StoreOwner))), None);
    }

    #[test]
    fn test_store_form_validation() {
        let form = StoreForm {
            name: "Third Sample Store Name Here".to_owned(),
            email: "store3@example.com".to_owned(),
            address: "789 Shopping Avenue".to_owned(),
            owner_id: Some(UserId::new(2)),
        };
        assert_eq!(form.validate().unwrap().owner_id, UserId::new(2));

        let bad = StoreForm {
            name: "Tiny".to_owned(),
            email: "store3".to_owned(),
            owner_id: None,
            ..form
        };
        let errors = bad.validate().unwrap_err();
        let fields: Vec<_> = errors.errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, ["name", "email", "ownerId"]);
    }

    #[test]
    fn test_repository_errors_map_to_domain_errors() {
        assert!(matches!(
            StoreError::from_repository(RepositoryError::InvalidReference("owner".into())),
            StoreError::InvalidOwner
        ));
        assert!(matches!(
            StoreError::from_repository(RepositoryError::Conflict("email".into())),
            StoreError::EmailTaken
        ));
    }
}
