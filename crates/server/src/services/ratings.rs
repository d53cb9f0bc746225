//! Rating ledger: one rating per (user, store), upserted.

use sqlx::PgPool;
use thiserror::Error;

use store_ratings_core::{RatingId, RatingSummary, RatingValue, Role, StoreId, UserId};

use crate::db::{RatingRepository, RepositoryError, StoreRepository};
use crate::models::rating::Rating;

/// Errors from the rating ledger.
#[derive(Debug, Error)]
pub enum RatingError {
    #[error("store not found")]
    StoreNotFound,

    #[error("rating not found")]
    NotFound,

    /// Caller is neither an admin nor the author of the rating.
    #[error("not authorized to delete this rating")]
    Forbidden,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Result of a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// First rating of this store by this user.
    Created(Rating),
    /// The existing rating's value was overwritten.
    Updated(Rating),
}

impl Submission {
    #[must_use]
    pub const fn rating(&self) -> &Rating {
        match self {
            Self::Created(rating) | Self::Updated(rating) => rating,
        }
    }
}

/// Whether `caller` may delete `rating`.
#[must_use]
pub fn may_delete(rating: &Rating, caller_id: UserId, caller_role: Role) -> bool {
    caller_role == Role::Admin || rating.user_id == caller_id
}

/// Rating ledger service.
pub struct RatingLedger<'a> {
    ratings: RatingRepository<'a>,
    stores: StoreRepository<'a>,
}

impl<'a> RatingLedger<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            ratings: RatingRepository::new(pool),
            stores: StoreRepository::new(pool),
        }
    }

    /// Create or overwrite `user_id`'s rating of `store_id`.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::StoreNotFound` if the store does not exist.
    pub async fn submit(
        &self,
        user_id: UserId,
        store_id: StoreId,
        value: RatingValue,
    ) -> Result<Submission, RatingError> {
        if self.stores.get(store_id).await?.is_none() {
            return Err(RatingError::StoreNotFound);
        }

        let (rating, inserted) = self
            .ratings
            .upsert(user_id, store_id, value)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => RatingError::StoreNotFound,
                other => RatingError::Repository(other),
            })?;

        tracing::info!(
            rating_id = %rating.id,
            user_id = %user_id,
            store_id = %store_id,
            inserted,
            "Rating submitted"
        );

        Ok(if inserted {
            Submission::Created(rating)
        } else {
            Submission::Updated(rating)
        })
    }

    /// `user_id`'s rating of `store_id`, or `None`.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::Repository` if the query fails.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        store_id: StoreId,
    ) -> Result<Option<Rating>, RatingError> {
        Ok(self.ratings.get_for_user(user_id, store_id).await?)
    }

    /// Delete a rating as `caller_id`.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::NotFound` if the rating does not exist.
    /// Returns `RatingError::Forbidden` unless the caller is an admin or wrote it.
    pub async fn delete(
        &self,
        id: RatingId,
        caller_id: UserId,
        caller_role: Role,
    ) -> Result<(), RatingError> {
        let rating = self.ratings.get(id).await?.ok_or(RatingError::NotFound)?;

        if !may_delete(&rating, caller_id, caller_role) {
            return Err(RatingError::Forbidden);
        }

        if !self.ratings.delete(id).await? {
            return Err(RatingError::NotFound);
        }

        tracing::info!(rating_id = %id, caller_id = %caller_id, "Rating deleted");
        Ok(())
    }

    /// Average (null when unrated) and count of one store's ratings.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::Repository` if the query fails.
    pub async fn average_and_count(&self, store_id: StoreId) -> Result<RatingSummary, RatingError> {
        Ok(self.ratings.summary(store_id).await?)
    }
}
