//! Rating repository for database operations.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use store_ratings_core::{Email, RatingId, RatingSummary, RatingValue, StoreId, UserId};

use super::RepositoryError;
use crate::models::rating::{Rating, RatingWithUser};
use crate::models::user::UserSummary;

const RATING_COLUMNS: &str = "id, user_id, store_id, rating, created_at, updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct RatingRow {
    id: i32,
    user_id: i32,
    store_id: i32,
    rating: i16,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RatingRow> for Rating {
    type Error = RepositoryError;

    fn try_from(row: RatingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RatingId::new(row.id),
            user_id: UserId::new(row.user_id),
            store_id: StoreId::new(row.store_id),
            rating: parse_value(row.rating)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    rating: RatingRow,
    inserted: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct RatingWithUserRow {
    id: i32,
    rating: i16,
    store_id: i32,
    created_at: DateTime<Utc>,
    user_id: i32,
    user_name: String,
    user_email: String,
}

impl TryFrom<RatingWithUserRow> for RatingWithUser {
    type Error = RepositoryError;

    fn try_from(row: RatingWithUserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.user_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: RatingId::new(row.id),
            rating: parse_value(row.rating)?,
            store_id: StoreId::new(row.store_id),
            created_at: row.created_at,
            user: UserSummary {
                id: UserId::new(row.user_id),
                name: row.user_name,
                email,
            },
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    average_rating: Option<f64>,
    rating_count: i64,
}

fn parse_value(raw: i16) -> Result<RatingValue, RepositoryError> {
    RatingValue::try_from(raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("rating {}: {e}", e.0)))
}

fn ids(stores: &[StoreId]) -> Vec<i32> {
    stores.iter().map(StoreId::as_i32).collect()
}

/// Repository for rating database operations.
pub struct RatingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RatingRepository<'a> {
    /// Create a new rating repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert the rating, or overwrite the value of the existing rating for
    /// the same (user, store) pair.
    ///
    /// This is a single statement, so concurrent submissions for one pair
    /// leave exactly one row. `created_at` keeps its original value.
    ///
    /// Returns the rating and `true` if a new row was inserted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store or user vanished.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn upsert(
        &self,
        user_id: UserId,
        store_id: StoreId,
        value: RatingValue,
    ) -> Result<(Rating, bool), RepositoryError> {
        let sql = format!(
            "INSERT INTO ratings (user_id, store_id, rating) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, store_id) \
             DO UPDATE SET rating = EXCLUDED.rating, updated_at = NOW() \
             RETURNING {RATING_COLUMNS}, (xmax = 0) AS inserted"
        );
        let row: UpsertRow = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(store_id)
            .bind(value.as_i16())
            .fetch_one(self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                    RepositoryError::NotFound
                }
                other => RepositoryError::Database(other),
            })?;

        Ok((Rating::try_from(row.rating)?, row.inserted))
    }

    /// The rating `user_id` gave `store_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        store_id: StoreId,
    ) -> Result<Option<Rating>, RepositoryError> {
        let sql =
            format!("SELECT {RATING_COLUMNS} FROM ratings WHERE user_id = $1 AND store_id = $2");
        let row: Option<RatingRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(store_id)
            .fetch_optional(self.pool)
            .await?;

        row.map(Rating::try_from).transpose()
    }

    /// Get a rating by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: RatingId) -> Result<Option<Rating>, RepositoryError> {
        let sql = format!("SELECT {RATING_COLUMNS} FROM ratings WHERE id = $1");
        let row: Option<RatingRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(Rating::try_from).transpose()
    }

    /// Delete a rating.
    ///
    /// Returns `false` if the rating does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: RatingId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM ratings WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// The values `user_id` gave to each of `stores`, keyed by store.
    /// Stores the user has not rated are absent from the map.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn values_for_user(
        &self,
        user_id: UserId,
        stores: &[StoreId],
    ) -> Result<HashMap<StoreId, RatingValue>, RepositoryError> {
        if stores.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i32, i16)> = sqlx::query_as(
            "SELECT store_id, rating FROM ratings WHERE user_id = $1 AND store_id = ANY($2)",
        )
        .bind(user_id)
        .bind(ids(stores))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|(store_id, rating)| Ok((StoreId::new(store_id), parse_value(rating)?)))
            .collect()
    }

    /// Average and count of the ratings on one store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summary(&self, store_id: StoreId) -> Result<RatingSummary, RepositoryError> {
        let row: SummaryRow = sqlx::query_as(
            "SELECT AVG(rating)::float8 AS average_rating, COUNT(*) AS rating_count \
             FROM ratings WHERE store_id = $1",
        )
        .bind(store_id)
        .fetch_one(self.pool)
        .await?;

        Ok(RatingSummary {
            average_rating: row.average_rating,
            rating_count: row.rating_count,
        })
    }

    /// Every rating on `stores` with the rater, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_stores(
        &self,
        stores: &[StoreId],
    ) -> Result<Vec<RatingWithUser>, RepositoryError> {
        if stores.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<RatingWithUserRow> = sqlx::query_as(
            "SELECT r.id, r.rating, r.store_id, r.created_at, \
                    u.id AS user_id, u.name AS user_name, u.email AS user_email \
             FROM ratings r \
             JOIN users u ON u.id = r.user_id \
             WHERE r.store_id = ANY($1) \
             ORDER BY r.created_at DESC, r.id DESC",
        )
        .bind(ids(stores))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(RatingWithUser::try_from).collect()
    }
}
