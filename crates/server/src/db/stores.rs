//! Store repository for database operations.
//!
//! Listing queries join the owner and aggregate the store's ratings in SQL,
//! so a page of stores is one round trip.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use store_ratings_core::{Email, RatingSummary, Role, StoreId, UserId};

use super::{RepositoryError, contains_pattern};
use crate::models::store::{NewStore, Store, StoreChanges, StoreFilter, StoreListing};
use crate::models::user::UserSummary;

const STORE_COLUMNS: &str = "id, name, email, address, owner_id, created_at, updated_at";

const LISTING_SELECT: &str = "\
    SELECT s.id, s.name, s.email, s.address, s.owner_id, s.created_at, s.updated_at, \
           o.name AS owner_name, o.email AS owner_email, \
           AVG(r.rating)::float8 AS average_rating, \
           COUNT(r.id) AS rating_count \
    FROM stores s \
    JOIN users o ON o.id = s.owner_id \
    LEFT JOIN ratings r ON r.store_id = s.id";

const LISTING_GROUP: &str = "GROUP BY s.id, o.id";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    id: i32,
    name: String,
    email: String,
    address: String,
    owner_id: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StoreRow> for Store {
    type Error = RepositoryError;

    fn try_from(row: StoreRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: StoreId::new(row.id),
            name: row.name,
            email: parse_email(&row.email)?,
            address: row.address,
            owner_id: UserId::new(row.owner_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StoreListingRow {
    #[sqlx(flatten)]
    store: StoreRow,
    owner_name: String,
    owner_email: String,
    average_rating: Option<f64>,
    rating_count: i64,
}

impl TryFrom<StoreListingRow> for StoreListing {
    type Error = RepositoryError;

    fn try_from(row: StoreListingRow) -> Result<Self, Self::Error> {
        let owner = UserSummary {
            id: UserId::new(row.store.owner_id),
            name: row.owner_name,
            email: parse_email(&row.owner_email)?,
        };

        Ok(Self {
            store: Store::try_from(row.store)?,
            owner,
            summary: RatingSummary {
                average_rating: row.average_rating,
                rating_count: row.rating_count,
            },
            user_rating: None,
        })
    }
}

fn parse_email(raw: &str) -> Result<Email, RepositoryError> {
    Email::parse(raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid email in database: {e}")))
}

/// Repository for store database operations.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a store.
    ///
    /// The owner row is share-locked until the insert commits, so a concurrent
    /// role change cannot demote the owner in between.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the owner is missing or
    /// not a store owner.
    /// Returns `RepositoryError::Conflict` if the store email already exists.
    pub async fn create(&self, store: &NewStore) -> Result<Store, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let role: Option<Role> =
            sqlx::query_scalar("SELECT role FROM users WHERE id = $1 FOR SHARE")
                .bind(store.owner_id)
                .fetch_optional(&mut *tx)
                .await?;
        if role != Some(Role::StoreOwner) {
            return Err(RepositoryError::InvalidReference("owner".to_owned()));
        }

        let sql = format!(
            "INSERT INTO stores (name, email, address, owner_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {STORE_COLUMNS}"
        );
        let row: StoreRow = sqlx::query_as(&sql)
            .bind(&store.name)
            .bind(&store.email)
            .bind(&store.address)
            .bind(store.owner_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_constraint(e, "email"))?;

        tx.commit().await?;

        row.try_into()
    }

    /// Get a store by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let sql = format!("SELECT {STORE_COLUMNS} FROM stores WHERE id = $1");
        let row: Option<StoreRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(Store::try_from).transpose()
    }

    /// Get a store by its email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Store>, RepositoryError> {
        let sql = format!("SELECT {STORE_COLUMNS} FROM stores WHERE email = $1");
        let row: Option<StoreRow> = sqlx::query_as(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        row.map(Store::try_from).transpose()
    }

    /// Apply a partial update. A new owner must be a `store_owner` account.
    ///
    /// Returns `None` if the store does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the new owner is invalid.
    /// Returns `RepositoryError::Conflict` if the new email already exists.
    pub async fn update(
        &self,
        id: StoreId,
        changes: &StoreChanges,
    ) -> Result<Option<Store>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i32> = sqlx::query_scalar("SELECT id FROM stores WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Ok(None);
        }

        if let Some(owner_id) = changes.owner_id {
            let role: Option<Role> =
                sqlx::query_scalar("SELECT role FROM users WHERE id = $1 FOR SHARE")
                    .bind(owner_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if role != Some(Role::StoreOwner) {
                return Err(RepositoryError::InvalidReference("owner".to_owned()));
            }
        }

        let sql = format!(
            "UPDATE stores SET \
                 name = COALESCE($2, name), \
                 email = COALESCE($3, email), \
                 address = COALESCE($4, address), \
                 owner_id = COALESCE($5, owner_id), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {STORE_COLUMNS}"
        );
        let row: StoreRow = sqlx::query_as(&sql)
            .bind(id)
            .bind(changes.name.as_deref())
            .bind(changes.email.as_ref())
            .bind(changes.address.as_deref())
            .bind(changes.owner_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_constraint(e, "email"))?;

        tx.commit().await?;

        Store::try_from(row).map(Some)
    }

    /// Delete a store. Its ratings are removed by the database in the same
    /// statement.
    ///
    /// Returns `false` if the store does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: StoreId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM stores WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List stores with owner and aggregates, filtered and sorted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &StoreFilter) -> Result<Vec<StoreListing>, RepositoryError> {
        let sql = format!(
            "{LISTING_SELECT} \
             WHERE ($1::text IS NULL OR s.name ILIKE $1) \
               AND ($2::text IS NULL OR s.address ILIKE $2) \
             {LISTING_GROUP} \
             ORDER BY {} {} NULLS LAST, s.id ASC",
            filter.sort.column(),
            filter.order.sql()
        );

        let rows: Vec<StoreListingRow> = sqlx::query_as(&sql)
            .bind(filter.name.as_deref().map(contains_pattern))
            .bind(filter.address.as_deref().map(contains_pattern))
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(StoreListing::try_from).collect()
    }

    /// One store with owner and aggregates.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn listing(&self, id: StoreId) -> Result<Option<StoreListing>, RepositoryError> {
        let sql = format!("{LISTING_SELECT} WHERE s.id = $1 {LISTING_GROUP}");
        let row: Option<StoreListingRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(StoreListing::try_from).transpose()
    }

    /// Every store owned by `owner_id`, with aggregates, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_owner(
        &self,
        owner_id: UserId,
    ) -> Result<Vec<StoreListing>, RepositoryError> {
        let sql = format!(
            "{LISTING_SELECT} WHERE s.owner_id = $1 {LISTING_GROUP} ORDER BY s.name ASC, s.id ASC"
        );
        let rows: Vec<StoreListingRow> = sqlx::query_as(&sql)
            .bind(owner_id)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(StoreListing::try_from).collect()
    }
}
