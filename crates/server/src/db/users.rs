//! Account repository for database operations.
//!
//! Password hashes are read and written here but never placed on a [`User`].

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use store_ratings_core::{Email, Role, UserId};

use super::{RepositoryError, contains_pattern};
use crate::models::user::{DashboardCounts, NewUser, User, UserChanges, UserFilter};

const USER_COLUMNS: &str = "id, name, email, address, role, created_at, updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` account queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    name: String,
    email: String,
    address: String,
    role: Role,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            name: row.name,
            email,
            address: row.address,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Account row together with its password hash.
#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

#[derive(Debug, sqlx::FromRow)]
struct CountsRow {
    total_users: i64,
    total_stores: i64,
    total_ratings: i64,
}

/// Repository for account database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an account by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the email in the database is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    /// Get an account by its email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    /// Get an account and its password hash by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1");
        let row: Option<CredentialRow> = sqlx::query_as(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        row.map(|r| Ok((User::try_from(r.user)?, r.password_hash)))
            .transpose()
    }

    /// Get the password hash of an account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(&self, id: UserId) -> Result<Option<String>, RepositoryError> {
        let hash: Option<String> = sqlx::query_scalar("SELECT password_hash FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(hash)
    }

    /// Insert an account with an already hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        user: &NewUser,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let sql = format!(
            "INSERT INTO users (name, email, password_hash, address, role) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        );
        let row: UserRow = sqlx::query_as(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(password_hash)
            .bind(&user.address)
            .bind(user.role)
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::from_constraint(e, "email"))?;

        User::try_from(row)
    }

    /// Replace the password hash of an account.
    ///
    /// Returns `false` if the account does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List accounts matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, RepositoryError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE ($1::text IS NULL OR name ILIKE $1) \
               AND ($2::text IS NULL OR email ILIKE $2) \
               AND ($3::text IS NULL OR address ILIKE $3) \
               AND ($4::user_role IS NULL OR role = $4) \
             ORDER BY {} {}, id ASC",
            filter.sort.column(),
            filter.order.sql()
        );

        let rows: Vec<UserRow> = sqlx::query_as(&sql)
            .bind(filter.name.as_deref().map(contains_pattern))
            .bind(filter.email.as_deref().map(contains_pattern))
            .bind(filter.address.as_deref().map(contains_pattern))
            .bind(filter.role)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    /// Apply a partial update.
    ///
    /// The account row is locked for the duration of the update. A role change
    /// away from `store_owner` is refused while the account still owns stores.
    ///
    /// Returns `None` if the account does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new email already exists.
    /// Returns `RepositoryError::Referenced` if the role change is refused.
    pub async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<Role> =
            sqlx::query_scalar("SELECT role FROM users WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(current) = current else {
            return Ok(None);
        };

        let leaves_owner_role = current == Role::StoreOwner
            && changes.role.is_some_and(|role| role != Role::StoreOwner);
        if leaves_owner_role {
            let owns_stores: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM stores WHERE owner_id = $1)")
                    .bind(id)
                    .fetch_one(&mut *tx)
                    .await?;
            if owns_stores {
                return Err(RepositoryError::Referenced("stores".to_owned()));
            }
        }

        let sql = format!(
            "UPDATE users SET \
                 name = COALESCE($2, name), \
                 email = COALESCE($3, email), \
                 address = COALESCE($4, address), \
                 role = COALESCE($5, role), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        let row: UserRow = sqlx::query_as(&sql)
            .bind(id)
            .bind(changes.name.as_deref())
            .bind(changes.email.as_ref())
            .bind(changes.address.as_deref())
            .bind(changes.role)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_constraint(e, "email"))?;

        tx.commit().await?;

        User::try_from(row).map(Some)
    }

    /// Delete an account. Its ratings are removed by the database in the same
    /// statement.
    ///
    /// Returns `false` if the account does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Referenced` if the account still owns stores.
    pub async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::from_constraint(e, "stores"))?;

        Ok(result.rows_affected() > 0)
    }

    /// Count accounts, stores and ratings in one round trip.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn dashboard_counts(&self) -> Result<DashboardCounts, RepositoryError> {
        let row: CountsRow = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM users) AS total_users, \
                    (SELECT COUNT(*) FROM stores) AS total_stores, \
                    (SELECT COUNT(*) FROM ratings) AS total_ratings",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(DashboardCounts {
            total_users: row.total_users,
            total_stores: row.total_stores,
            total_ratings: row.total_ratings,
        })
    }
}
