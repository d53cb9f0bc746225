//! Seed the database with sample owners, users, stores and ratings.
//!
//! Seeding is idempotent: accounts and stores whose email already exists are
//! reused, and ratings are upserted, so running it twice changes nothing.
//! Sample passwords are `Owner@123` for owners and `User@123` for users.

use sqlx::PgPool;
use tracing::info;

use store_ratings_core::{Email, RatingValue, Role, StoreId, UserId};
use store_ratings_server::db::{RatingRepository, StoreRepository, UserRepository};
use store_ratings_server::services::{AccountForm, AuthService, StoreForm, StoreRegistry};

struct SampleAccount {
    name: &'static str,
    email: &'static str,
    password: &'static str,
    address: &'static str,
    role: Role,
}

struct SampleStore {
    name: &'static str,
    email: &'static str,
    address: &'static str,
    /// Index into [`ACCOUNTS`].
    owner: usize,
}

const ACCOUNTS: [SampleAccount; 4] = [
    SampleAccount {
        name: "Store Owner One Sample Name Here",
        email: "owner1@example.com",
        password: "Owner@123",
        address: "123 Store Street, City",
        role: Role::StoreOwner,
    },
    SampleAccount {
        name: "Store Owner Two Sample Name Here",
        email: "owner2@example.com",
        password: "Owner@123",
        address: "456 Shop Avenue, Town",
        role: Role::StoreOwner,
    },
    SampleAccount {
        name: "Normal User One Sample Name Here",
        email: "user1@example.com",
        password: "User@123",
        address: "789 User Lane, Village",
        role: Role::User,
    },
    SampleAccount {
        name: "Normal User Two Sample Name Here",
        email: "user2@example.com",
        password: "User@123",
        address: "101 Customer Road, County",
        role: Role::User,
    },
];

const STORES: [SampleStore; 3] = [
    SampleStore {
        name: "First Sample Store Name Here",
        email: "store1@example.com",
        address: "111 Retail Plaza, Shopping District",
        owner: 0,
    },
    SampleStore {
        name: "Second Sample Store Name Here",
        email: "store2@example.com",
        address: "222 Market Street, Downtown",
        owner: 1,
    },
    SampleStore {
        name: "Third Sample Store Name Here",
        email: "store3@example.com",
        address: "333 Commerce Boulevard, Uptown",
        owner: 0,
    },
];

/// (account index, store index, stars)
const RATINGS: [(usize, usize, i64); 4] = [(2, 0, 4), (2, 1, 5), (3, 0, 3), (3, 2, 2)];

/// Insert the sample data set.
///
/// # Errors
///
/// Returns an error if the connection or any insert fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    let mut account_ids = Vec::with_capacity(ACCOUNTS.len());
    for account in &ACCOUNTS {
        account_ids.push(ensure_account(&pool, account).await?);
    }

    let mut store_ids = Vec::with_capacity(STORES.len());
    for store in &STORES {
        let owner_id = *account_ids
            .get(store.owner)
            .ok_or("sample store owner index out of range")?;
        store_ids.push(ensure_store(&pool, store, owner_id).await?);
    }

    let ratings = RatingRepository::new(&pool);
    for (account, store, stars) in RATINGS {
        let (Some(&user_id), Some(&store_id)) = (account_ids.get(account), store_ids.get(store))
        else {
            return Err("sample rating index out of range".into());
        };
        ratings
            .upsert(user_id, store_id, RatingValue::new(stars)?)
            .await?;
    }

    info!("Seeding complete!");
    info!("  Accounts: {}", account_ids.len());
    info!("  Stores: {}", store_ids.len());
    info!("  Ratings: {}", RATINGS.len());
    Ok(())
}

async fn ensure_account(
    pool: &PgPool,
    account: &SampleAccount,
) -> Result<UserId, Box<dyn std::error::Error>> {
    let email = Email::parse(account.email)?;
    if let Some(existing) = UserRepository::new(pool).get_by_email(&email).await? {
        info!(email = account.email, "Account exists, skipping");
        return Ok(existing.id);
    }

    let form = AccountForm {
        name: account.name.to_owned(),
        email: account.email.to_owned(),
        password: account.password.to_owned(),
        address: account.address.to_owned(),
    };
    let user = AuthService::new(pool)
        .create_user(&form, account.role)
        .await?;
    Ok(user.id)
}

async fn ensure_store(
    pool: &PgPool,
    store: &SampleStore,
    owner_id: UserId,
) -> Result<StoreId, Box<dyn std::error::Error>> {
    let email = Email::parse(store.email)?;
    if let Some(existing) = StoreRepository::new(pool).get_by_email(&email).await? {
        info!(email = store.email, "Store exists, skipping");
        return Ok(existing.id);
    }

    let form = StoreForm {
        name: store.name.to_owned(),
        email: store.email.to_owned(),
        address: store.address.to_owned(),
        owner_id: Some(owner_id),
    };
    let created = StoreRegistry::new(pool).create(&form).await?;
    Ok(created.id)
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_accounts_pass_validation() {
        for account in &ACCOUNTS {
            let form = AccountForm {
                name: account.name.to_owned(),
                email: account.email.to_owned(),
                password: account.password.to_owned(),
                address: account.address.to_owned(),
            };
            assert!(form.validate(account.role).is_ok(), "{}", account.email);
        }
    }

    #[test]
    fn test_sample_stores_pass_validation() {
        for store in &STORES {
            let form = StoreForm {
                name: store.name.to_owned(),
                email: store.email.to_owned(),
                address: store.address.to_owned(),
                owner_id: Some(UserId::new(1)),
            };
            assert!(form.validate().is_ok(), "{}", store.email);
            assert_eq!(ACCOUNTS[store.owner].role, Role::StoreOwner);
        }
    }

    #[test]
    fn test_sample_ratings_are_by_users_in_range() {
        for (account, store, stars) in RATINGS {
            assert_eq!(ACCOUNTS[account].role, Role::User);
            assert!(store < STORES.len());
            assert!(RatingValue::new(stars).is_ok());
        }
    }
}
