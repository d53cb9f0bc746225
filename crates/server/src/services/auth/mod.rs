//! Authentication service: the credential store.
//!
//! Every write runs the same pipeline: validate the fields, hash the
//! password, then persist. Bearer tokens are handled by [`TokenKeys`].

mod error;
mod password;
mod token;

pub use error::AuthError;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenKeys};

use sqlx::PgPool;

use store_ratings_core::{Role, UserId, ValidationErrors, validation};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::{NewUser, User};
use password::verify_dummy;

/// Fields supplied when an account is created.
#[derive(Debug, Clone)]
pub struct AccountForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
}

impl AccountForm {
    /// Check every field and collect all failures.
    ///
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn validate(&self, role: Role) -> Result<NewUser, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check("name", validation::name(&self.name));
        let email = errors.check("email", validation::email(&self.email));
        errors.check("password", validation::password(&self.password));
        errors.check("address", validation::address(&self.address));

        match email {
            Some(email) if errors.is_empty() => Ok(NewUser {
                name: self.name.clone(),
                email,
                address: self.address.clone(),
                role,
            }),
            _ => Err(errors),
        }
    }
}

/// Authentication service.
///
/// Handles registration, login, password changes and admin-created accounts.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Self-registration. The role is always `user`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if any field is invalid.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, form: &AccountForm) -> Result<User, AuthError> {
        let user = self.create(form, Role::User).await?;
        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Admin-created account with an explicit role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if any field is invalid.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn create_user(&self, form: &AccountForm, role: Role) -> Result<User, AuthError> {
        let user = self.create(form, role).await?;
        tracing::info!(user_id = %user.id, role = %role, "User created");
        Ok(user)
    }

    async fn create(&self, form: &AccountForm, role: Role) -> Result<User, AuthError> {
        let new_user = form.validate(role)?;
        let password_hash = hash_password(&form.password)?;

        self.users
            .create(&new_user, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or the
    /// password is wrong.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let found = match validation::email(email) {
            Ok(email) => self.users.get_with_password_hash(&email).await?,
            Err(_) => None,
        };
        let Some((user, password_hash)) = found else {
            verify_dummy(password);
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Change the password of `user_id` after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the new password is too weak.
    /// Returns `AuthError::IncorrectPassword` if `current` does not match.
    /// Returns `AuthError::UserNotFound` if the account no longer exists.
    pub async fn change_password(
        &self,
        user_id: UserId,
        current: &str,
        new: &str,
    ) -> Result<(), AuthError> {
        validation::password(new)
            .map_err(|message| ValidationErrors::single("newPassword", message))?;

        let stored = self
            .users
            .get_password_hash(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(current, &stored)? {
            return Err(AuthError::IncorrectPassword);
        }

        let password_hash = hash_password(new)?;
        if !self.users.update_password(user_id, &password_hash).await? {
            return Err(AuthError::UserNotFound);
        }

        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }
}
