//! Access-control gate: bearer token extractors.
//!
//! A request moves through: token present? -> token valid and names an
//! existing account? -> role allowed for the operation? Each step that fails
//! short-circuits with its own error.
//!
//! Handlers take [`Authorized`] with the operation's gate type. It is a
//! parts extractor, so the role check runs before the path and body are
//! parsed.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn list_users(auth: Authorized<gate::ListUsers>) -> Result<Json<Value>> {
//!     let admin = &auth.user;
//!     ...
//! }
//! ```

use std::marker::PhantomData;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::Span;

use store_ratings_core::{Operation, allowed};

use crate::db::UserRepository;
use crate::error::{AppError, set_sentry_user};
use crate::models::user::User;
use crate::services::AuthError;
use crate::state::AppState;

/// Extractor that requires a valid bearer token for an existing account.
pub struct RequireAuth(pub User);

impl RequireAuth {
    /// Check the caller's role against the authorization policy.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` with the operation's denial message.
    pub fn authorize(&self, operation: Operation) -> Result<&User, AppError> {
        if allowed(self.0.role, operation) {
            Ok(&self.0)
        } else {
            tracing::debug!(
                user_id = %self.0.id,
                role = %self.0.role,
                ?operation,
                "Operation denied"
            );
            Err(AppError::Forbidden(operation.denial_message().to_owned()))
        }
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthError::MissingToken)?;
        let user = resolve_caller(state, token).await?;
        Ok(Self(user))
    }
}

/// Operations named at the type level, for [`Authorized`].
pub mod gate {
    use store_ratings_core::Operation;

    /// An operation a handler is gated on.
    pub trait Gate: Send + Sync + 'static {
        const OPERATION: Operation;
    }

    macro_rules! gates {
        ($($name:ident),* $(,)?) => {
            $(
                #[doc = concat!("Gate for `Operation::", stringify!($name), "`.")]
                #[derive(Debug, Clone, Copy)]
                pub struct $name;

                impl Gate for $name {
                    const OPERATION: Operation = Operation::$name;
                }
            )*
        };
    }

    gates!(
        ViewProfile,
        UpdatePassword,
        ListUsers,
        ViewAdminDashboard,
        ViewUser,
        CreateUser,
        UpdateUser,
        DeleteUser,
        ViewOwnerDashboard,
        CreateStore,
        UpdateStore,
        DeleteStore,
        SubmitRating,
        ViewOwnRating,
        DeleteRating,
    );
}

/// Extractor that requires a valid token and a role allowed for `G`.
pub struct Authorized<G> {
    pub user: User,
    gate: PhantomData<fn() -> G>,
}

impl<G: gate::Gate> FromRequestParts<AppState> for Authorized<G> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = RequireAuth::from_request_parts(parts, state).await?;
        auth.authorize(G::OPERATION)?;
        Ok(Self {
            user: auth.0,
            gate: PhantomData,
        })
    }
}

/// Extractor that resolves the caller when possible.
///
/// A missing, malformed or expired token yields `None`; the request goes on
/// anonymously. Only database failures reject.
pub struct OptionalAuth(pub Option<User>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Ok(Self(None));
        };

        match resolve_caller(state, token).await {
            Ok(user) => Ok(Self(Some(user))),
            Err(AuthError::InvalidToken) => Ok(Self(None)),
            Err(other) => Err(other.into()),
        }
    }
}

/// The token from an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then_some(token)
}

/// Verify `token` and load the account it names.
///
/// The signature is checked before any database access.
async fn resolve_caller(state: &AppState, token: &str) -> Result<User, AuthError> {
    let user_id = state.tokens().verify(token)?;

    let user = UserRepository::new(state.pool())
        .get_by_id(user_id)
        .await?
        .ok_or(AuthError::InvalidToken)?;

    Span::current().record("user_id", user.id.as_i32());
    set_sentry_user(&user.id, Some(user.email.as_str()));

    Ok(user)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(authorization: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/auth/profile");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&parts(Some("Bearer abc.def.ghi"))), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&parts(Some("bearer abc"))), Some("abc"));
    }

    #[test]
    fn test_missing_or_empty_token() {
        assert_eq!(bearer_token(&parts(None)), None);
        assert_eq!(bearer_token(&parts(Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts(Some("Basic dXNlcjpwYXNz"))), None);
    }
}
