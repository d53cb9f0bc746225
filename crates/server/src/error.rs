//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`. Every error body has the shape
//! `{"success": false, "message": ...}` or, for field validation,
//! `{"success": false, "errors": [{"field", "message"}]}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use store_ratings_core::ValidationErrors;

use crate::db::RepositoryError;
use crate::services::{AuthError, RatingError, StoreError, UserError};

/// Application-level error type for the ratings API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Credential store or token gate failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Account directory operation failed.
    #[error("User error: {0}")]
    Users(#[from] UserError),

    /// Store registry operation failed.
    #[error("Store error: {0}")]
    Stores(#[from] StoreError),

    /// Rating ledger operation failed.
    #[error("Rating error: {0}")]
    Ratings(#[from] RatingError),

    /// Request fields failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Caller's role does not allow the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<ValidationErrors>,
}

/// How an error is presented to the client.
enum Outcome {
    Message(StatusCode, &'static str),
    Invalid(ValidationErrors),
    Detail(StatusCode, String),
    Server,
}

impl AppError {
    fn outcome(&self) -> Outcome {
        use Outcome::{Detail, Invalid, Message, Server};

        match self {
            Self::Database(_) => Server,
            Self::Validation(errors) => Invalid(errors.clone()),
            Self::Forbidden(msg) => Detail(StatusCode::FORBIDDEN, msg.clone()),
            Self::BadRequest(msg) => Detail(StatusCode::BAD_REQUEST, msg.clone()),
            Self::Auth(err) => match err {
                AuthError::Validation(errors) => Invalid(errors.clone()),
                AuthError::InvalidCredentials => {
                    Message(StatusCode::BAD_REQUEST, "Invalid credentials")
                }
                AuthError::IncorrectPassword => {
                    Message(StatusCode::BAD_REQUEST, "Current password is incorrect")
                }
                AuthError::UserAlreadyExists => Message(StatusCode::BAD_REQUEST, "User already exists"),
                AuthError::UserNotFound => Message(StatusCode::NOT_FOUND, "User not found"),
                AuthError::MissingToken => {
                    Message(StatusCode::UNAUTHORIZED, "No token, authorization denied")
                }
                AuthError::InvalidToken => Message(StatusCode::UNAUTHORIZED, "Token is invalid"),
                AuthError::TokenCreation(_) | AuthError::Repository(_) | AuthError::PasswordHash => {
                    Server
                }
            },
            Self::Users(err) => match err {
                UserError::Validation(errors) => Invalid(errors.clone()),
                UserError::NotFound => Message(StatusCode::NOT_FOUND, "User not found"),
                UserError::EmailTaken => Message(StatusCode::BAD_REQUEST, "User already exists"),
                UserError::OwnerHasStores => {
                    Message(StatusCode::BAD_REQUEST, "User still owns stores")
                }
                UserError::Repository(_) => Server,
            },
            Self::Stores(err) => match err {
                StoreError::Validation(errors) => Invalid(errors.clone()),
                StoreError::NotFound => Message(StatusCode::NOT_FOUND, "Store not found"),
                StoreError::EmailTaken => Message(StatusCode::BAD_REQUEST, "Store already exists"),
                StoreError::InvalidOwner => {
                    Message(StatusCode::BAD_REQUEST, "Invalid store owner ID")
                }
                StoreError::Repository(_) => Server,
            },
            Self::Ratings(err) => match err {
                RatingError::StoreNotFound => Message(StatusCode::NOT_FOUND, "Store not found"),
                RatingError::NotFound => Message(StatusCode::NOT_FOUND, "Rating not found"),
                RatingError::Forbidden => {
                    Message(StatusCode::FORBIDDEN, "Not authorized to delete this rating")
                }
                RatingError::Repository(_) => Server,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let outcome = self.outcome();

        // Capture server errors to Sentry
        if matches!(outcome, Outcome::Server) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let (status, message, errors) = match outcome {
            Outcome::Message(status, msg) => (status, Some(msg.to_owned()), None),
            Outcome::Detail(status, msg) => (status, Some(msg), None),
            Outcome::Invalid(errors) => (StatusCode::BAD_REQUEST, None, Some(errors)),
            // Don't expose internal error details to clients
            Outcome::Server => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Some("Server error".to_owned()),
                None,
            ),
        };

        let body = ErrorBody {
            success: false,
            message,
            errors,
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the authenticated caller.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::Forbidden("Admin access required".to_string());
        assert_eq!(err.to_string(), "Forbidden: Admin access required");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: impl Into<AppError>) -> StatusCode {
            err.into().into_response().status()
        }

        assert_eq!(get_status(AuthError::MissingToken), StatusCode::UNAUTHORIZED);
        assert_eq!(get_status(AuthError::InvalidToken), StatusCode::UNAUTHORIZED);
        assert_eq!(
            get_status(AuthError::InvalidCredentials),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(get_status(UserError::EmailTaken), StatusCode::BAD_REQUEST);
        assert_eq!(get_status(StoreError::InvalidOwner), StatusCode::BAD_REQUEST);
        assert_eq!(get_status(RatingError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(get_status(RatingError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            get_status(AppError::Forbidden("Admin access required".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(RepositoryError::DataCorruption("bad role".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_message_body() {
        let body = body_json(AppError::from(StoreError::NotFound).into_response()).await;
        assert_eq!(
            body,
            serde_json::json!({"success": false, "message": "Store not found"})
        );
    }

    #[tokio::test]
    async fn test_validation_body_lists_fields() {
        let errors = ValidationErrors::single("name", "Name must be between 20 and 60 characters");
        let response = AppError::from(AuthError::from(errors)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert!(body.get("message").is_none());
        assert_eq!(body["errors"][0]["field"], "name");
    }

    #[tokio::test]
    async fn test_internal_detail_is_hidden() {
        let err = RepositoryError::DataCorruption("invalid email in users row 17".to_string());
        let response = AppError::from(err).into_response();
        let body = body_json(response).await;
        assert_eq!(body["message"], "Server error");
    }
}
