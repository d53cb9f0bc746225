//! Rating routes: submit, read own, delete.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};

use store_ratings_core::{RatingId, RatingValue, StoreId, ValidationErrors};

use super::extract::{ApiJson, ApiPath, ApiResponse, NoData};
use crate::error::Result;
use crate::middleware::{Authorized, gate};
use crate::models::rating::Rating;
use crate::services::{RatingLedger, Submission};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ratings", post(submit))
        .route("/ratings/store/{store_id}", get(own_rating))
        .route("/ratings/{id}", delete(remove))
}

/// Rating submission body. Both fields are checked by [`Self::validate`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRatingRequest {
    pub store_id: Option<StoreId>,
    pub rating: Option<i64>,
}

impl SubmitRatingRequest {
    /// # Errors
    ///
    /// Returns field errors for a missing store id or an out-of-range value.
    pub fn validate(&self) -> std::result::Result<(StoreId, RatingValue), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let store_id = errors.check("storeId", self.store_id.ok_or("Store ID is required"));
        let value = errors.check(
            "rating",
            self.rating
                .and_then(|raw| RatingValue::new(raw).ok())
                .ok_or("Rating must be between 1 and 5"),
        );

        match (store_id, value) {
            (Some(store_id), Some(value)) => Ok((store_id, value)),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub rating: Option<Rating>,
}

/// Create or overwrite the caller's rating: 201 on first submission, 200 on
/// overwrite.
async fn submit(
    State(state): State<AppState>,
    auth: Authorized<gate::SubmitRating>,
    ApiJson(body): ApiJson<SubmitRatingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RatingResponse>>)> {
    let user = &auth.user;
    let (store_id, value) = body.validate()?;

    let submission = RatingLedger::new(state.pool())
        .submit(user.id, store_id, value)
        .await?;

    let (status, message) = match &submission {
        Submission::Created(_) => (StatusCode::CREATED, "Rating submitted successfully"),
        Submission::Updated(_) => (StatusCode::OK, "Rating updated successfully"),
    };
    let rating = Some(submission.rating().clone());

    Ok((status, ApiResponse::with_message(message, RatingResponse { rating })))
}

async fn own_rating(
    State(state): State<AppState>,
    auth: Authorized<gate::ViewOwnRating>,
    ApiPath(store_id): ApiPath<StoreId>,
) -> Result<Json<ApiResponse<RatingResponse>>> {
    let user = &auth.user;

    let rating = RatingLedger::new(state.pool())
        .get_for_user(user.id, store_id)
        .await?;

    Ok(match rating {
        Some(rating) => ApiResponse::ok(RatingResponse {
            rating: Some(rating),
        }),
        None => ApiResponse::with_message("No rating found", RatingResponse { rating: None }),
    })
}

async fn remove(
    State(state): State<AppState>,
    auth: Authorized<gate::DeleteRating>,
    ApiPath(id): ApiPath<RatingId>,
) -> Result<Json<ApiResponse<NoData>>> {
    let user = &auth.user;

    RatingLedger::new(state.pool())
        .delete(id, user.id, user.role)
        .await?;
    Ok(ApiResponse::message("Rating deleted successfully"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_submission() {
        let body = SubmitRatingRequest {
            store_id: Some(StoreId::new(3)),
            rating: Some(5),
        };
        let (store_id, value) = body.validate().unwrap();
        assert_eq!(store_id, StoreId::new(3));
        assert_eq!(value.get(), 5);
    }

    #[test]
    fn test_out_of_range_rating() {
        for raw in [0, 6, -1] {
            let body = SubmitRatingRequest {
                store_id: Some(StoreId::new(3)),
                rating: Some(raw),
            };
            let errors = body.validate().unwrap_err();
            assert_eq!(errors.errors()[0].field, "rating");
            assert_eq!(errors.errors()[0].message, "Rating must be between 1 and 5");
        }
    }

    #[test]
    fn test_missing_fields() {
        let errors = SubmitRatingRequest::default().validate().unwrap_err();
        let fields: Vec<_> = errors.errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, ["storeId", "rating"]);
    }

    #[test]
    fn test_null_rating_serializes() {
        let json = serde_json::to_value(RatingResponse { rating: None }).unwrap();
        assert_eq!(json, serde_json::json!({"rating": null}));
    }
}
