//! Store routes: public browsing, admin management, owner dashboard.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};

use store_ratings_core::{StoreId, UserId, ValidationErrors};

use super::extract::{ApiJson, ApiPath, ApiQuery, ApiResponse, NoData, non_empty, parse_choice};
use crate::error::Result;
use crate::middleware::{Authorized, OptionalAuth, gate};
use crate::models::store::{OwnerDashboard, Store, StoreDetail, StoreFilter, StoreListing};
use crate::services::{StoreForm, StoreRegistry, StoreUpdateForm};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stores", get(list).post(create))
        .route("/stores/owner/dashboard", get(owner_dashboard))
        .route("/stores/{id}", get(detail).put(update).delete(remove))
}

/// Store browsing query string.
#[derive(Debug, Default, Deserialize)]
pub struct StoreListQuery {
    pub name: Option<String>,
    pub address: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl StoreListQuery {
    /// Turn the raw query into a filter.
    ///
    /// # Errors
    ///
    /// Returns field errors for an unknown sort key or order.
    pub fn into_filter(self) -> std::result::Result<StoreFilter, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let sort = parse_choice(
            &mut errors,
            "sort",
            self.sort,
            "Sort must be one of name, email, address, averageRating",
        );
        let order = parse_choice(&mut errors, "order", self.order, "Order must be asc or desc");
        errors.into_result()?;

        Ok(StoreFilter {
            name: non_empty(self.name),
            address: non_empty(self.address),
            sort,
            order,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateStoreRequest {
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: Option<UserId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStoreRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub owner_id: Option<UserId>,
}

#[derive(Debug, Serialize)]
pub struct StoreListResponse {
    pub count: usize,
    pub stores: Vec<StoreListing>,
}

#[derive(Debug, Serialize)]
pub struct StoreResponse<T> {
    pub store: T,
}

/// Browse stores. Authenticated `user` callers see their own ratings.
async fn list(
    State(state): State<AppState>,
    OptionalAuth(caller): OptionalAuth,
    ApiQuery(query): ApiQuery<StoreListQuery>,
) -> Result<Json<ApiResponse<StoreListResponse>>> {
    let filter = query.into_filter()?;

    let stores = StoreRegistry::new(state.pool())
        .list(&filter, caller.as_ref())
        .await?;
    Ok(ApiResponse::ok(StoreListResponse {
        count: stores.len(),
        stores,
    }))
}

async fn detail(
    State(state): State<AppState>,
    OptionalAuth(caller): OptionalAuth,
    ApiPath(id): ApiPath<StoreId>,
) -> Result<Json<ApiResponse<StoreResponse<StoreDetail>>>> {
    let store = StoreRegistry::new(state.pool())
        .detail(id, caller.as_ref())
        .await?;
    Ok(ApiResponse::ok(StoreResponse { store }))
}

async fn owner_dashboard(
    State(state): State<AppState>,
    auth: Authorized<gate::ViewOwnerDashboard>,
) -> Result<Json<ApiResponse<OwnerDashboard>>> {
    let owner = &auth.user;

    let dashboard = StoreRegistry::new(state.pool())
        .owner_dashboard(owner.id)
        .await?;
    Ok(ApiResponse::ok(dashboard))
}

async fn create(
    State(state): State<AppState>,
    _auth: Authorized<gate::CreateStore>,
    ApiJson(body): ApiJson<CreateStoreRequest>,
) -> Result<(StatusCode, Json<ApiResponse<StoreResponse<Store>>>)> {
    let form = StoreForm {
        name: body.name,
        email: body.email,
        address: body.address,
        owner_id: body.owner_id,
    };
    let store = StoreRegistry::new(state.pool()).create(&form).await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("Store created successfully", StoreResponse { store }),
    ))
}

async fn update(
    State(state): State<AppState>,
    _auth: Authorized<gate::UpdateStore>,
    ApiPath(id): ApiPath<StoreId>,
    ApiJson(body): ApiJson<UpdateStoreRequest>,
) -> Result<Json<ApiResponse<StoreResponse<Store>>>> {
    let form = StoreUpdateForm {
        name: body.name,
        email: body.email,
        address: body.address,
        owner_id: body.owner_id,
    };
    let store = StoreRegistry::new(state.pool()).update(id, &form).await?;

    Ok(ApiResponse::with_message(
        "Store updated successfully",
        StoreResponse { store },
    ))
}

async fn remove(
    State(state): State<AppState>,
    _auth: Authorized<gate::DeleteStore>,
    ApiPath(id): ApiPath<StoreId>,
) -> Result<Json<ApiResponse<NoData>>> {
    StoreRegistry::new(state.pool()).delete(id).await?;
    Ok(ApiResponse::message("Store deleted successfully"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::SortOrder;
    use crate::models::store::StoreSort;

    #[test]
    fn test_sort_by_average_rating() {
        let query = StoreListQuery {
            name: Some("Sample".to_owned()),
            sort: Some("averageRating".to_owned()),
            order: Some("desc".to_owned()),
            ..StoreListQuery::default()
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.name.as_deref(), Some("Sample"));
        assert_eq!(filter.sort, StoreSort::AverageRating);
        assert_eq!(filter.order, SortOrder::Desc);
    }

    #[test]
    fn test_unknown_sort_is_rejected() {
        let query = StoreListQuery {
            sort: Some("owner".to_owned()),
            ..StoreListQuery::default()
        };
        let errors = query.into_filter().unwrap_err();
        assert_eq!(errors.errors()[0].field, "sort");
    }

    #[test]
    fn test_create_body_reads_camel_case_owner() {
        let body: CreateStoreRequest = serde_json::from_value(serde_json::json!({
            "name": "First Sample Store Name Here",
            "email": "store1@example.com",
            "address": "123 Market Street",
            "ownerId": 2
        }))
        .unwrap();
        assert_eq!(body.owner_id, Some(UserId::new(2)));

        let empty: CreateStoreRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(empty.owner_id.is_none());
        assert!(empty.name.is_empty());
    }
}
