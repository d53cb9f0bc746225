//! Admin account directory routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};

use store_ratings_core::{Role, UserId, ValidationErrors};

use super::extract::{ApiJson, ApiPath, ApiQuery, ApiResponse, NoData, non_empty, parse_choice};
use crate::error::Result;
use crate::middleware::{Authorized, gate};
use crate::models::user::{DashboardCounts, User, UserDetail, UserFilter};
use crate::services::{AccountForm, AuthService, UserService, UserUpdateForm};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list).post(create))
        .route("/users/dashboard", get(dashboard))
        .route("/users/{id}", get(detail).put(update).delete(remove))
}

/// Directory query string. Every value is optional.
#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl UserListQuery {
    /// Turn the raw query into a filter.
    ///
    /// # Errors
    ///
    /// Returns field errors for an unknown role, sort key or order.
    pub fn into_filter(self) -> std::result::Result<UserFilter, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let role = match non_empty(self.role).map(|raw| raw.parse::<Role>()) {
            Some(Ok(role)) => Some(role),
            Some(Err(e)) => {
                errors.push("role", e.to_string());
                None
            }
            None => None,
        };
        let sort = parse_choice(
            &mut errors,
            "sort",
            self.sort,
            "Sort must be one of name, email, address, role",
        );
        let order = parse_choice(&mut errors, "order", self.order, "Order must be asc or desc");
        errors.into_result()?;

        Ok(UserFilter {
            name: non_empty(self.name),
            email: non_empty(self.email),
            address: non_empty(self.address),
            role,
            sort,
            order,
        })
    }
}

/// Admin account creation body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
    pub role: String,
}

/// Partial account edit body.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub count: usize,
    pub users: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse<T> {
    pub user: T,
}

async fn list(
    State(state): State<AppState>,
    _auth: Authorized<gate::ListUsers>,
    ApiQuery(query): ApiQuery<UserListQuery>,
) -> Result<Json<ApiResponse<UserListResponse>>> {
    let filter = query.into_filter()?;

    let users = UserService::new(state.pool()).list(&filter).await?;
    Ok(ApiResponse::ok(UserListResponse {
        count: users.len(),
        users,
    }))
}

async fn dashboard(
    State(state): State<AppState>,
    _auth: Authorized<gate::ViewAdminDashboard>,
) -> Result<Json<ApiResponse<DashboardCounts>>> {
    let counts = UserService::new(state.pool()).dashboard().await?;
    Ok(ApiResponse::ok(counts))
}

async fn detail(
    State(state): State<AppState>,
    _auth: Authorized<gate::ViewUser>,
    ApiPath(id): ApiPath<UserId>,
) -> Result<Json<ApiResponse<UserResponse<UserDetail>>>> {
    let user = UserService::new(state.pool()).detail(id).await?;
    Ok(ApiResponse::ok(UserResponse { user }))
}

/// Create an account with any role. The role is checked alongside the other
/// fields so every failure is reported at once.
async fn create(
    State(state): State<AppState>,
    _auth: Authorized<gate::CreateUser>,
    ApiJson(body): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse<User>>>)> {
    let role = body.role.parse::<Role>();
    let form = AccountForm {
        name: body.name,
        email: body.email,
        password: body.password,
        address: body.address,
    };

    let role = match role {
        Ok(role) => role,
        Err(e) => {
            let mut errors = form.validate(Role::User).err().unwrap_or_default();
            errors.push("role", e.to_string());
            return Err(errors.into());
        }
    };

    let user = AuthService::new(state.pool())
        .create_user(&form, role)
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("User created successfully", UserResponse { user }),
    ))
}

async fn update(
    State(state): State<AppState>,
    _auth: Authorized<gate::UpdateUser>,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(body): ApiJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse<User>>>> {
    let form = UserUpdateForm {
        name: body.name,
        email: body.email,
        address: body.address,
        role: body.role,
    };
    let user = UserService::new(state.pool()).update(id, &form).await?;

    Ok(ApiResponse::with_message(
        "User updated successfully",
        UserResponse { user },
    ))
}

async fn remove(
    State(state): State<AppState>,
    _auth: Authorized<gate::DeleteUser>,
    ApiPath(id): ApiPath<UserId>,
) -> Result<Json<ApiResponse<NoData>>> {
    UserService::new(state.pool()).delete(id).await?;
    Ok(ApiResponse::message("User deleted successfully"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::SortOrder;
    use crate::models::user::UserSort;

    #[test]
    fn test_empty_query_uses_defaults() {
        let filter = UserListQuery::default().into_filter().unwrap();
        assert_eq!(filter.sort, UserSort::Name);
        assert_eq!(filter.order, SortOrder::Asc);
        assert!(filter.role.is_none());
    }

    #[test]
    fn test_query_parses_role_and_sort() {
        let query = UserListQuery {
            name: Some(String::new()),
            role: Some("store_owner".to_owned()),
            sort: Some("email".to_owned()),
            order: Some("DESC".to_owned()),
            ..UserListQuery::default()
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.role, Some(Role::StoreOwner));
        assert_eq!(filter.sort, UserSort::Email);
        assert_eq!(filter.order, SortOrder::Desc);
        assert!(filter.name.is_none());
    }

    #[test]
    fn test_query_reports_every_bad_value() {
        let query = UserListQuery {
            role: Some("superuser".to_owned()),
            sort: Some("password".to_owned()),
            order: Some("sideways".to_owned()),
            ..UserListQuery::default()
        };
        let errors = query.into_filter().unwrap_err();
        let fields: Vec<_> = errors.errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, ["role", "sort", "order"]);
    }
}
