//! Authentication route handlers: register, login, profile, password change.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};

use super::extract::{ApiJson, ApiResponse, NoData};
use crate::error::Result;
use crate::middleware::{Authorized, auth_rate_limiter, gate};
use crate::models::user::User;
use crate::services::{AccountForm, AuthService};
use crate::state::AppState;

/// Build the auth router, rate limited per client IP when `rate_limit` is set.
pub fn router(rate_limit: bool) -> Router<AppState> {
    let router = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/profile", get(profile))
        .route("/auth/update-password", put(update_password));

    match auth_rate_limiter().filter(|_| rate_limit) {
        Some(limiter) => router.layer(limiter),
        None => router,
    }
}

/// Registration request body. Missing fields are validated as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
}

impl From<RegisterRequest> for AccountForm {
    fn from(req: RegisterRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            password: req.password,
            address: req.address,
        }
    }
}

/// Login request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Password change request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Token and account returned by register and login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub user: User,
}

/// Account wrapper for profile responses.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

/// Register a `user` account and log it in.
async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TokenResponse>>)> {
    let user = AuthService::new(state.pool())
        .register(&body.into())
        .await?;
    let token = state.tokens().issue(user.id)?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(TokenResponse { token, user }),
    ))
}

/// Exchange email and password for a token.
async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>> {
    let user = AuthService::new(state.pool())
        .authenticate(&body.email, &body.password)
        .await?;
    let token = state.tokens().issue(user.id)?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(ApiResponse::ok(TokenResponse { token, user }))
}

/// The caller's own account.
async fn profile(
    auth: Authorized<gate::ViewProfile>,
) -> Result<Json<ApiResponse<UserResponse>>> {
    let user = auth.user;
    Ok(ApiResponse::ok(UserResponse { user }))
}

/// Change the caller's password.
async fn update_password(
    State(state): State<AppState>,
    auth: Authorized<gate::UpdatePassword>,
    ApiJson(body): ApiJson<UpdatePasswordRequest>,
) -> Result<Json<ApiResponse<NoData>>> {
    let user = &auth.user;

    AuthService::new(state.pool())
        .change_password(user.id, &body.current_password, &body.new_password)
        .await?;

    Ok(ApiResponse::message("Password updated successfully"))
}
