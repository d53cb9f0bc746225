//! Request extractors and the success envelope shared by all handlers.
//!
//! The `Api*` extractors wrap axum's own and turn their rejections into
//! [`AppError`] so malformed input gets the JSON error body too.

use std::str::FromStr;

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts},
};
use serde::Serialize;

use store_ratings_core::ValidationErrors;

use crate::error::AppError;

/// JSON body extractor with JSON error responses.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path extractor with JSON error responses.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Query string extractor with JSON error responses.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Success body: `{"success": true, "message"?: ..., ...data}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    #[serde(flatten)]
    data: T,
}

/// Payload for responses that only carry a message.
#[derive(Debug, Serialize)]
pub struct NoData {}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: None,
            data,
        })
    }

    pub fn with_message(message: &'static str, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: Some(message),
            data,
        })
    }
}

impl ApiResponse<NoData> {
    pub fn message(message: &'static str) -> Json<Self> {
        Self::with_message(message, NoData {})
    }
}

/// Query parameters arrive as empty strings when a form field is blank;
/// treat those as absent.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse an optional enumerated query parameter, recording a field error for
/// unknown values.
pub fn parse_choice<T: FromStr + Default>(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: Option<String>,
    message: &'static str,
) -> T {
    match non_empty(raw) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            errors.push(field, message);
            T::default()
        }),
        None => T::default(),
    }
}
