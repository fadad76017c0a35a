// ABOUTME: Shared API response types
// ABOUTME: Provides the {success, data, message} envelope used by every endpoint

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use serde::Serialize;

use reqhub_review::ReviewResult;

use crate::error::ApiError;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }

    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message: Some(message),
        }
    }
}

/// 200 with the value, or the mapped error
pub fn ok_or_error<T: Serialize>(result: ReviewResult<T>) -> Response {
    respond(StatusCode::OK, result)
}

/// 201 with the value, or the mapped error
pub fn created_or_error<T: Serialize>(result: ReviewResult<T>) -> Response {
    respond(StatusCode::CREATED, result)
}

/// 200 with an empty payload and a message, or the mapped error
pub fn done_or_error(result: ReviewResult<()>, message: &str) -> Response {
    match result {
        Ok(()) => (
            StatusCode::OK,
            ResponseJson(ApiResponse::<()>::success_with_message((), message)),
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

fn respond<T: Serialize>(status: StatusCode, result: ReviewResult<T>) -> Response {
    match result {
        Ok(data) => (status, ResponseJson(ApiResponse::success(data))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
