// ABOUTME: HTTP error mapping for the review API
// ABOUTME: Translates domain errors into status codes and sanitised envelope messages

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use thiserror::Error;
use tracing::error;

use reqhub_review::ReviewError;
use reqhub_storage::StorageError;

use crate::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Review(#[from] ReviewError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Review(err) => match err {
                ReviewError::MeetingNotFound(_)
                | ReviewError::RequirementNotFound(_)
                | ReviewError::AttendeeNotFound { .. }
                | ReviewError::VoteNotFound { .. }
                | ReviewError::VoteResultNotFound(_)
                | ReviewError::UserNotFound(_)
                | ReviewError::NotificationNotFound(_)
                | ReviewError::Storage(StorageError::NotFound) => StatusCode::NOT_FOUND,
                ReviewError::MeetingNotInProgress(_)
                | ReviewError::NotAttendee(_)
                | ReviewError::NotAssignedVoter(_) => StatusCode::FORBIDDEN,
                ReviewError::Conflict(_) => StatusCode::CONFLICT,
                ReviewError::InvalidTransition { .. } | ReviewError::Validation(_) => {
                    StatusCode::BAD_REQUEST
                }
                ReviewError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, ResponseJson(ApiResponse::<()>::error(message))).into_response()
    }
}
