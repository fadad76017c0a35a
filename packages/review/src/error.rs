// ABOUTME: Error types for the review package
// ABOUTME: Defines all error variants for meeting, participant, and voting operations

use reqhub_core::ValidationError;
use reqhub_storage::StorageError;
use thiserror::Error;

use crate::types::MeetingStatus;

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Meeting not found: {0}")]
    MeetingNotFound(i64),

    #[error("Requirement not found: {0}")]
    RequirementNotFound(i64),

    #[error("User {user_id} is not an attendee of meeting {meeting_id}")]
    AttendeeNotFound { meeting_id: i64, user_id: i64 },

    #[error("No vote from user {voter_id} on requirement {requirement_id}")]
    VoteNotFound { requirement_id: i64, voter_id: i64 },

    #[error("No archived result for requirement {0}")]
    VoteResultNotFound(i64),

    #[error("User not found: {0}")]
    UserNotFound(i64),

    #[error("Notification not found: {0}")]
    NotificationNotFound(i64),

    #[error("Cannot {action} a meeting that is {from}")]
    InvalidTransition {
        from: MeetingStatus,
        action: &'static str,
    },

    #[error("Meeting is not in progress (status: {0})")]
    MeetingNotInProgress(MeetingStatus),

    #[error("User {0} is not an attendee of this meeting")]
    NotAttendee(i64),

    #[error("User {0} is not an assigned voter for this requirement")]
    NotAssignedVoter(i64),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<ValidationError> for ReviewError {
    fn from(err: ValidationError) -> Self {
        ReviewError::Validation(err.to_string())
    }
}

impl From<sqlx::Error> for ReviewError {
    fn from(err: sqlx::Error) -> Self {
        ReviewError::Storage(StorageError::Sqlx(err))
    }
}

pub type ReviewResult<T> = std::result::Result<T, ReviewError>;
