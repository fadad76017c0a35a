// ABOUTME: HTTP request handlers for review meetings
// ABOUTME: Meeting CRUD, lifecycle transitions, attendees, and agenda items

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;

use reqhub_review::{
    AttendanceStatus, MeetingCreateInput, MeetingFilter, MeetingRequirementInput,
    MeetingRequirementUpdateInput, MeetingStatus, MeetingUpdateInput,
};

use crate::auth::CurrentUser;
use crate::pagination::{default_limit, default_page, PaginatedResponse, PaginationParams};
use crate::response::{created_or_error, done_or_error, ok_or_error};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListMeetingsQuery {
    pub status: Option<MeetingStatus>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

/// List the tenant's meetings, newest first
pub async fn list_meetings(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListMeetingsQuery>,
) -> impl IntoResponse {
    info!(
        "Listing meetings for tenant {} (status: {:?})",
        user.tenant_id, query.status
    );

    let params = PaginationParams::new(query.page, query.limit);
    let filter = MeetingFilter {
        status: query.status,
        limit: Some(params.limit),
        offset: Some(params.offset()),
    };

    let result = state
        .review
        .list_meetings(user.tenant_id, &filter)
        .await
        .map(|(meetings, total)| PaginatedResponse::new(meetings, &params, total));
    ok_or_error(result)
}

/// Create a scheduled meeting
pub async fn create_meeting(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<MeetingCreateInput>,
) -> impl IntoResponse {
    info!("Creating meeting: {}", request.title);

    created_or_error(
        state
            .review
            .create_meeting(user.tenant_id, user.user_id, request)
            .await,
    )
}

/// Get a meeting with its attendees and agenda
pub async fn get_meeting(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(meeting_id): Path<i64>,
) -> impl IntoResponse {
    info!("Getting meeting: {}", meeting_id);

    ok_or_error(
        state
            .review
            .get_meeting_detail(user.tenant_id, meeting_id)
            .await,
    )
}

pub async fn update_meeting(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(meeting_id): Path<i64>,
    Json(request): Json<MeetingUpdateInput>,
) -> impl IntoResponse {
    info!("Updating meeting: {}", meeting_id);

    ok_or_error(
        state
            .review
            .update_meeting(user.tenant_id, meeting_id, request)
            .await,
    )
}

pub async fn delete_meeting(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(meeting_id): Path<i64>,
) -> impl IntoResponse {
    info!("Deleting meeting: {}", meeting_id);

    done_or_error(
        state.review.delete_meeting(user.tenant_id, meeting_id).await,
        "Meeting deleted",
    )
}

pub async fn start_meeting(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(meeting_id): Path<i64>,
) -> impl IntoResponse {
    info!("User {} starting meeting {}", user.user_id, meeting_id);

    ok_or_error(state.review.start_meeting(user.tenant_id, meeting_id).await)
}

/// End the meeting and archive its results
pub async fn end_meeting(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(meeting_id): Path<i64>,
) -> impl IntoResponse {
    info!("User {} ending meeting {}", user.user_id, meeting_id);

    ok_or_error(state.review.end_meeting(user.tenant_id, meeting_id).await)
}

pub async fn cancel_meeting(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(meeting_id): Path<i64>,
) -> impl IntoResponse {
    info!("User {} cancelling meeting {}", user.user_id, meeting_id);

    ok_or_error(state.review.cancel_meeting(user.tenant_id, meeting_id).await)
}

// Attendees

/// Request body for adding an attendee
#[derive(Debug, Deserialize)]
pub struct AddAttendeeRequest {
    pub user_id: i64,
    pub attendance_status: Option<AttendanceStatus>,
}

/// Request body for updating attendance
#[derive(Debug, Deserialize)]
pub struct UpdateAttendanceRequest {
    pub attendance_status: AttendanceStatus,
}

pub async fn list_attendees(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(meeting_id): Path<i64>,
) -> impl IntoResponse {
    ok_or_error(state.review.list_attendees(user.tenant_id, meeting_id).await)
}

pub async fn add_attendee(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(meeting_id): Path<i64>,
    Json(request): Json<AddAttendeeRequest>,
) -> impl IntoResponse {
    info!("Adding attendee {} to meeting {}", request.user_id, meeting_id);

    created_or_error(
        state
            .review
            .add_attendee(
                user.tenant_id,
                meeting_id,
                request.user_id,
                request.attendance_status,
            )
            .await,
    )
}

pub async fn update_attendee(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((meeting_id, attendee_id)): Path<(i64, i64)>,
    Json(request): Json<UpdateAttendanceRequest>,
) -> impl IntoResponse {
    ok_or_error(
        state
            .review
            .update_attendance(
                user.tenant_id,
                meeting_id,
                attendee_id,
                request.attendance_status,
            )
            .await,
    )
}

pub async fn remove_attendee(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((meeting_id, attendee_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    info!("Removing attendee {} from meeting {}", attendee_id, meeting_id);

    done_or_error(
        state
            .review
            .remove_attendee(user.tenant_id, meeting_id, attendee_id)
            .await,
        "Attendee removed",
    )
}

// Agenda

pub async fn list_requirements(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(meeting_id): Path<i64>,
) -> impl IntoResponse {
    ok_or_error(
        state
            .review
            .list_meeting_requirements(user.tenant_id, meeting_id)
            .await,
    )
}

pub async fn add_requirement(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(meeting_id): Path<i64>,
    Json(request): Json<MeetingRequirementInput>,
) -> impl IntoResponse {
    info!(
        "Adding requirement {} to meeting {}",
        request.requirement_id, meeting_id
    );

    created_or_error(
        state
            .review
            .add_meeting_requirement(user.tenant_id, meeting_id, request)
            .await,
    )
}

pub async fn update_requirement(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((meeting_id, requirement_id)): Path<(i64, i64)>,
    Json(request): Json<MeetingRequirementUpdateInput>,
) -> impl IntoResponse {
    ok_or_error(
        state
            .review
            .update_meeting_requirement(user.tenant_id, meeting_id, requirement_id, request)
            .await,
    )
}

pub async fn remove_requirement(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((meeting_id, requirement_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    info!(
        "Removing requirement {} from meeting {}",
        requirement_id, meeting_id
    );

    done_or_error(
        state
            .review
            .remove_meeting_requirement(user.tenant_id, meeting_id, requirement_id)
            .await,
        "Requirement removed from meeting",
    )
}
