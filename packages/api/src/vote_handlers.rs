// ABOUTME: HTTP request handlers for voting and results
// ABOUTME: Vote casting, live statistics, pending voters, and archived results

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use tracing::info;

use reqhub_review::CastVoteInput;

use crate::auth::CurrentUser;
use crate::response::{created_or_error, ok_or_error};
use crate::state::AppState;

/// Cast or replace the caller's vote on one agenda item
pub async fn cast_vote(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((meeting_id, requirement_id)): Path<(i64, i64)>,
    Json(request): Json<CastVoteInput>,
) -> impl IntoResponse {
    info!(
        "User {} voting on requirement {} in meeting {}",
        user.user_id, requirement_id, meeting_id
    );

    created_or_error(
        state
            .review
            .cast_vote(
                user.tenant_id,
                meeting_id,
                requirement_id,
                user.user_id,
                request,
            )
            .await,
    )
}

pub async fn list_votes(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((meeting_id, requirement_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    ok_or_error(
        state
            .review
            .list_votes(user.tenant_id, meeting_id, requirement_id)
            .await,
    )
}

pub async fn get_my_vote(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((meeting_id, requirement_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    ok_or_error(
        state
            .review
            .get_vote(user.tenant_id, meeting_id, requirement_id, user.user_id)
            .await,
    )
}

pub async fn get_vote_statistics(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((meeting_id, requirement_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    ok_or_error(
        state
            .review
            .vote_statistics(user.tenant_id, meeting_id, requirement_id)
            .await,
    )
}

pub async fn get_pending_voters(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(meeting_id): Path<i64>,
) -> impl IntoResponse {
    ok_or_error(state.review.pending_voters(user.tenant_id, meeting_id).await)
}

/// Archived results written when the meeting ended
pub async fn list_results(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(meeting_id): Path<i64>,
) -> impl IntoResponse {
    ok_or_error(
        state
            .review
            .list_vote_results(user.tenant_id, meeting_id)
            .await,
    )
}

pub async fn get_result(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((meeting_id, requirement_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    ok_or_error(
        state
            .review
            .get_vote_result(user.tenant_id, meeting_id, requirement_id)
            .await,
    )
}
