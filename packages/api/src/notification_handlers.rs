// ABOUTME: HTTP request handlers for in-app notifications
// ABOUTME: Lists the caller's notifications and marks them read

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::info;

use reqhub_review::ReviewError;
use reqhub_storage::StorageError;

use crate::auth::CurrentUser;
use crate::pagination::{default_limit, default_page, PaginatedResponse, PaginationParams};
use crate::response::ok_or_error;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    #[serde(default)]
    pub unread_only: bool,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

pub async fn list_notifications(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListNotificationsQuery>,
) -> impl IntoResponse {
    info!(
        "Listing notifications for user {} (unread_only: {})",
        user.user_id, query.unread_only
    );

    let params = PaginationParams::new(query.page, query.limit);
    let result = state
        .notifications
        .list_for_user(
            user.tenant_id,
            user.user_id,
            query.unread_only,
            Some(params.limit),
            Some(params.offset()),
        )
        .await
        .map(|(items, total)| PaginatedResponse::new(items, &params, total))
        .map_err(ReviewError::from);

    ok_or_error(result)
}

pub async fn mark_notification_read(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(notification_id): Path<i64>,
) -> impl IntoResponse {
    let result = state
        .notifications
        .mark_read(user.tenant_id, user.user_id, notification_id)
        .await
        .map_err(|e| match e {
            StorageError::NotFound => ReviewError::NotificationNotFound(notification_id),
            other => ReviewError::from(other),
        });

    ok_or_error(result)
}
