// ABOUTME: HTTP API layer for Reqhub providing REST endpoints and routing
// ABOUTME: Exposes the review meeting workflow behind {success, data, message} envelopes

use axum::{
    routing::{get, post, put},
    Router,
};

pub mod auth;
pub mod error;
pub mod health;
pub mod meeting_handlers;
pub mod notification_handlers;
pub mod pagination;
pub mod response;
pub mod state;
pub mod vote_handlers;

pub use auth::CurrentUser;
pub use error::ApiError;
pub use response::ApiResponse;
pub use state::AppState;

/// Creates the review meetings API router (nested under /api/requirement-review-meetings)
pub fn create_meetings_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(meeting_handlers::list_meetings).post(meeting_handlers::create_meeting),
        )
        .route(
            "/{id}",
            get(meeting_handlers::get_meeting)
                .put(meeting_handlers::update_meeting)
                .delete(meeting_handlers::delete_meeting),
        )
        .route("/{id}/start", post(meeting_handlers::start_meeting))
        .route("/{id}/end", post(meeting_handlers::end_meeting))
        .route("/{id}/cancel", post(meeting_handlers::cancel_meeting))
        // Attendees
        .route(
            "/{id}/attendees",
            get(meeting_handlers::list_attendees).post(meeting_handlers::add_attendee),
        )
        .route(
            "/{id}/attendees/{user_id}",
            put(meeting_handlers::update_attendee)
                .delete(meeting_handlers::remove_attendee),
        )
        // Agenda
        .route(
            "/{id}/requirements",
            get(meeting_handlers::list_requirements).post(meeting_handlers::add_requirement),
        )
        .route(
            "/{id}/requirements/{rid}",
            put(meeting_handlers::update_requirement)
                .delete(meeting_handlers::remove_requirement),
        )
        // Voting
        .route(
            "/{id}/requirements/{rid}/votes",
            get(vote_handlers::list_votes).post(vote_handlers::cast_vote),
        )
        .route(
            "/{id}/requirements/{rid}/votes/me",
            get(vote_handlers::get_my_vote),
        )
        .route(
            "/{id}/requirements/{rid}/vote-statistics",
            get(vote_handlers::get_vote_statistics),
        )
        .route("/{id}/pending-voters", get(vote_handlers::get_pending_voters))
        .route("/{id}/results", get(vote_handlers::list_results))
        .route("/{id}/results/{rid}", get(vote_handlers::get_result))
}

/// Creates the notifications API router (nested under /api/notifications)
pub fn create_notifications_router() -> Router<AppState> {
    Router::new()
        .route("/", get(notification_handlers::list_notifications))
        .route(
            "/{id}/read",
            post(notification_handlers::mark_notification_read),
        )
}

/// Full API router with state applied
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))
        .nest("/api/requirement-review-meetings", create_meetings_router())
        .nest("/api/notifications", create_notifications_router())
        .with_state(state)
}
