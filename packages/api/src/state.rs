// ABOUTME: Shared application state for API handlers
// ABOUTME: Wires the review service and notification store to one database pool

use sqlx::SqlitePool;
use std::sync::Arc;

use reqhub_review::{ReviewService, SqliteNotificationStore};

#[derive(Clone)]
pub struct AppState {
    pub review: Arc<ReviewService>,
    pub notifications: Arc<SqliteNotificationStore>,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            review: Arc::new(ReviewService::sqlite(pool.clone())),
            notifications: Arc::new(SqliteNotificationStore::new(pool)),
        }
    }
}
