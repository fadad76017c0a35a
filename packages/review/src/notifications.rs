// ABOUTME: Notification dispatch for review meeting events
// ABOUTME: NotificationSink seam and the SQLite-backed notification store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use reqhub_storage::StorageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    MeetingStarted,
    VoteCast,
    MeetingEnded,
    MeetingCancelled,
}

/// A notification waiting to be delivered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    pub tenant_id: i64,
    pub user_id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub content: Option<String>,
    pub meeting_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub tenant_id: i64,
    pub user_id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub content: Option<String>,
    pub meeting_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

/// Delivers notifications produced by the review workflow
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn dispatch(&self, notifications: Vec<NewNotification>) -> Result<(), StorageError>;
}

/// Stores notifications in the `notifications` table for in-app delivery
pub struct SqliteNotificationStore {
    pool: SqlitePool,
}

impl SqliteNotificationStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List a user's notifications, newest first
    pub async fn list_for_user(
        &self,
        tenant_id: i64,
        user_id: i64,
        unread_only: bool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<(Vec<Notification>, i64), StorageError> {
        debug!(
            "Fetching notifications for user {} (unread_only: {}, limit: {:?}, offset: {:?})",
            user_id, unread_only, limit, offset
        );

        let filter = if unread_only {
            "WHERE tenant_id = ? AND user_id = ? AND read_at IS NULL"
        } else {
            "WHERE tenant_id = ? AND user_id = ?"
        };

        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM notifications {}", filter))
            .bind(tenant_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let mut query_str = format!(
            "SELECT * FROM notifications {} ORDER BY created_at DESC, id DESC",
            filter
        );
        if let Some(lim) = limit {
            query_str.push_str(&format!(" LIMIT {}", lim));
            if let Some(off) = offset {
                query_str.push_str(&format!(" OFFSET {}", off));
            }
        }

        let rows = sqlx::query(&query_str)
            .bind(tenant_id)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        let notifications = rows
            .iter()
            .map(row_to_notification)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((notifications, count))
    }

    /// Mark one of the user's notifications as read
    pub async fn mark_read(
        &self,
        tenant_id: i64,
        user_id: i64,
        notification_id: i64,
    ) -> Result<Notification, StorageError> {
        debug!("Marking notification {} read for user {}", notification_id, user_id);

        sqlx::query(
            "UPDATE notifications SET read_at = COALESCE(read_at, ?) WHERE id = ? AND tenant_id = ? AND user_id = ?",
        )
        .bind(Utc::now())
        .bind(notification_id)
        .bind(tenant_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query("SELECT * FROM notifications WHERE id = ? AND tenant_id = ? AND user_id = ?")
            .bind(notification_id)
            .bind(tenant_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;

        row_to_notification(&row)
    }
}

#[async_trait]
impl NotificationSink for SqliteNotificationStore {
    async fn dispatch(&self, notifications: Vec<NewNotification>) -> Result<(), StorageError> {
        if notifications.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        for n in &notifications {
            sqlx::query(
                r#"
                INSERT INTO notifications (tenant_id, user_id, kind, title, content, meeting_id, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(n.tenant_id)
            .bind(n.user_id)
            .bind(n.kind)
            .bind(&n.title)
            .bind(&n.content)
            .bind(n.meeting_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!("Stored {} notifications", notifications.len());
        Ok(())
    }
}

fn row_to_notification(row: &sqlx::sqlite::SqliteRow) -> Result<Notification, StorageError> {
    Ok(Notification {
        id: row.try_get("id")?,
        tenant_id: row.try_get("tenant_id")?,
        user_id: row.try_get("user_id")?,
        kind: row.try_get("kind")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        meeting_id: row.try_get("meeting_id")?,
        created_at: row.try_get("created_at")?,
        read_at: row.try_get("read_at")?,
    })
}
