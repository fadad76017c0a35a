// ABOUTME: Read-only lookups into the requirement and user directories
// ABOUTME: Trait seams plus SQLite implementations used for titles and display names

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use tracing::debug;

use reqhub_storage::StorageError;

/// Resolves requirement titles for archival snapshots and reports
#[async_trait]
pub trait RequirementDirectory: Send + Sync {
    async fn requirement_title(
        &self,
        tenant_id: i64,
        requirement_id: i64,
    ) -> Result<Option<String>, StorageError>;

    async fn requirement_titles(
        &self,
        tenant_id: i64,
        requirement_ids: &[i64],
    ) -> Result<HashMap<i64, String>, StorageError> {
        let mut titles = HashMap::new();
        for id in requirement_ids {
            if let Some(title) = self.requirement_title(tenant_id, *id).await? {
                titles.insert(*id, title);
            }
        }
        Ok(titles)
    }
}

/// Resolves user display names for voter details
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn display_name(&self, tenant_id: i64, user_id: i64)
        -> Result<Option<String>, StorageError>;

    async fn display_names(
        &self,
        tenant_id: i64,
        user_ids: &[i64],
    ) -> Result<HashMap<i64, String>, StorageError> {
        let mut names = HashMap::new();
        for id in user_ids {
            if let Some(name) = self.display_name(tenant_id, *id).await? {
                names.insert(*id, name);
            }
        }
        Ok(names)
    }
}

/// Directory reader backed by the `requirements` and `users` tables
pub struct SqliteDirectory {
    pool: SqlitePool,
}

impl SqliteDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn lookup_many(
        &self,
        sql_prefix: &str,
        tenant_id: i64,
        ids: &[i64],
    ) -> Result<HashMap<i64, String>, StorageError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let query_str = format!("{} AND id IN ({})", sql_prefix, placeholders);

        let mut query = sqlx::query(&query_str).bind(tenant_id);
        for id in ids {
            query = query.bind(*id);
        }

        let rows = query.fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| Ok((row.try_get("id")?, row.try_get("name")?)))
            .collect::<Result<HashMap<_, _>, sqlx::Error>>()
            .map_err(StorageError::Sqlx)
    }
}

#[async_trait]
impl RequirementDirectory for SqliteDirectory {
    async fn requirement_title(
        &self,
        tenant_id: i64,
        requirement_id: i64,
    ) -> Result<Option<String>, StorageError> {
        debug!("Resolving requirement {} for tenant {}", requirement_id, tenant_id);

        let title = sqlx::query_scalar("SELECT title FROM requirements WHERE tenant_id = ? AND id = ?")
            .bind(tenant_id)
            .bind(requirement_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(title)
    }

    async fn requirement_titles(
        &self,
        tenant_id: i64,
        requirement_ids: &[i64],
    ) -> Result<HashMap<i64, String>, StorageError> {
        self.lookup_many(
            "SELECT id, title AS name FROM requirements WHERE tenant_id = ?",
            tenant_id,
            requirement_ids,
        )
        .await
    }
}

#[async_trait]
impl UserDirectory for SqliteDirectory {
    async fn display_name(
        &self,
        tenant_id: i64,
        user_id: i64,
    ) -> Result<Option<String>, StorageError> {
        let name = sqlx::query_scalar(
            "SELECT COALESCE(display_name, username) FROM users WHERE tenant_id = ? AND id = ?",
        )
        .bind(tenant_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(name)
    }

    async fn display_names(
        &self,
        tenant_id: i64,
        user_ids: &[i64],
    ) -> Result<HashMap<i64, String>, StorageError> {
        self.lookup_many(
            "SELECT id, COALESCE(display_name, username) AS name FROM users WHERE tenant_id = ?",
            tenant_id,
            user_ids,
        )
        .await
    }
}
