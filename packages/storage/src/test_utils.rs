// ABOUTME: Test helpers for packages that need a migrated database
// ABOUTME: Builds a single-connection in-memory SQLite pool

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Create a migrated in-memory database.
///
/// The pool holds exactly one connection that is never recycled, since every
/// SQLite `:memory:` connection is its own database.
pub async fn memory_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("valid in-memory url")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("open in-memory database");

    crate::run_migrations(&pool)
        .await
        .expect("apply migrations");

    pool
}

/// Insert a user row and return its id
pub async fn insert_user(pool: &SqlitePool, tenant_id: i64, username: &str, display_name: &str) -> i64 {
    sqlx::query("INSERT INTO users (tenant_id, username, display_name) VALUES (?, ?, ?)")
        .bind(tenant_id)
        .bind(username)
        .bind(display_name)
        .execute(pool)
        .await
        .expect("insert user")
        .last_insert_rowid()
}

/// Insert a requirement row and return its id
pub async fn insert_requirement(pool: &SqlitePool, tenant_id: i64, title: &str) -> i64 {
    sqlx::query("INSERT INTO requirements (tenant_id, title) VALUES (?, ?)")
        .bind(tenant_id)
        .bind(title)
        .execute(pool)
        .await
        .expect("insert requirement")
        .last_insert_rowid()
}
