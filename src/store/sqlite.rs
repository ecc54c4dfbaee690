//! Durable SQLite pause store.
//!
//! Stores one row per paused run in a `paused_runs` table created on
//! connect. Snapshots are serialized through the [`ContextSnapshot`] serde
//! shape; expiry is checked on read and expired rows are deleted in place.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::time::Duration;
use tracing::instrument;

use super::{PauseStore, StoreError, expires_at};
use crate::context::ContextSnapshot;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS paused_runs (
    run_id TEXT PRIMARY KEY,
    flow_id TEXT NOT NULL,
    snapshot_json TEXT NOT NULL,
    expires_at TEXT NOT NULL
)";

/// Pause store backed by a SQLite database.
pub struct SqlitePauseStore {
    pool: SqlitePool,
}

impl SqlitePauseStore {
    /// Connect to `url` (e.g. `sqlite://flows.db`), creating the database
    /// file and the `paused_runs` table when missing.
    #[instrument(err)]
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool, ensuring the table exists.
    pub async fn with_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl PauseStore for SqlitePauseStore {
    async fn put(
        &self,
        run_id: &str,
        snapshot: ContextSnapshot,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(&snapshot)?;
        sqlx::query(
            "INSERT OR REPLACE INTO paused_runs (run_id, flow_id, snapshot_json, expires_at)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(run_id)
        .bind(&snapshot.flow_id)
        .bind(json)
        .bind(expires_at(ttl).to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, run_id: &str) -> Result<Option<ContextSnapshot>, StoreError> {
        let row = sqlx::query(
            "SELECT snapshot_json, expires_at FROM paused_runs WHERE run_id = ?1",
        )
        .bind(run_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let expires: String = row.get("expires_at");
        let expired = DateTime::parse_from_rfc3339(&expires)
            .map(|dt| dt.with_timezone(&Utc) <= Utc::now())
            .unwrap_or(true);
        if expired {
            self.delete(run_id).await?;
            return Ok(None);
        }

        let json: String = row.get("snapshot_json");
        Ok(Some(serde_json::from_str(&json)?))
    }

    async fn delete(&self, run_id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM paused_runs WHERE run_id = ?1")
            .bind(run_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
