//! Pause-state persistence.
//!
//! When a run suspends, its serialized [`ContextSnapshot`] is handed to a
//! [`PauseStore`] keyed by run id with a finite retention window; resuming
//! fetches and deletes the stored snapshot. The engine treats the store as a
//! pluggable collaborator — retention is policy, not something the engine
//! enforces beyond passing the TTL along.
//!
//! Two backends ship with the crate:
//!
//! - [`InMemoryPauseStore`] — volatile, for tests and embedded setups
//! - [`SqlitePauseStore`] — durable, behind the default-on `sqlite` feature

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::InMemoryPauseStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqlitePauseStore;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use miette::Diagnostic;
use std::time::Duration;
use thiserror::Error;

use crate::context::ContextSnapshot;

/// Errors surfaced by pause-store backends.
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    /// Snapshot (de)serialization failed.
    #[error("snapshot serialization failed: {source}")]
    #[diagnostic(code(brickflow::store::serde))]
    Serde {
        #[from]
        source: serde_json::Error,
    },

    /// SQLite backend error.
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    #[diagnostic(
        code(brickflow::store::sqlx),
        help("Ensure the SQLite database URL is valid and accessible.")
    )]
    Sqlx(#[from] sqlx::Error),

    /// Any other backend failure.
    #[error("store backend error: {0}")]
    #[diagnostic(code(brickflow::store::backend))]
    Backend(String),
}

/// Keyed storage for paused-run snapshots.
#[async_trait]
pub trait PauseStore: Send + Sync {
    /// Store a snapshot under `run_id`, retained for at most `ttl`.
    async fn put(
        &self,
        run_id: &str,
        snapshot: ContextSnapshot,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    /// Fetch the stored snapshot, if present and not expired.
    async fn get(&self, run_id: &str) -> Result<Option<ContextSnapshot>, StoreError>;

    /// Remove the stored snapshot.
    async fn delete(&self, run_id: &str) -> Result<(), StoreError>;
}

/// Expiry instant for a TTL starting now; saturates on overflow.
pub(crate) fn expires_at(ttl: Duration) -> DateTime<Utc> {
    let delta = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
    Utc::now().checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC)
}
