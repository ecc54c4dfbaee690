//! Volatile in-memory pause store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::time::Duration;

use super::{PauseStore, StoreError, expires_at};
use crate::context::ContextSnapshot;

struct StoredEntry {
    snapshot: ContextSnapshot,
    expires_at: DateTime<Utc>,
}

/// Pause store keeping snapshots in process memory.
///
/// Expired entries are evicted lazily on access. Suitable for tests and
/// single-process embeddings; anything that must survive a restart should
/// use a durable backend.
#[derive(Default)]
pub struct InMemoryPauseStore {
    entries: Mutex<FxHashMap<String, StoredEntry>>,
}

impl InMemoryPauseStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-expired) snapshots currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.lock();
        entries.retain(|_, e| e.expires_at > now);
        entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PauseStore for InMemoryPauseStore {
    async fn put(
        &self,
        run_id: &str,
        snapshot: ContextSnapshot,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        self.entries.lock().insert(
            run_id.to_string(),
            StoredEntry {
                snapshot,
                expires_at: expires_at(ttl),
            },
        );
        Ok(())
    }

    async fn get(&self, run_id: &str) -> Result<Option<ContextSnapshot>, StoreError> {
        let mut entries = self.entries.lock();
        match entries.get(run_id) {
            Some(entry) if entry.expires_at > Utc::now() => Ok(Some(entry.snapshot.clone())),
            Some(_) => {
                entries.remove(run_id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, run_id: &str) -> Result<(), StoreError> {
        self.entries.lock().remove(run_id);
        Ok(())
    }
}
