//! Pause store backends: retention, expiry, and round-trips.

use brickflow::context::FlowContext;
use brickflow::store::{InMemoryPauseStore, PauseStore};
use serde_json::json;
use std::time::Duration;

const WEEK: Duration = Duration::from_secs(7 * 24 * 60 * 60);

fn snapshot(run_id_seed: &str) -> brickflow::context::ContextSnapshot {
    let mut ctx = FlowContext::new(format!("flow-{run_id_seed}"), json!({"seed": run_id_seed}));
    ctx.mark_paused("wait");
    ctx.snapshot()
}

#[tokio::test]
async fn memory_store_roundtrip() {
    let store = InMemoryPauseStore::new();
    let snap = snapshot("a");

    store.put("run-1", snap.clone(), WEEK).await.unwrap();
    assert_eq!(store.len(), 1);

    let fetched = store.get("run-1").await.unwrap().expect("stored");
    assert_eq!(fetched, snap);

    store.delete("run-1").await.unwrap();
    assert!(store.get("run-1").await.unwrap().is_none());
    assert!(store.is_empty());
}

#[tokio::test]
async fn memory_store_expires_entries() {
    let store = InMemoryPauseStore::new();
    store
        .put("run-1", snapshot("a"), Duration::ZERO)
        .await
        .unwrap();
    assert!(store.get("run-1").await.unwrap().is_none());
    assert!(store.is_empty());
}

#[tokio::test]
async fn memory_store_get_of_unknown_run_is_none() {
    let store = InMemoryPauseStore::new();
    assert!(store.get("nope").await.unwrap().is_none());
    // Deleting a missing entry is not an error.
    store.delete("nope").await.unwrap();
}

#[tokio::test]
async fn memory_store_overwrites_same_run_id() {
    let store = InMemoryPauseStore::new();
    store.put("run-1", snapshot("a"), WEEK).await.unwrap();
    let second = snapshot("b");
    store.put("run-1", second.clone(), WEEK).await.unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(store.get("run-1").await.unwrap(), Some(second));
}

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::*;
    use brickflow::store::SqlitePauseStore;

    async fn temp_store() -> (SqlitePauseStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("sqlite://{}/pauses.db", dir.path().display());
        let store = SqlitePauseStore::connect(&url).await.expect("connect");
        (store, dir)
    }

    #[tokio::test]
    async fn sqlite_store_roundtrip() {
        let (store, _dir) = temp_store().await;
        let snap = snapshot("a");

        store.put("run-1", snap.clone(), WEEK).await.unwrap();
        let fetched = store.get("run-1").await.unwrap().expect("stored");
        assert_eq!(fetched, snap);

        store.delete("run-1").await.unwrap();
        assert!(store.get("run-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sqlite_store_expires_entries() {
        let (store, _dir) = temp_store().await;
        store
            .put("run-1", snapshot("a"), Duration::ZERO)
            .await
            .unwrap();
        assert!(store.get("run-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sqlite_store_overwrites_same_run_id() {
        let (store, _dir) = temp_store().await;
        store.put("run-1", snapshot("a"), WEEK).await.unwrap();
        let second = snapshot("b");
        store.put("run-1", second.clone(), WEEK).await.unwrap();
        assert_eq!(store.get("run-1").await.unwrap(), Some(second));
    }
}
