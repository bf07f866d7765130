//! End-to-end removal tests with failure injection.

use crate::cache::RingCache;
use crate::config::RingConfig;
use crate::error::{Error, MigrationError};
use crate::testing::{FailingStore, SlowStore};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;

const NODES: [&str; 3] = ["cache-1", "cache-2", "cache-3"];

async fn seeded_cache(store: Arc<FailingStore>, keys: usize) -> (RingCache, Vec<String>) {
    let cache = RingCache::new(store, RingConfig::default()).unwrap();
    for node in NODES {
        cache.add_node(node).unwrap();
    }

    let mut seeded = Vec::new();
    for i in 0..keys {
        let key = format!("user:{i}");
        cache.put(key.as_bytes(), key.clone()).await.unwrap();
        seeded.push(key);
    }
    (cache, seeded)
}

async fn assert_all_readable(cache: &RingCache, keys: &[String]) {
    for key in keys {
        assert_eq!(
            cache.get(key.as_bytes()).await.unwrap(),
            Some(Bytes::from(key.clone())),
            "key {key} unreadable"
        );
    }
}

#[tokio::test]
async fn test_failed_delete_aborts_removal_and_retry_succeeds() {
    let store = Arc::new(FailingStore::new());
    let (cache, keys) = seeded_cache(Arc::clone(&store), 30).await;

    store.fail_deletes(true);

    let err = cache.remove_node("cache-1").await.unwrap_err();
    assert!(matches!(
        err,
        Error::Migration(MigrationError::Failed { .. })
    ));

    // Ring unchanged: the node is still there and every key still readable.
    assert_eq!(cache.node_names().len(), 3);
    assert_all_readable(&cache, &keys).await;

    let outcome = cache.last_removal().unwrap();
    assert!(!outcome.is_clean());

    // The removal is retryable once the store recovers.
    store.heal();
    cache.remove_node("cache-1").await.unwrap();

    assert_eq!(cache.node_names().len(), 2);
    assert_all_readable(&cache, &keys).await;
    assert!(cache.last_removal().unwrap().is_clean());
}

#[tokio::test]
async fn test_failed_write_aborts_removal() {
    let store = Arc::new(FailingStore::new());
    let (cache, keys) = seeded_cache(Arc::clone(&store), 20).await;

    store.fail_sets(true);

    let err = cache.remove_node("cache-2").await.unwrap_err();
    assert!(matches!(
        err,
        Error::Migration(MigrationError::Failed { .. })
    ));

    // Nothing moved, nothing lost.
    assert_eq!(cache.node_names().len(), 3);
    store.heal();
    assert_all_readable(&cache, &keys).await;
}

#[tokio::test]
async fn test_store_deadline_fails_migration() {
    let store = Arc::new(SlowStore::new(Duration::from_millis(50)));
    let config = RingConfig::default().with_migration_timeout(Duration::from_millis(5));
    let cache = RingCache::new(store, config).unwrap();

    cache.add_node("cache-1").unwrap();
    cache.add_node("cache-2").unwrap();
    cache.put(b"user:1", "v").await.unwrap();

    let departing = cache.locate(b"user:1").unwrap().node;
    let err = cache.remove_node(&departing).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Migration(MigrationError::Failed { .. })
    ));

    let outcome = cache.last_removal().unwrap();
    assert!(outcome
        .failed
        .iter()
        .any(|(_, reason)| reason.contains("timed out")));
    assert_eq!(cache.node_names().len(), 2);
}

#[tokio::test]
async fn test_overlapping_removals_rejected() {
    let store = Arc::new(SlowStore::new(Duration::from_millis(50)));
    let cache = Arc::new(RingCache::new(store, RingConfig::default()).unwrap());

    for node in NODES {
        cache.add_node(node).unwrap();
    }
    for i in 0..6 {
        cache
            .put(format!("user:{i}").as_bytes(), "v")
            .await
            .unwrap();
    }

    let first = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move { cache.remove_node("cache-1").await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    let err = cache.remove_node("cache-2").await.unwrap_err();
    assert!(matches!(
        err,
        Error::Migration(MigrationError::RemovalInProgress(_))
    ));

    first.await.unwrap().unwrap();
    assert_eq!(cache.node_names().len(), 2);
}

#[tokio::test]
async fn test_cancelled_removal_leaves_ring_unchanged() {
    let store = Arc::new(SlowStore::new(Duration::from_millis(100)));
    let cache = RingCache::new(store, RingConfig::default()).unwrap();

    for node in NODES {
        cache.add_node(node).unwrap();
    }
    cache.put(b"user:1", "v").await.unwrap();

    // Drop the removal future mid-migration.
    let cancelled =
        tokio::time::timeout(Duration::from_millis(20), cache.remove_node("cache-1")).await;
    assert!(cancelled.is_err());

    // Never a half-removed node: topology untouched, and the removal slot
    // was released so a fresh attempt goes through.
    assert_eq!(cache.node_names().len(), 3);
    cache.remove_node("cache-1").await.unwrap();
    assert_eq!(cache.node_names().len(), 2);
}
