//! Store doubles for failure injection.

use crate::error::{StoreError, StoreResult};
use crate::store::{KeyValueStore, MemoryStore};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// A [`KeyValueStore`] whose operations can be made to fail on demand.
///
/// Each operation kind has its own toggle, so a test can let the read and
/// write of a migration unit succeed and fail only the final delete.
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_get: AtomicBool,
    fail_set: AtomicBool,
    fail_delete: AtomicBool,
}

impl FailingStore {
    /// Create a healthy store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle failures on reads.
    pub fn fail_gets(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    /// Toggle failures on writes.
    pub fn fail_sets(&self, fail: bool) {
        self.fail_set.store(fail, Ordering::SeqCst);
    }

    /// Toggle failures on deletes.
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    /// Clear all failure toggles.
    pub fn heal(&self) {
        self.fail_gets(false);
        self.fail_sets(false);
        self.fail_deletes(false);
    }

    fn check(&self, flag: &AtomicBool, op: &str) -> StoreResult<()> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable(format!("injected {op} failure")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, node: &str, hash: u32) -> StoreResult<Option<Bytes>> {
        self.check(&self.fail_get, "get")?;
        self.inner.get(node, hash).await
    }

    async fn set(&self, node: &str, hash: u32, value: Bytes) -> StoreResult<()> {
        self.check(&self.fail_set, "set")?;
        self.inner.set(node, hash, value).await
    }

    async fn delete(&self, node: &str, hash: u32) -> StoreResult<()> {
        self.check(&self.fail_delete, "delete")?;
        self.inner.delete(node, hash).await
    }
}

/// A [`KeyValueStore`] that sleeps before every operation.
#[derive(Debug)]
pub struct SlowStore {
    inner: MemoryStore,
    delay: Duration,
}

impl SlowStore {
    /// Create a store with the given per-operation delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryStore::new(),
            delay,
        }
    }
}

#[async_trait]
impl KeyValueStore for SlowStore {
    async fn get(&self, node: &str, hash: u32) -> StoreResult<Option<Bytes>> {
        tokio::time::sleep(self.delay).await;
        self.inner.get(node, hash).await
    }

    async fn set(&self, node: &str, hash: u32, value: Bytes) -> StoreResult<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.set(node, hash, value).await
    }

    async fn delete(&self, node: &str, hash: u32) -> StoreResult<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.delete(node, hash).await
    }
}
