//! In-process store implementation.

use super::{storage_key, KeyValueStore};
use crate::error::StoreResult;
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

/// An in-memory [`KeyValueStore`] backed by a concurrent map.
///
/// Stands in for the real external store (the original deployment target is
/// a networked cache) in tests and single-process setups.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, Bytes>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, across all node addresses.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, node: &str, hash: u32) -> StoreResult<Option<Bytes>> {
        Ok(self
            .entries
            .get(&storage_key(node, hash))
            .map(|entry| entry.value().clone()))
    }

    async fn set(&self, node: &str, hash: u32, value: Bytes) -> StoreResult<()> {
        self.entries.insert(storage_key(node, hash), value);
        Ok(())
    }

    async fn delete(&self, node: &str, hash: u32) -> StoreResult<()> {
        self.entries.remove(&storage_key(node, hash));
        Ok(())
    }
}
