//! Client-facing facade over the ring, the store, and the coordinator.

use crate::config::RingConfig;
use crate::error::Result;
use crate::migration::{MembershipCoordinator, RemovalOutcome};
use crate::ring::Ring;
use crate::store::KeyValueStore;
use crate::types::{KeyLocation, NodeInfo, RingPosition};
use bytes::Bytes;
use std::sync::Arc;
use tracing::debug;

/// A consistent-hash-routed cache: keys are placed on the ring, values live
/// in the external store under the owning node's address.
///
/// This is the composition root for the subsystem — it constructs the ring
/// and the coordinator explicitly and hands out shared references, so tests
/// and multi-ring setups never touch global state.
///
/// # Example
///
/// ```rust,no_run
/// use ringleader::{MemoryStore, RingCache, RingConfig};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let cache = RingCache::new(Arc::new(MemoryStore::new()), RingConfig::default())?;
///
/// cache.add_node("cache-1")?;
/// cache.add_node("cache-2")?;
///
/// let location = cache.put(b"user:123", "Alice").await?;
/// println!("stored on {} at hash {}", location.node, location.hash);
///
/// // Drains cache-1's keys to its successor, then drops the node.
/// let new_owner = cache.remove_node("cache-1").await?;
/// assert_eq!(cache.get(b"user:123").await?.unwrap(), "Alice");
/// # let _ = new_owner;
/// # Ok(())
/// # }
/// ```
pub struct RingCache {
    ring: Arc<Ring>,
    store: Arc<dyn KeyValueStore>,
    coordinator: MembershipCoordinator,
}

impl RingCache {
    /// Create a cache over the given external store.
    pub fn new(store: Arc<dyn KeyValueStore>, config: RingConfig) -> Result<Self> {
        config.validate()?;
        let ring = Arc::new(Ring::new());
        let coordinator =
            MembershipCoordinator::new(Arc::clone(&ring), Arc::clone(&store), config);
        Ok(Self {
            ring,
            store,
            coordinator,
        })
    }

    /// Add a node to the ring.
    pub fn add_node(&self, name: &str) -> Result<RingPosition> {
        self.ring.add_node(name)
    }

    /// Remove a node, migrating its keys to its ring successor first.
    /// Returns the successor's name.
    pub async fn remove_node(&self, name: &str) -> Result<String> {
        self.coordinator.remove_node(name).await
    }

    /// Resolve which node owns a key, without touching the store.
    pub fn locate(&self, key: &[u8]) -> Result<KeyLocation> {
        self.ring.owner_of(key)
    }

    /// Store a value under the key's current owner and record the ownership
    /// bookkeeping on the ring.
    pub async fn put(&self, key: &[u8], value: impl Into<Bytes>) -> Result<KeyLocation> {
        let location = self.ring.owner_of(key)?;
        self.store
            .set(&location.node, location.hash, value.into())
            .await?;
        self.ring.record_hash(&location.node, location.hash)?;
        self.ring
            .record_id(&location.node, String::from_utf8_lossy(key))?;

        debug!(node = %location.node, hash = location.hash, "stored key");
        Ok(location)
    }

    /// Read a value from the key's current owner.
    ///
    /// `Ok(None)` means the key does not exist under current ownership — the
    /// ring never consults stale owners.
    pub async fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        let location = self.ring.owner_of(key)?;
        Ok(self.store.get(&location.node, location.hash).await?)
    }

    /// Snapshot a node's ring state.
    pub fn node_info(&self, name: &str) -> Result<NodeInfo> {
        self.ring.node_info(name)
    }

    /// Node names in ring-position order.
    pub fn node_names(&self) -> Vec<String> {
        self.ring.node_names()
    }

    /// Outcome of the most recent removal attempt.
    pub fn last_removal(&self) -> Option<RemovalOutcome> {
        self.coordinator.last_outcome()
    }

    /// Shared handle to the underlying ring.
    pub fn ring(&self) -> &Arc<Ring> {
        &self.ring
    }
}

impl std::fmt::Debug for RingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingCache")
            .field("nodes", &self.ring.len())
            .finish()
    }
}
