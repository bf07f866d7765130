//! Consistent hashing ring with coordinated key migration.
//!
//! This crate provides a single-process consistent hash ring that:
//! - Places nodes and keys in one 32-bit hash space (CRC-32) and resolves
//!   ownership by nearest successor position with wraparound
//! - Guards all ring state with one reader-writer lock, so concurrent
//!   lookups always observe membership changes atomically
//! - Coordinates node removal so that every key the departing node owned is
//!   migrated to its ring successor before the topology changes
//!
//! # Example
//!
//! ```rust,no_run
//! use ringleader::{MemoryStore, RingCache, RingConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cache = RingCache::new(Arc::new(MemoryStore::new()), RingConfig::default())?;
//!
//!     cache.add_node("cache-1")?;
//!     cache.add_node("cache-2")?;
//!     cache.add_node("cache-3")?;
//!
//!     // Values are stored under whichever node owns the key's hash.
//!     let location = cache.put(b"user:123", "Alice").await?;
//!     println!("user:123 lives on {}", location.node);
//!
//!     // Removal drains the node's keys to its ring successor first; the
//!     // key stays readable throughout.
//!     let new_owner = cache.remove_node(&location.node).await?;
//!     assert_eq!(cache.get(b"user:123").await?.unwrap(), "Alice");
//!     println!("now owned by {new_owner}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                RingCache API                │
//! │  • put / get / locate                       │
//! │  • add_node / remove_node / node_info       │
//! └─────────────────────────────────────────────┘
//!            │                      │
//!            ▼                      ▼
//! ┌──────────────────┐   ┌──────────────────────┐
//! │       Ring       │   │ MembershipCoordinator│
//! │ positions +      │◄──│ scatter / barrier    │
//! │ ownership        │   │ key migration        │
//! └──────────────────┘   └──────────┬───────────┘
//!                                   ▼
//!                        ┌──────────────────────┐
//!                        │   KeyValueStore      │
//!                        │ get/set/delete by    │
//!                        │ (node, hash)         │
//!                        └──────────────────────┘
//! ```
//!
//! # Consistency model
//!
//! The ring is the single source of truth for ownership. During a removal,
//! lookups keep resolving to the departing node until every one of its keys
//! is reachable at the successor; the position swap is one exclusive-lock
//! critical section, so no lookup ever sees a key owned by neither node. A
//! failed migration aborts the removal with the ring unchanged, and the
//! removal can simply be retried.

pub mod cache;
pub mod config;
pub mod error;
pub mod hash;
pub mod migration;
pub mod ring;
pub mod store;
pub mod testing;
pub mod types;

// Re-export main types for convenience
pub use cache::RingCache;
pub use config::RingConfig;
pub use error::{Error, MigrationError, Result, StoreError, StoreResult};
pub use migration::{MembershipCoordinator, MigrationLedger, MigrationStatus, RemovalOutcome};
pub use ring::Ring;
pub use store::{KeyValueStore, MemoryStore};
pub use types::{KeyLocation, NodeInfo, RingPosition};
