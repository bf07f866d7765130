//! External key-value store interface.
//!
//! The ring never holds value payloads itself: values live in an external
//! store addressed by a (node-name, key-hash) pair. This module defines the
//! trait the migration coordinator and the client-facing facade consume,
//! plus an in-process implementation for wiring and tests.
//!
//! The composite address is canonicalized as `"<node>:<hash>"` with the hash
//! in decimal, the same textual form on the write and read paths.

mod memory;

pub use memory::MemoryStore;

use crate::error::StoreResult;
use async_trait::async_trait;
use bytes::Bytes;

/// Canonical storage key for a (node, hash) address.
pub fn storage_key(node: &str, hash: u32) -> String {
    format!("{node}:{hash}")
}

/// Keyed get/set/delete of value blobs, addressed by (node-name, hash).
///
/// Implementations are expected to bound their own request latency; the
/// migration coordinator additionally wraps each per-hash unit of work in a
/// deadline and treats exceeding it as a migration failure.
#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Read the value stored at `(node, hash)`, if any.
    async fn get(&self, node: &str, hash: u32) -> StoreResult<Option<Bytes>>;

    /// Write a value at `(node, hash)`.
    async fn set(&self, node: &str, hash: u32, value: Bytes) -> StoreResult<()>;

    /// Delete the value at `(node, hash)`. Deleting an absent key is not an
    /// error.
    async fn delete(&self, node: &str, hash: u32) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_is_decimal() {
        assert_eq!(storage_key("cache-1", 4040), "cache-1:4040");
        assert_eq!(storage_key("cache-1", u32::MAX), "cache-1:4294967295");
    }
}
