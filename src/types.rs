//! Core types used throughout the ring.

use serde::{Deserialize, Serialize};

/// A position on the ring: the 32-bit hash of a node name.
pub type RingPosition = u32;

/// Where a key lives: the owning node and the key's ring hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyLocation {
    /// Name of the owning node.
    pub node: String,
    /// Hash of the key, comparable with node positions.
    pub hash: u32,
}

impl KeyLocation {
    /// Create a new key location.
    pub fn new(node: impl Into<String>, hash: u32) -> Self {
        Self {
            node: node.into(),
            hash,
        }
    }
}

/// Snapshot of a node's state on the ring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfo {
    /// The node's name.
    pub name: String,
    /// The node's position on the ring.
    pub position: RingPosition,
    /// Key hashes currently owned by the node, sorted ascending.
    pub hashes: Vec<u32>,
    /// Logical record identifiers stored under the node.
    ///
    /// Kept for inspection and debugging; lookup correctness never depends
    /// on this set.
    pub record_ids: Vec<String>,
}
