//! Ring structure and ownership lookup.

use crate::error::{Error, Result};
use crate::hash;
use crate::types::{KeyLocation, NodeInfo, RingPosition};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Bound::{Excluded, Unbounded};
use tracing::{debug, warn};

/// Per-node bookkeeping.
#[derive(Debug, Default)]
struct NodeState {
    /// The node's position on the ring.
    position: RingPosition,

    /// Key hashes currently owned by the node, kept sorted.
    owned_hashes: BTreeSet<u32>,

    /// Logical record identifiers stored under the node (inspection only).
    record_ids: BTreeSet<String>,
}

/// The ring's shared state. Both maps are mutated together under the write
/// lock, so a position present in `positions` always has its node in `nodes`
/// and vice versa.
#[derive(Debug, Default)]
struct RingState {
    /// Sorted position -> node name index.
    positions: BTreeMap<RingPosition, String>,

    /// Node name -> bookkeeping.
    nodes: HashMap<String, NodeState>,
}

impl RingState {
    /// First position >= `hash`, wrapping to the smallest position.
    fn owner_at(&self, hash: u32) -> Option<&str> {
        self.positions
            .range(hash..)
            .next()
            .or_else(|| self.positions.iter().next())
            .map(|(_, name)| name.as_str())
    }

    /// First position strictly > `position`, wrapping to the smallest.
    fn successor_at(&self, position: RingPosition) -> Option<&str> {
        self.positions
            .range((Excluded(position), Unbounded))
            .next()
            .or_else(|| self.positions.iter().next())
            .map(|(_, name)| name.as_str())
    }
}

/// A consistent hash ring with per-node ownership bookkeeping.
///
/// All state lives behind one reader-writer lock scoped to the whole ring:
/// lookups take the shared lock, structural mutation takes the exclusive
/// lock, and every method is a single critical section. Concurrent lookups
/// therefore observe each mutation atomically, never a half-updated
/// position index.
///
/// The ring is an explicitly constructed value; share it with `Arc` from
/// whatever wires the service together.
#[derive(Debug, Default)]
pub struct Ring {
    state: RwLock<RingState>,
}

impl Ring {
    /// Create a new empty ring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the ring at the position its name hashes to.
    ///
    /// Re-adding a name already on the ring is a no-op. A *different* name
    /// hashing onto an occupied position is rejected with
    /// [`Error::PositionCollision`] rather than silently overwriting the
    /// holder.
    pub fn add_node(&self, name: &str) -> Result<RingPosition> {
        self.insert_at(name, hash::position_of(name.as_bytes()))
    }

    fn insert_at(&self, name: &str, position: RingPosition) -> Result<RingPosition> {
        let mut state = self.state.write();

        if state.nodes.contains_key(name) {
            debug!(node = name, position, "node already on ring, ignoring add");
            return Ok(position);
        }

        if let Some(existing) = state.positions.get(&position) {
            return Err(Error::PositionCollision {
                name: name.to_string(),
                existing: existing.clone(),
                position,
            });
        }

        state.positions.insert(position, name.to_string());
        state.nodes.insert(
            name.to_string(),
            NodeState {
                position,
                ..NodeState::default()
            },
        );

        debug!(node = name, position, "added node to ring");
        Ok(position)
    }

    /// Remove a node and drop all of its bookkeeping.
    ///
    /// Callers must migrate the node's owned hashes first (see
    /// [`crate::migration::MembershipCoordinator`]); removing directly drops
    /// any keys still recorded against the node.
    pub fn remove_node(&self, name: &str) -> Result<()> {
        let mut state = self.state.write();

        let node = state
            .nodes
            .remove(name)
            .ok_or_else(|| Error::NodeNotFound(name.to_string()))?;

        if !node.owned_hashes.is_empty() {
            warn!(
                node = name,
                orphaned = node.owned_hashes.len(),
                "removing node that still owns hashes"
            );
        }

        state.positions.remove(&node.position);
        debug!(node = name, position = node.position, "removed node from ring");
        Ok(())
    }

    /// Resolve the owner of a raw key.
    pub fn owner_of(&self, key: &[u8]) -> Result<KeyLocation> {
        let hash = hash::position_of(key);
        let node = self.owner_of_hash(hash)?;
        Ok(KeyLocation::new(node, hash))
    }

    /// Resolve the owner of a precomputed key hash.
    pub fn owner_of_hash(&self, hash: u32) -> Result<String> {
        self.state
            .read()
            .owner_at(hash)
            .map(str::to_string)
            .ok_or(Error::EmptyRing)
    }

    /// Find the node that follows `name` clockwise on the ring.
    ///
    /// Uses a strictly-greater comparison so a node is never its own
    /// successor — except on a single-node ring, where wrapping lands back
    /// on the node itself. Callers removing the last node must treat that
    /// degenerate case themselves.
    pub fn successor_of(&self, name: &str) -> Result<String> {
        let state = self.state.read();

        let node = state
            .nodes
            .get(name)
            .ok_or_else(|| Error::NodeNotFound(name.to_string()))?;

        // Non-empty by construction: `name` itself is on the ring.
        state
            .successor_at(node.position)
            .map(str::to_string)
            .ok_or(Error::EmptyRing)
    }

    /// Record a key hash as owned by a node.
    pub fn record_hash(&self, name: &str, hash: u32) -> Result<()> {
        let mut state = self.state.write();
        let node = state
            .nodes
            .get_mut(name)
            .ok_or_else(|| Error::NodeNotFound(name.to_string()))?;
        node.owned_hashes.insert(hash);
        Ok(())
    }

    /// Record a logical record identifier against a node.
    pub fn record_id(&self, name: &str, id: impl Into<String>) -> Result<()> {
        let mut state = self.state.write();
        let node = state
            .nodes
            .get_mut(name)
            .ok_or_else(|| Error::NodeNotFound(name.to_string()))?;
        node.record_ids.insert(id.into());
        Ok(())
    }

    /// Forget a key hash owned by a node.
    ///
    /// Used by the migration coordinator after a hash has been handed to the
    /// new owner.
    pub fn forget_hash(&self, name: &str, hash: u32) -> Result<()> {
        let mut state = self.state.write();
        let node = state
            .nodes
            .get_mut(name)
            .ok_or_else(|| Error::NodeNotFound(name.to_string()))?;
        node.owned_hashes.remove(&hash);
        Ok(())
    }

    /// The sorted list of hashes currently owned by a node.
    pub fn hashes_owned_by(&self, name: &str) -> Result<Vec<u32>> {
        let state = self.state.read();
        let node = state
            .nodes
            .get(name)
            .ok_or_else(|| Error::NodeNotFound(name.to_string()))?;
        Ok(node.owned_hashes.iter().copied().collect())
    }

    /// Snapshot a node's state.
    pub fn node_info(&self, name: &str) -> Result<NodeInfo> {
        let state = self.state.read();
        let node = state
            .nodes
            .get(name)
            .ok_or_else(|| Error::NodeNotFound(name.to_string()))?;
        Ok(NodeInfo {
            name: name.to_string(),
            position: node.position,
            hashes: node.owned_hashes.iter().copied().collect(),
            record_ids: node.record_ids.iter().cloned().collect(),
        })
    }

    /// Check whether a node is on the ring.
    pub fn contains(&self, name: &str) -> bool {
        self.state.read().nodes.contains_key(name)
    }

    /// Number of nodes on the ring.
    pub fn len(&self) -> usize {
        self.state.read().nodes.len()
    }

    /// Whether the ring has no nodes.
    pub fn is_empty(&self) -> bool {
        self.state.read().nodes.is_empty()
    }

    /// Node names in ring-position order.
    pub fn node_names(&self) -> Vec<String> {
        self.state.read().positions.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash;

    fn ring_with(names: &[&str]) -> Ring {
        let ring = Ring::new();
        for name in names {
            ring.add_node(name).unwrap();
        }
        ring
    }

    /// Reference lookup: smallest position >= hash, wrapping to the smallest.
    fn expected_owner(positions: &[(u32, &str)], hash: u32) -> String {
        let mut sorted = positions.to_vec();
        sorted.sort();
        sorted
            .iter()
            .find(|(p, _)| *p >= hash)
            .or_else(|| sorted.first())
            .map(|(_, n)| n.to_string())
            .unwrap()
    }

    #[test]
    fn test_empty_ring() {
        let ring = Ring::new();
        assert!(ring.is_empty());
        assert!(matches!(ring.owner_of(b"key"), Err(Error::EmptyRing)));
        assert!(matches!(ring.owner_of_hash(42), Err(Error::EmptyRing)));
    }

    #[test]
    fn test_owner_matches_reference_scan() {
        let names = ["alpha", "bravo", "charlie", "delta", "echo"];
        let ring = ring_with(&names);

        let positions: Vec<(u32, &str)> = names
            .iter()
            .map(|n| (hash::position_of(n.as_bytes()), *n))
            .collect();

        for i in 0..500 {
            let key = format!("key-{i}");
            let location = ring.owner_of(key.as_bytes()).unwrap();
            assert_eq!(location.hash, hash::position_of(key.as_bytes()));
            assert_eq!(location.node, expected_owner(&positions, location.hash));
        }
    }

    #[test]
    fn test_wraparound() {
        let ring = ring_with(&["alpha", "bravo"]);

        // A hash above every node position wraps to the lowest position.
        let lowest = ring.node_names()[0].clone();
        assert_eq!(ring.owner_of_hash(u32::MAX).unwrap(), lowest);
    }

    #[test]
    fn test_add_is_idempotent() {
        let ring = Ring::new();
        let first = ring.add_node("alpha").unwrap();
        let second = ring.add_node("alpha").unwrap();

        assert_eq!(first, second);
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn test_position_collision_rejected() {
        let ring = Ring::new();
        ring.insert_at("alpha", 100).unwrap();

        let err = ring.insert_at("bravo", 100).unwrap_err();
        assert!(matches!(
            err,
            Error::PositionCollision { position: 100, .. }
        ));

        // The original holder is untouched.
        assert!(ring.contains("alpha"));
        assert!(!ring.contains("bravo"));
    }

    #[test]
    fn test_successor_is_next_clockwise() {
        let ring = Ring::new();
        ring.insert_at("a", 10).unwrap();
        ring.insert_at("b", 50).unwrap();
        ring.insert_at("c", 90).unwrap();

        assert_eq!(ring.successor_of("a").unwrap(), "b");
        assert_eq!(ring.successor_of("b").unwrap(), "c");
        // Wraps past the top of the ring.
        assert_eq!(ring.successor_of("c").unwrap(), "a");
    }

    #[test]
    fn test_successor_never_self_on_multi_node_ring() {
        let names = ["alpha", "bravo", "charlie"];
        let ring = ring_with(&names);
        for name in names {
            assert_ne!(ring.successor_of(name).unwrap(), name);
        }
    }

    #[test]
    fn test_successor_single_node_is_self() {
        let ring = ring_with(&["alpha"]);
        assert_eq!(ring.successor_of("alpha").unwrap(), "alpha");
    }

    #[test]
    fn test_scenario_fixed_positions() {
        // A at 10, B at 50, C at 90; hash 40 lands on B.
        let ring = Ring::new();
        ring.insert_at("a", 10).unwrap();
        ring.insert_at("b", 50).unwrap();
        ring.insert_at("c", 90).unwrap();

        assert_eq!(ring.owner_of_hash(40).unwrap(), "b");
        assert_eq!(ring.successor_of("b").unwrap(), "c");

        // After B leaves, 40 belongs to C.
        ring.remove_node("b").unwrap();
        assert_eq!(ring.owner_of_hash(40).unwrap(), "c");
    }

    #[test]
    fn test_bookkeeping() {
        let ring = ring_with(&["alpha"]);

        ring.record_hash("alpha", 30).unwrap();
        ring.record_hash("alpha", 10).unwrap();
        ring.record_hash("alpha", 20).unwrap();
        ring.record_hash("alpha", 20).unwrap();
        ring.record_id("alpha", "user-1").unwrap();

        // Sorted, deduplicated.
        assert_eq!(ring.hashes_owned_by("alpha").unwrap(), vec![10, 20, 30]);

        ring.forget_hash("alpha", 20).unwrap();
        assert_eq!(ring.hashes_owned_by("alpha").unwrap(), vec![10, 30]);

        let info = ring.node_info("alpha").unwrap();
        assert_eq!(info.record_ids, vec!["user-1".to_string()]);
    }

    #[test]
    fn test_unknown_node_errors() {
        let ring = ring_with(&["alpha"]);

        assert!(matches!(
            ring.remove_node("ghost"),
            Err(Error::NodeNotFound(_))
        ));
        assert!(matches!(
            ring.successor_of("ghost"),
            Err(Error::NodeNotFound(_))
        ));
        assert!(matches!(
            ring.record_hash("ghost", 1),
            Err(Error::NodeNotFound(_))
        ));
        assert!(matches!(
            ring.hashes_owned_by("ghost"),
            Err(Error::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_remove_drops_bookkeeping() {
        let ring = ring_with(&["alpha", "bravo"]);
        ring.record_hash("alpha", 7).unwrap();

        ring.remove_node("alpha").unwrap();
        assert!(!ring.contains("alpha"));
        assert_eq!(ring.len(), 1);
        assert!(matches!(
            ring.hashes_owned_by("alpha"),
            Err(Error::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_node_names_in_position_order() {
        let ring = Ring::new();
        ring.insert_at("high", 900).unwrap();
        ring.insert_at("low", 10).unwrap();
        ring.insert_at("mid", 500).unwrap();

        assert_eq!(ring.node_names(), vec!["low", "mid", "high"]);
    }
}
