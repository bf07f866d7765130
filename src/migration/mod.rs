//! Node-removal migration protocol.
//!
//! This module coordinates the membership change that has real teeth: taking
//! a node off the ring without losing any key it owned.
//!
//! # Removal protocol
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  MembershipCoordinator                       │
//! │                                                              │
//! │  1. Resolve successor + owned hashes (one ring read)         │
//! │                         ↓                                    │
//! │  2. Scatter: one unit per hash, bounded concurrency          │
//! │       read (old, h) → write (new, h) → record → delete       │
//! │                         ↓                                    │
//! │  3. Barrier: join every unit; any failure aborts the         │
//! │     removal and leaves the ring unchanged                    │
//! │                         ↓                                    │
//! │  4. Ring.remove_node — topology changes atomically           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Concurrent lookups during steps 2-3 still resolve to the old owner;
//! lookups after step 4 resolve to the successor. No window exists where a
//! key resolves to neither.
//!
//! A per-removal [`MigrationLedger`] records each hash's status
//! (pending/done/skipped/failed) so an aborted removal can report exactly
//! what moved before the failure.

mod coordinator;
mod ledger;

pub use coordinator::{MembershipCoordinator, RemovalOutcome};
pub use ledger::{MigrationLedger, MigrationStatus};
