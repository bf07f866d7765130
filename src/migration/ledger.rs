//! Per-removal migration ledger.
//!
//! Tracks the status of every per-hash migration unit during a node removal
//! so a failed removal can report exactly which hashes moved and which did
//! not. The ledger is in-memory and scoped to one removal attempt; retry
//! correctness rests on the ring's bookkeeping (migrated hashes are no
//! longer recorded against the departing node), the ledger makes the
//! attempt explainable.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status of a single hash's migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MigrationStatus {
    /// Unit not finished yet.
    Pending,
    /// Value moved to the successor and deleted from the old owner.
    Done,
    /// Nothing found at the old address; already moved or never stored.
    Skipped,
    /// Unit failed; the removal will be aborted.
    Failed {
        /// Why the unit failed.
        reason: String,
    },
}

impl MigrationStatus {
    /// Whether this unit failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, MigrationStatus::Failed { .. })
    }
}

/// Ledger of per-hash migration statuses for one removal attempt.
#[derive(Debug, Default)]
pub struct MigrationLedger {
    entries: RwLock<BTreeMap<u32, MigrationStatus>>,
}

impl MigrationLedger {
    /// Create a ledger with every hash marked pending.
    pub fn begin(hashes: &[u32]) -> Self {
        let entries = hashes
            .iter()
            .map(|&h| (h, MigrationStatus::Pending))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Mark a hash as migrated.
    pub fn mark_done(&self, hash: u32) {
        self.entries.write().insert(hash, MigrationStatus::Done);
    }

    /// Mark a hash as skipped (nothing stored at the old address).
    pub fn mark_skipped(&self, hash: u32) {
        self.entries.write().insert(hash, MigrationStatus::Skipped);
    }

    /// Mark a hash as failed.
    pub fn mark_failed(&self, hash: u32, reason: impl Into<String>) {
        self.entries.write().insert(
            hash,
            MigrationStatus::Failed {
                reason: reason.into(),
            },
        );
    }

    /// Status of one hash, if tracked.
    pub fn status(&self, hash: u32) -> Option<MigrationStatus> {
        self.entries.read().get(&hash).cloned()
    }

    /// Number of tracked hashes.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the ledger tracks no hashes.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Count of migrated hashes.
    pub fn done_count(&self) -> usize {
        self.count(|s| *s == MigrationStatus::Done)
    }

    /// Count of skipped hashes.
    pub fn skipped_count(&self) -> usize {
        self.count(|s| *s == MigrationStatus::Skipped)
    }

    /// Mark every still-pending hash as failed. Returns how many were
    /// marked. Used at the barrier: a unit that never reported (panicked or
    /// was aborted) must fail the removal, not slip through as pending.
    pub fn fail_pending(&self, reason: &str) -> usize {
        let mut entries = self.entries.write();
        let mut marked = 0;
        for status in entries.values_mut() {
            if *status == MigrationStatus::Pending {
                *status = MigrationStatus::Failed {
                    reason: reason.to_string(),
                };
                marked += 1;
            }
        }
        marked
    }

    /// The failed hashes with their reasons, in hash order.
    pub fn failures(&self) -> Vec<(u32, String)> {
        self.entries
            .read()
            .iter()
            .filter_map(|(&h, s)| match s {
                MigrationStatus::Failed { reason } => Some((h, reason.clone())),
                _ => None,
            })
            .collect()
    }

    /// Snapshot of every tracked hash and its status, in hash order.
    pub fn snapshot(&self) -> Vec<(u32, MigrationStatus)> {
        self.entries
            .read()
            .iter()
            .map(|(&h, s)| (h, s.clone()))
            .collect()
    }

    fn count(&self, pred: impl Fn(&MigrationStatus) -> bool) -> usize {
        self.entries.read().values().filter(|s| pred(*s)).count()
    }
}
