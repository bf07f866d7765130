//! Node-removal coordinator.
//!
//! Removing a node must not lose any key it owned: every owned hash is moved
//! to the node's ring successor before the node's position is deleted. The
//! coordinator fans one unit of work out per hash, waits on the barrier, and
//! only mutates ring topology once every unit has succeeded.

use crate::config::RingConfig;
use crate::error::{Error, MigrationError, Result};
use crate::migration::ledger::MigrationLedger;
use crate::ring::Ring;
use crate::store::KeyValueStore;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// What one per-hash migration unit did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitResult {
    /// Value moved to the successor and removed from the old owner.
    Moved,
    /// Nothing stored at the old address; already moved or never written.
    SkippedMissing,
}

/// Summary of a removal attempt, kept for inspection after it finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovalOutcome {
    /// The node that was (or was to be) removed.
    pub departing: String,
    /// The ring successor that received the node's keys.
    pub successor: String,
    /// Hashes the departing node owned when the removal started.
    pub total: usize,
    /// Hashes whose values were moved to the successor.
    pub migrated: usize,
    /// Hashes with nothing stored at the old address.
    pub skipped: usize,
    /// Failed hashes with their reasons; non-empty means the removal was
    /// aborted and the ring left unchanged.
    pub failed: Vec<(u32, String)>,
}

impl RemovalOutcome {
    /// Whether every unit finished without failure.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Orchestrates node removal: successor resolution, scatter/barrier key
/// migration through the external store, and the final ring mutation.
///
/// Only one removal runs at a time; overlapping calls are rejected with
/// [`MigrationError::RemovalInProgress`]. Dropping an in-flight removal
/// future before the barrier completes leaves the ring unchanged — the
/// departing node's position is only deleted after every hash has moved.
pub struct MembershipCoordinator {
    ring: Arc<Ring>,
    store: Arc<dyn KeyValueStore>,
    config: RingConfig,

    /// Name of the node currently being removed, if any.
    active: Mutex<Option<String>>,

    /// Outcome of the most recent removal attempt.
    last_outcome: RwLock<Option<RemovalOutcome>>,
}

impl MembershipCoordinator {
    /// Create a new coordinator over a ring and its external store.
    pub fn new(ring: Arc<Ring>, store: Arc<dyn KeyValueStore>, config: RingConfig) -> Self {
        Self {
            ring,
            store,
            config,
            active: Mutex::new(None),
            last_outcome: RwLock::new(None),
        }
    }

    /// Whether a removal is currently in flight.
    pub fn is_removing(&self) -> bool {
        self.active.lock().is_some()
    }

    /// The node currently being removed, if any.
    pub fn removing_node(&self) -> Option<String> {
        self.active.lock().clone()
    }

    /// Outcome of the most recent removal attempt, successful or not.
    pub fn last_outcome(&self) -> Option<RemovalOutcome> {
        self.last_outcome.read().clone()
    }

    /// Remove a node from the ring, migrating every hash it owns to its
    /// ring successor first. Returns the successor's name — the new owner of
    /// the departing node's former traffic.
    ///
    /// If any per-hash unit fails the removal is aborted: the node stays on
    /// the ring and its unmigrated keys stay reachable at the old owner.
    /// Retrying re-reads the current owned-hash set, so hashes that already
    /// moved before the failure are not migrated twice.
    pub async fn remove_node(&self, departing: &str) -> Result<String> {
        if !self.ring.contains(departing) {
            return Err(Error::NodeNotFound(departing.to_string()));
        }

        let _guard = self.claim(departing)?;

        let successor = self.ring.successor_of(departing)?;
        let hashes = self.ring.hashes_owned_by(departing)?;
        let total = hashes.len();

        if successor == departing {
            // Last node on the ring: there is nowhere to migrate to. The
            // ring becomes empty and any values still stored under the node
            // are orphaned at their old addresses.
            if total > 0 {
                warn!(
                    node = departing,
                    orphaned = total,
                    "removing last ring node; its keys have no successor"
                );
            }
            self.ring.remove_node(departing)?;
            self.record_outcome(RemovalOutcome {
                departing: departing.to_string(),
                successor: successor.clone(),
                total,
                migrated: 0,
                skipped: total,
                failed: Vec::new(),
            });
            return Ok(successor);
        }

        info!(
            node = departing,
            successor = %successor,
            hashes = total,
            "starting node removal"
        );

        let ledger = Arc::new(MigrationLedger::begin(&hashes));
        if total > 0 {
            self.migrate_all(departing, &successor, hashes, &ledger)
                .await;
        }

        ledger.fail_pending("migration unit did not complete");
        let failed = ledger.failures();
        let outcome = RemovalOutcome {
            departing: departing.to_string(),
            successor: successor.clone(),
            total,
            migrated: ledger.done_count(),
            skipped: ledger.skipped_count(),
            failed: failed.clone(),
        };

        if !failed.is_empty() {
            error!(
                node = departing,
                failed = failed.len(),
                total,
                "removal aborted, ring unchanged"
            );
            self.record_outcome(outcome);
            return Err(MigrationError::Failed {
                failed: failed.len(),
                total,
            }
            .into());
        }

        // Barrier passed: every key is reachable at the successor, the old
        // position can go.
        self.ring.remove_node(departing)?;
        info!(
            node = departing,
            successor = %successor,
            migrated = outcome.migrated,
            skipped = outcome.skipped,
            "node removed"
        );
        self.record_outcome(outcome);

        Ok(successor)
    }

    /// Scatter one migration unit per hash, bounded by the configured
    /// concurrency limit, and wait for all of them.
    async fn migrate_all(
        &self,
        departing: &str,
        successor: &str,
        hashes: Vec<u32>,
        ledger: &Arc<MigrationLedger>,
    ) {
        let limit = self.config.max_concurrent_migrations.max(1);
        let mut pending = hashes.into_iter();
        let mut units: JoinSet<(u32, Result<UnitResult>)> = JoinSet::new();

        loop {
            while units.len() < limit {
                let Some(hash) = pending.next() else { break };
                let ring = Arc::clone(&self.ring);
                let store = Arc::clone(&self.store);
                let from = departing.to_string();
                let to = successor.to_string();
                let deadline = self.config.migration_timeout;

                units.spawn(async move {
                    let result = match tokio::time::timeout(
                        deadline,
                        migrate_one(&ring, store.as_ref(), &from, &to, hash),
                    )
                    .await
                    {
                        Ok(result) => result,
                        Err(_) => Err(Error::Timeout),
                    };
                    (hash, result)
                });
            }

            let Some(joined) = units.join_next().await else {
                break;
            };

            match joined {
                Ok((hash, Ok(UnitResult::Moved))) => ledger.mark_done(hash),
                Ok((hash, Ok(UnitResult::SkippedMissing))) => {
                    debug!(hash, "nothing stored at old owner, skipping");
                    ledger.mark_skipped(hash);
                }
                Ok((hash, Err(err))) => {
                    warn!(hash, error = %err, "migration unit failed");
                    ledger.mark_failed(hash, err.to_string());
                }
                Err(join_err) => {
                    // The hash stays pending in the ledger and is swept to
                    // failed at the barrier.
                    error!(error = %join_err, "migration unit panicked");
                }
            }
        }
    }

    /// Reserve the single removal slot, or report who holds it.
    fn claim(&self, departing: &str) -> Result<RemovalGuard<'_>> {
        let mut active = self.active.lock();
        if let Some(current) = active.as_ref() {
            return Err(MigrationError::RemovalInProgress(current.clone()).into());
        }
        *active = Some(departing.to_string());
        Ok(RemovalGuard { slot: &self.active })
    }

    fn record_outcome(&self, outcome: RemovalOutcome) {
        *self.last_outcome.write() = Some(outcome);
    }
}

impl std::fmt::Debug for MembershipCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembershipCoordinator")
            .field("removing_node", &self.removing_node())
            .finish()
    }
}

/// Clears the removal slot when the removal finishes or its future is
/// dropped mid-flight.
struct RemovalGuard<'a> {
    slot: &'a Mutex<Option<String>>,
}

impl Drop for RemovalGuard<'_> {
    fn drop(&mut self) {
        *self.slot.lock() = None;
    }
}

/// Move one hash from the departing node to its successor.
///
/// Read from the old address, write to the new one, re-record ownership on
/// the ring, then delete the old copy. The value is reachable at the old
/// address until the successor's copy is written, and at the new address
/// from then on — at no point at neither.
async fn migrate_one(
    ring: &Ring,
    store: &dyn KeyValueStore,
    departing: &str,
    successor: &str,
    hash: u32,
) -> Result<UnitResult> {
    let Some(value) = store.get(departing, hash).await? else {
        return Ok(UnitResult::SkippedMissing);
    };

    store.set(successor, hash, value).await?;
    ring.record_hash(successor, hash)?;
    store.delete(departing, hash).await?;
    ring.forget_hash(departing, hash)?;

    Ok(UnitResult::Moved)
}
