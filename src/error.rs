//! Error types for the hash ring and its migration protocol.

use thiserror::Error;

/// Result type alias for ring operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ring operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The ring has no nodes, so no key has an owner.
    ///
    /// This is a non-retryable precondition failure: callers must add a node
    /// before looking anything up, not retry the lookup.
    #[error("ring is empty: no node can own the key")]
    EmptyRing,

    /// An operation referenced a node name that is not on the ring.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// A new node's name hashed onto a position already held by another node.
    ///
    /// Silent overwrite would strand the existing node's keys, so the add is
    /// rejected instead.
    #[error("position collision: {name} hashes to {position}, already held by {existing}")]
    PositionCollision {
        name: String,
        existing: String,
        position: u32,
    },

    /// Migration errors during a node removal.
    #[error("migration error: {0}")]
    Migration(#[from] MigrationError),

    /// External store errors.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A migration unit exceeded its deadline.
    #[error("operation timed out")]
    Timeout,

    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
}

/// Errors from the node-removal migration protocol.
#[derive(Error, Debug)]
pub enum MigrationError {
    /// Another removal is already running; only one membership change at a
    /// time is allowed.
    #[error("a node removal is already in progress (removing {0})")]
    RemovalInProgress(String),

    /// One or more per-hash migration units failed. The removal was aborted
    /// and the ring left unchanged, so the removal is safe to retry.
    #[error("migration failed for {failed} of {total} hashes; ring unchanged")]
    Failed { failed: usize, total: usize },
}

/// External store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
