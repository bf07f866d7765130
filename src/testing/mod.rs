//! Testing utilities for the ring and its removal protocol.
//!
//! Provides store doubles for failure injection:
//! - [`FailingStore`] — toggleable per-operation failures, for asserting
//!   that a failed migration aborts the removal and leaves the ring intact.
//! - [`SlowStore`] — fixed per-operation delay, for deadline and
//!   cancellation tests.

mod stores;

pub use stores::{FailingStore, SlowStore};

#[cfg(test)]
mod removal_e2e_tests;
