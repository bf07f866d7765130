//! Configuration for the ring and its migration coordinator.

use crate::error::{Error, Result};
use std::time::Duration;

/// Configuration for a [`crate::cache::RingCache`] and its removal protocol.
#[derive(Debug, Clone)]
pub struct RingConfig {
    /// Deadline for each per-hash migration unit (read, write to the new
    /// owner, delete from the old owner). Exceeding it fails that unit and
    /// aborts the removal.
    pub migration_timeout: Duration,

    /// Maximum number of per-hash migration units in flight at once.
    pub max_concurrent_migrations: usize,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            migration_timeout: Duration::from_secs(5),
            max_concurrent_migrations: 32,
        }
    }
}

impl RingConfig {
    /// Set the per-hash migration deadline.
    pub fn with_migration_timeout(mut self, timeout: Duration) -> Self {
        self.migration_timeout = timeout;
        self
    }

    /// Set the migration concurrency limit.
    pub fn with_max_concurrent_migrations(mut self, max: usize) -> Self {
        self.max_concurrent_migrations = max;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.migration_timeout.is_zero() {
            return Err(Error::Config(
                "migration_timeout must be non-zero".to_string(),
            ));
        }
        if self.max_concurrent_migrations == 0 {
            return Err(Error::Config(
                "max_concurrent_migrations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
