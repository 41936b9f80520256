//! Global admission gate.
//!
//! # Responsibilities
//! - Cap the number of probes in flight across the whole run
//! - Derive each origin group's internal concurrency limit
//!
//! # Design Decisions
//! - A counting semaphore, independent of grouping and waves
//! - Large groups get a smaller local share so one host cannot hold
//!   every global permit

use tokio::sync::{Semaphore, SemaphorePermit};

use crate::engine::error::EngineError;

/// Run-wide cap on concurrent probes.
#[derive(Debug)]
pub struct AdmissionGate {
    semaphore: Semaphore,
    capacity: usize,
}

impl AdmissionGate {
    /// Create a gate admitting `capacity` probes at once (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Semaphore::new(capacity),
            capacity,
        }
    }

    /// Wait for a probe slot.
    ///
    /// Fails only if the gate has been closed.
    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>, EngineError> {
        self.semaphore.acquire().await.map_err(|_| EngineError::GateClosed)
    }

    /// Close the gate; pending and future acquisitions fail.
    ///
    /// Called when a run is aborted; queued endpoints never start.
    pub fn close(&self) {
        self.semaphore.close();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

/// Internal concurrency for one origin group.
///
/// `max(1, concurrency / (group_size / max_channels_per_host + 1))`,
/// with integer division throughout.
pub fn group_concurrency(concurrency: usize, group_size: usize, max_channels_per_host: usize) -> usize {
    let divisor = group_size / max_channels_per_host.max(1) + 1;
    (concurrency / divisor).max(1)
}
