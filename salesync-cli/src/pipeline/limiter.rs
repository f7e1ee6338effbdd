//! Bound on concurrently running uploads
//!
//! Semaphore-based: each upload holds a permit for its whole run, so at most
//! `max_in_flight` pipelines talk to the Sheets API at once.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Debug, Clone)]
pub struct UploadLimiter {
    semaphore: Arc<Semaphore>,
    max_in_flight: usize,
    uploads_started: Arc<AtomicU64>,
    uploads_waited: Arc<AtomicU64>,
}

impl UploadLimiter {
    pub fn new(max_in_flight: usize) -> Self {
        let max_in_flight = max_in_flight.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_in_flight)),
            max_in_flight,
            uploads_started: Arc::new(AtomicU64::new(0)),
            uploads_waited: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Wait for a free slot; the slot is released when the permit drops
    pub async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        if self.semaphore.available_permits() == 0 {
            self.uploads_waited.fetch_add(1, Ordering::Relaxed);
            debug!(
                "Upload limiter: waiting for a slot ({} in flight)",
                self.max_in_flight
            );
        }

        let permit = self.semaphore.clone().acquire_owned().await.ok()?;
        self.uploads_started.fetch_add(1, Ordering::Relaxed);
        debug!(
            "Upload limiter: slot acquired ({}/{} in flight)",
            self.max_in_flight - self.semaphore.available_permits(),
            self.max_in_flight
        );
        Some(permit)
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    pub fn stats(&self) -> LimiterStats {
        LimiterStats {
            max_in_flight: self.max_in_flight,
            available: self.available(),
            uploads_started: self.uploads_started.load(Ordering::Relaxed),
            uploads_waited: self.uploads_waited.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterStats {
    pub max_in_flight: usize,
    pub available: usize,
    pub uploads_started: u64,
    pub uploads_waited: u64,
}
