// src/crawl/gate.rs
// =============================================================================
// A fixed-capacity token pool that bounds how many page fetches run at once.
//
// How it works:
// 1. acquire() waits until one of `capacity` tokens is free
// 2. the caller holds the returned GatePermit while fetching
// 3. dropping the permit hands the token back, on every exit path,
//    including early returns through `?`
//
// On top of tokio's Semaphore the gate counts tokens in use and remembers the
// highest count seen, so a run can report (and tests can check) how much
// parallelism actually happened.
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::CrawlError;

#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
    in_use: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    capacity: usize,
}

/// A held token. The token goes back to the gate when this is dropped.
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
    in_use: Arc<AtomicUsize>,
}

impl ConcurrencyGate {
    pub fn new(capacity: usize) -> Result<Self, CrawlError> {
        if capacity == 0 {
            return Err(CrawlError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            in_use: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
            capacity,
        })
    }

    pub async fn acquire(&self) -> Result<GatePermit, CrawlError> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| CrawlError::GateClosed)?;

        let now = self.in_use.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        Ok(GatePermit {
            _permit: permit,
            in_use: Arc::clone(&self.in_use),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tokens currently held.
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::SeqCst)
    }

    /// Most tokens ever held at the same time.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        // Runs before `_permit` is dropped, so in_use never exceeds the
        // number of semaphore permits actually held.
        self.in_use.fetch_sub(1, Ordering::SeqCst);
    }
}
