//! Worker pool for parallel vanity address search.
//!
//! This module provides:
//! - Multi-threaded CPU workers
//! - The messages workers send to the result and progress consumers
//! - A cancellation token workers poll between iterations

mod cpu;
mod pool;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::crypto::Keypair;

pub use cpu::CpuWorker;
pub use pool::{PoolSettings, WorkerPool};

/// A keypair whose address satisfied the pattern.
#[derive(Debug, Clone)]
pub struct MatchEvent {
    pub keypair: Keypair,
    /// The ID of the worker that found this result
    pub worker_id: usize,
}

/// Keys attempted by one worker since its previous flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub worker_id: usize,
    pub keys: u64,
}

/// Cooperative cancellation shared by the workers and their consumers.
#[derive(Debug, Clone, Default)]
pub struct Cancel(Arc<AtomicBool>);

impl Cancel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals every holder of this token to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
