//! Worker pool management.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Sender;
use rand::RngCore;

use crate::crypto::KeyGenerator;
use crate::error::{Error, Result};
use crate::matcher::Pattern;

use super::{Cancel, CpuWorker, MatchEvent, Progress};

/// Pool sizing and worker timing.
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    /// Number of workers
    pub workers: usize,
    /// How often each worker reports its local key count
    pub flush_interval: Duration,
}

/// Cancels the pool if a worker thread unwinds, so siblings do not run on
/// with nobody joining them.
struct PanicGuard(Cancel);

impl Drop for PanicGuard {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.cancel();
        }
    }
}

/// Manages a pool of workers for parallel vanity address search.
pub struct WorkerPool {
    /// Worker thread handles (Option to allow taking during join)
    handles: Option<Vec<(usize, JoinHandle<Result<()>>)>>,
    cancel: Cancel,
}

impl WorkerPool {
    /// Spawns `settings.workers` workers, numbered from 1.
    ///
    /// Each worker owns an independently seeded key generator. The senders
    /// passed in are cloned into the workers and dropped here, so the
    /// channels close once every worker has exited.
    pub fn spawn(
        settings: &PoolSettings,
        pattern: &Pattern,
        match_tx: Sender<MatchEvent>,
        progress_tx: Sender<Progress>,
        cancel: Cancel,
    ) -> Result<Self> {
        Self::spawn_with(settings, pattern, match_tx, progress_tx, cancel, |_| {
            Ok(KeyGenerator::new()?)
        })
    }

    /// Like [`WorkerPool::spawn`], with `make_generator` supplying the key
    /// generator of each worker id.
    pub fn spawn_with<R, F>(
        settings: &PoolSettings,
        pattern: &Pattern,
        match_tx: Sender<MatchEvent>,
        progress_tx: Sender<Progress>,
        cancel: Cancel,
        mut make_generator: F,
    ) -> Result<Self>
    where
        R: RngCore + Send + 'static,
        F: FnMut(usize) -> Result<KeyGenerator<R>>,
    {
        let mut pool = Self {
            handles: Some(Vec::with_capacity(settings.workers)),
            cancel,
        };

        for id in 1..=settings.workers {
            let generator = make_generator(id)?;
            let worker = CpuWorker::new(
                id,
                pattern.clone(),
                generator,
                match_tx.clone(),
                progress_tx.clone(),
                pool.cancel.clone(),
                settings.flush_interval,
            );
            let cancel = pool.cancel.clone();

            let handle = thread::Builder::new()
                .name(format!("vanity-worker-{}", id))
                .spawn(move || {
                    let _guard = PanicGuard(cancel.clone());
                    let result = worker.run();
                    if result.is_err() {
                        cancel.cancel();
                    }
                    result
                })
                .map_err(Error::Spawn)?;

            if let Some(handles) = pool.handles.as_mut() {
                handles.push((id, handle));
            }
        }

        Ok(pool)
    }

    /// Blocks until every worker has terminated.
    ///
    /// Workers only terminate on cancellation, a closed match channel or a
    /// fatal error. The first error observed is returned.
    pub fn run(mut self) -> Result<()> {
        let mut outcome = Ok(());

        for (id, handle) in self.handles.take().unwrap_or_default() {
            let result = match handle.join() {
                Ok(result) => result,
                Err(_) => {
                    self.cancel.cancel();
                    Err(Error::WorkerPanicked(id))
                }
            };
            if outcome.is_ok() {
                outcome = result;
            }
        }

        outcome
    }

    /// Signals all workers to stop.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Returns the number of workers.
    pub fn num_workers(&self) -> usize {
        self.handles.as_ref().map_or(0, Vec::len)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Reached with live handles only when `run` was never called
        if let Some(handles) = self.handles.take() {
            self.stop();
            for (_, handle) in handles {
                let _ = handle.join();
            }
        }
    }
}
