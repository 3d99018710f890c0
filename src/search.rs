//! Wires the worker pool to its two consumers.

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;

use crate::config::MatchPolicy;
use crate::error::{Error, Result};
use crate::handler::{KeystoreExport, ProgressAggregator, ResultHandler};
use crate::matcher::Pattern;
use crate::worker::{Cancel, PoolSettings, WorkerPool};

/// Progress messages buffered per worker before flushes start failing.
const PROGRESS_SLOTS_PER_WORKER: usize = 4;

#[derive(Debug, Clone, Copy)]
pub struct SearchSettings {
    pub pool: PoolSettings,
    /// Interval between cumulative progress reports
    pub report_interval: Duration,
    pub policy: MatchPolicy,
}

/// Final statistics of a finished search.
#[derive(Debug, Clone, Copy)]
pub struct Summary {
    /// Keys reported by workers
    pub keys: u64,
    pub matches: u64,
    pub elapsed: Duration,
}

impl Summary {
    /// Returns the average generation rate (keys per second).
    pub fn keys_per_second(&self) -> f64 {
        let elapsed = self.elapsed.as_secs_f64();
        if elapsed > 0.0 {
            self.keys as f64 / elapsed
        } else {
            0.0
        }
    }
}

/// Runs the search until it is cancelled, the match policy is satisfied or
/// a fatal error occurs.
///
/// Matches travel over a rendezvous channel, so a worker that finds one
/// waits until the result handler takes it. The handler keeps receiving
/// until every worker has exited, so no found key is lost to cancellation.
pub fn run(
    settings: &SearchSettings,
    pattern: &Pattern,
    export: Option<KeystoreExport>,
    cancel: Cancel,
) -> Result<Summary> {
    let (match_tx, match_rx) = bounded(0);
    let (progress_tx, progress_rx) =
        bounded(settings.pool.workers.max(1) * PROGRESS_SLOTS_PER_WORKER);

    let handler = ResultHandler::new(export, settings.policy, cancel.clone());
    let results = thread::Builder::new()
        .name("result-handler".into())
        .spawn(move || handler.run(match_rx))
        .map_err(Error::Spawn)?;

    let aggregator = ProgressAggregator::new(settings.report_interval);
    let progress = thread::Builder::new()
        .name("progress".into())
        .spawn(move || aggregator.run(progress_rx))
        .map_err(Error::Spawn)?;

    let start = Instant::now();
    let searched = WorkerPool::spawn(&settings.pool, pattern, match_tx, progress_tx, cancel)
        .and_then(WorkerPool::run);

    let matches = results
        .join()
        .map_err(|_| Error::HandlerPanicked("result handler"))?;
    let keys = progress
        .join()
        .map_err(|_| Error::HandlerPanicked("progress aggregator"))?;

    searched?;
    Ok(Summary {
        keys,
        matches: matches?,
        elapsed: start.elapsed(),
    })
}
