//! CPU-based worker for vanity address search.

use std::time::{Duration, Instant};

use crossbeam_channel::{Sender, TrySendError};
use rand::rngs::StdRng;
use rand::RngCore;
use tracing::{debug, info, trace};

use crate::crypto::{KeyGenerator, Keypair};
use crate::error::Result;
use crate::matcher::Pattern;

use super::{Cancel, MatchEvent, Progress};

/// Search loop states. There is no terminal state; the loop ends only when
/// cancelled or when nobody is left to receive matches. A keypair still in
/// `Found` when cancellation lands is delivered before the worker exits.
enum WorkerState {
    Generating,
    Testing(Keypair),
    Found(Keypair),
}

/// A CPU worker that generates and tests keypairs.
pub struct CpuWorker<R = StdRng> {
    /// Worker ID
    id: usize,
    /// The pattern to match against
    pattern: Pattern,
    generator: KeyGenerator<R>,
    match_tx: Sender<MatchEvent>,
    progress_tx: Sender<Progress>,
    cancel: Cancel,
    flush_interval: Duration,
}

impl<R: RngCore> CpuWorker<R> {
    pub fn new(
        id: usize,
        pattern: Pattern,
        generator: KeyGenerator<R>,
        match_tx: Sender<MatchEvent>,
        progress_tx: Sender<Progress>,
        cancel: Cancel,
        flush_interval: Duration,
    ) -> Self {
        Self {
            id,
            pattern,
            generator,
            match_tx,
            progress_tx,
            cancel,
            flush_interval,
        }
    }

    /// Runs the worker loop.
    ///
    /// Generates keypairs and tests them against the pattern until:
    /// - The cancellation token is set
    /// - The match channel is closed
    /// - The random source fails (returned as an error)
    pub fn run(mut self) -> Result<()> {
        debug!(worker = self.id, "worker started");

        let mut state = WorkerState::Generating;
        let mut keys_checked: u64 = 0;
        let mut last_flush = Instant::now();

        while !self.cancel.is_cancelled() {
            state = match state {
                WorkerState::Generating => WorkerState::Testing(self.generator.generate()?),
                WorkerState::Testing(keypair) => {
                    keys_checked += 1;
                    if self.test(&keypair) {
                        WorkerState::Found(keypair)
                    } else {
                        WorkerState::Generating
                    }
                }
                WorkerState::Found(keypair) => {
                    info!(worker = self.id, address = %keypair.address(), "worker found address");
                    let event = MatchEvent {
                        keypair,
                        worker_id: self.id,
                    };
                    if !self.emit(event) {
                        self.flush(keys_checked);
                        debug!(worker = self.id, "match channel closed");
                        return Ok(());
                    }
                    WorkerState::Generating
                }
            };

            if last_flush.elapsed() >= self.flush_interval {
                if self.flush(keys_checked) {
                    keys_checked = 0;
                }
                last_flush = Instant::now();
            }
        }

        if let WorkerState::Found(keypair) = state {
            self.emit(MatchEvent {
                keypair,
                worker_id: self.id,
            });
        }

        self.flush(keys_checked);
        debug!(worker = self.id, "worker stopped");
        Ok(())
    }

    #[inline]
    fn test(&self, keypair: &Keypair) -> bool {
        // Case-insensitive matching folds to lowercase anyway, so the
        // checksum casing is only computed when it can matter.
        let address = if self.pattern.is_case_sensitive() {
            keypair.address().to_checksum()
        } else {
            keypair.address().to_hex_prefixed()
        };
        self.pattern.matches(&address).is_match()
    }

    /// Hands a match to the result handler, waiting as long as it takes.
    ///
    /// Cancellation does not abandon a found key. Returns false only when the
    /// receiver is gone.
    fn emit(&self, event: MatchEvent) -> bool {
        self.match_tx.send(event).is_ok()
    }

    /// Reports the local counter without blocking.
    ///
    /// Returns true if the counter may be reset.
    fn flush(&self, keys: u64) -> bool {
        if keys == 0 {
            return true;
        }

        match self.progress_tx.try_send(Progress {
            worker_id: self.id,
            keys,
        }) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => true,
            Err(TrySendError::Full(_)) => {
                trace!(worker = self.id, keys, "progress channel full, keeping count");
                false
            }
        }
    }

    /// Returns the worker ID.
    pub fn id(&self) -> usize {
        self.id
    }
}
