//! Aggregates per-worker key counts into a periodic running total.

use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use tracing::{info, trace};

use crate::worker::Progress;

pub struct ProgressAggregator {
    report_interval: Duration,
}

impl ProgressAggregator {
    pub fn new(report_interval: Duration) -> Self {
        Self { report_interval }
    }

    /// Accumulates counts until every sender is gone, logging the total at
    /// most once per `report_interval`. Returns the final total.
    pub fn run(self, rx: Receiver<Progress>) -> u64 {
        let start = Instant::now();
        let mut last_report = start;
        let mut total: u64 = 0;

        for progress in rx.iter() {
            total = total.saturating_add(progress.keys);
            trace!(
                worker = progress.worker_id,
                keys = progress.keys,
                "progress received"
            );

            if last_report.elapsed() >= self.report_interval {
                let elapsed = start.elapsed().as_secs_f64();
                let rate = if elapsed > 0.0 {
                    total as f64 / elapsed
                } else {
                    0.0
                };
                info!(
                    "Total keys checked: {} ({}/s)",
                    format_count(total),
                    format_number(rate as u64)
                );
                last_report = Instant::now();
            }
        }

        total
    }
}

/// Groups digits in thousands, e.g. `1,234,567`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Abbreviates large numbers, e.g. `1.50M`.
pub fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}
