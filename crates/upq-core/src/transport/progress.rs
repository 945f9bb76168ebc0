//! Per-task progress channel from the transport back to the queue.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Buffered updates per task; when full, intermediate values are dropped
/// (the next larger value supersedes them).
const PROGRESS_BUFFER: usize = 16;

/// Creates the reporter handed to the transport and the receiver drained by the task driver.
pub fn progress_channel() -> (ProgressReporter, mpsc::Receiver<u8>) {
    let (tx, rx) = mpsc::channel(PROGRESS_BUFFER);
    let reporter = ProgressReporter {
        tx,
        last: Arc::new(AtomicU8::new(0)),
    };
    (reporter, rx)
}

/// Sends whole-percent progress for one transfer. Never blocks, so it can be
/// called from a curl callback inside `spawn_blocking` as well as async code.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    tx: mpsc::Sender<u8>,
    last: Arc<AtomicU8>,
}

impl ProgressReporter {
    /// Reports `percent` (clamped to 100). Values not above the last reported one are skipped.
    pub fn report(&self, percent: u8) {
        let percent = percent.min(100);
        let prev = self.last.fetch_max(percent, Ordering::AcqRel);
        if percent > prev {
            let _ = self.tx.try_send(percent);
        }
    }

    /// Reports `done / total` as a percentage; unknown or zero totals are ignored.
    pub fn report_fraction(&self, done: u64, total: u64) {
        if total == 0 {
            return;
        }
        let pct = (done.min(total) as u128 * 100 / total as u128) as u8;
        self.report(pct);
    }
}
