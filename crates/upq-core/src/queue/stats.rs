//! Aggregate queue counters (CLI-friendly), recomputed after every change.

use serde::Serialize;

use crate::task::{TaskRecord, TaskStatus};

/// Snapshot of the whole queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub queued: usize,
    pub uploading: usize,
    pub done: usize,
    pub error: usize,
    pub canceled: usize,
    /// Settled tasks whose terminal event is still being delivered.
    pub settling: usize,
    /// Sum of sizes of tasks that count towards overall progress.
    pub total_bytes: u64,
    /// Bytes represented by their progress (done counts fully).
    pub bytes_done: u64,
}

impl QueueStats {
    pub(crate) fn from_records(records: &[TaskRecord]) -> Self {
        let mut stats = QueueStats::default();
        for r in records {
            match r.status() {
                TaskStatus::Queued => stats.queued += 1,
                TaskStatus::Uploading => stats.uploading += 1,
                TaskStatus::Done => stats.done += 1,
                TaskStatus::Error => stats.error += 1,
                TaskStatus::Canceled => stats.canceled += 1,
            }
            if r.is_settling() {
                stats.settling += 1;
            }
            if matches!(r.status(), TaskStatus::Error | TaskStatus::Canceled) {
                continue;
            }
            stats.total_bytes += r.size();
            stats.bytes_done += (r.size() as u128 * r.progress() as u128 / 100) as u64;
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.queued + self.uploading + self.done + self.error + self.canceled
    }

    /// Nothing queued, nothing in flight, and every terminal event delivered.
    pub fn is_idle(&self) -> bool {
        self.queued == 0 && self.uploading == 0 && self.settling == 0
    }

    /// Size-weighted percent over tasks that are neither failed nor canceled.
    pub fn overall_progress(&self) -> u8 {
        if self.total_bytes == 0 {
            return if self.queued + self.uploading == 0 { 100 } else { 0 };
        }
        (self.bytes_done.min(self.total_bytes) as u128 * 100 / self.total_bytes as u128) as u8
    }
}
