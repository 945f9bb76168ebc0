//! Bounded admission scheduler.
//!
//! Owns the running count and the cancellation registry. Task records live in
//! the queue facade; the scheduler reads and transitions them only through the
//! [`TaskBoard`] trait, so the facade stays the single writer of status and
//! progress.
//!
//! `admit` is synchronous: the scan for the next queued task, the move to
//! `uploading`, the running-count increment and the handle registration all
//! happen in one call with no suspension point, so redundant or concurrent
//! triggers (add, retry, settlement) can neither over-admit nor admit the same
//! task twice.

use crate::registry::CancelRegistry;
use crate::task::TaskId;
use crate::transport::{AbortHandle, AbortSignal, Settlement, TransferJob};

/// Facade-side view of the task collection used by the scheduler.
pub trait TaskBoard {
    /// First task in insertion order whose status is `queued`.
    fn first_queued(&self) -> Option<TaskId>;
    /// Moves `id` from `queued` to `uploading` and returns what the transport needs.
    fn start_upload(&mut self, id: TaskId) -> Option<TransferJob>;
    /// Writes the terminal status for a settled transfer.
    fn finish_upload(&mut self, id: TaskId, settlement: &Settlement) -> bool;
}

/// A task that was just admitted; the caller starts its transfer.
#[derive(Debug)]
pub struct Admission {
    pub job: TransferJob,
    pub abort: AbortSignal,
}

#[derive(Debug)]
pub struct Scheduler {
    limit: usize,
    running: usize,
    registry: CancelRegistry,
}

impl Scheduler {
    /// `limit` below 1 is treated as 1.
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            running: 0,
            registry: CancelRegistry::new(),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn running(&self) -> usize {
        self.running
    }

    pub fn registry(&self) -> &CancelRegistry {
        &self.registry
    }

    /// Admits queued tasks in FIFO order while a slot is free.
    ///
    /// A no-op when all slots are taken or nothing is queued.
    pub fn admit<B: TaskBoard + ?Sized>(&mut self, board: &mut B) -> Vec<Admission> {
        let mut admitted = Vec::new();
        while self.running < self.limit {
            let Some(id) = board.first_queued() else {
                break;
            };
            let Some(job) = board.start_upload(id) else {
                tracing::warn!(task_id = %id, "queued task could not start; admission stopped");
                break;
            };
            self.running += 1;
            let handle = AbortHandle::new();
            let abort = handle.signal();
            self.registry.register(id, handle);
            tracing::debug!(task_id = %id, running = self.running, limit = self.limit, "admitted");
            admitted.push(Admission { job, abort });
        }
        admitted
    }

    /// Fires the abort handle of an uploading task. False if `id` is not uploading.
    pub fn cancel(&self, id: TaskId) -> bool {
        self.registry.invoke(id)
    }

    /// Settlement bookkeeping, in order: drop the abort handle, write the
    /// terminal status, free the slot, then backfill it.
    pub fn settle<B: TaskBoard + ?Sized>(
        &mut self,
        id: TaskId,
        settlement: &Settlement,
        board: &mut B,
    ) -> Vec<Admission> {
        let was_running = self.registry.clear(id);
        if !board.finish_upload(id, settlement) {
            tracing::warn!(task_id = %id, "settlement for a task that was not uploading");
        }
        if was_running {
            self.running = self.running.saturating_sub(1);
        }
        tracing::debug!(task_id = %id, ?settlement, running = self.running, "settled");
        self.admit(board)
    }
}

#[cfg(test)]
mod tests;
