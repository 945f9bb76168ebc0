//! Upload queue facade.
//!
//! Public operations (`add`, `cancel`, `retry`, `clear_completed`) mutate the
//! task table and nudge the [`Scheduler`]. All state sits behind one mutex
//! that is only held for short synchronous sections, never across an await:
//! that is what makes admission atomic with respect to concurrent triggers.
//! Transfers run in per-task driver tasks spawned on the tokio runtime.

mod driver;
mod stats;
mod table;

pub use stats::QueueStats;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::control::{ControlCommand, ControlReply};
use crate::error::QueueError;
use crate::notify::{Notification, NotificationEvent, NotificationSink};
use crate::payload::{Destination, TransferRequest};
use crate::scheduler::{Admission, Scheduler};
use crate::task::{TaskId, TaskSnapshot};
use crate::transport::Transport;

use self::table::TaskTable;

#[derive(Debug)]
struct QueueState {
    tasks: TaskTable,
    scheduler: Scheduler,
}

impl QueueState {
    /// Runs admission and returns what must be launched.
    fn admit(&mut self) -> Vec<Admission> {
        let QueueState { tasks, scheduler } = self;
        scheduler.admit(tasks)
    }
}

struct Shared {
    state: Mutex<QueueState>,
    transport: Arc<dyn Transport>,
    sink: Arc<dyn NotificationSink>,
    runtime: Handle,
    stats_tx: watch::Sender<QueueStats>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publishes stats while the caller still holds the lock, so watchers
    /// never observe an older snapshot after a newer one.
    fn publish(&self, state: &QueueState) {
        self.stats_tx.send_replace(state.tasks.stats());
    }

    fn launch(self: &Arc<Self>, admitted: Vec<Admission>) {
        for admission in admitted {
            let shared = Arc::clone(self);
            self.runtime.spawn(driver::run_transfer(shared, admission));
        }
    }

    fn emit(&self, task_id: TaskId, name: &str, event: NotificationEvent) {
        self.sink.notify(&Notification {
            task_id,
            name: name.to_string(),
            event,
        });
    }
}

/// Bounded concurrent upload queue. Cheap to clone; clones share one queue.
#[derive(Clone)]
pub struct UploadQueue {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for UploadQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("UploadQueue")
            .field("limit", &state.scheduler.limit())
            .field("running", &state.scheduler.running())
            .field("tasks", &state.tasks.stats().total())
            .finish()
    }
}

impl UploadQueue {
    /// Creates a queue on the current tokio runtime with at most `concurrency` uploads in flight.
    pub fn new(
        concurrency: usize,
        transport: Arc<dyn Transport>,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self, QueueError> {
        Ok(Self::with_runtime(
            Handle::try_current()?,
            concurrency,
            transport,
            sink,
        ))
    }

    pub fn with_runtime(
        runtime: Handle,
        concurrency: usize,
        transport: Arc<dyn Transport>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let (stats_tx, _) = watch::channel(QueueStats::default());
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(QueueState {
                    tasks: TaskTable::default(),
                    scheduler: Scheduler::new(concurrency),
                }),
                transport,
                sink,
                runtime,
                stats_tx,
            }),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.shared.lock().scheduler.limit()
    }

    /// Queues one task per request (in order) and starts as many as slots allow.
    /// Never waits for a transfer.
    pub fn add(&self, requests: Vec<TransferRequest>, destination: Destination) -> Vec<TaskId> {
        let (ids, admitted) = {
            let mut state = self.shared.lock();
            let ids: Vec<TaskId> = requests
                .into_iter()
                .map(|r| state.tasks.insert(r, &destination))
                .collect();
            let admitted = state.admit();
            self.shared.publish(&state);
            (ids, admitted)
        };
        tracing::debug!(count = ids.len(), %destination, "tasks added");
        self.shared.launch(admitted);
        ids
    }

    /// Asks the transfer of `id` to abort. The task becomes `canceled` when
    /// the transport settles. Returns false (and does nothing) unless `id` is uploading.
    pub fn cancel(&self, id: TaskId) -> bool {
        let fired = self.shared.lock().scheduler.cancel(id);
        if fired {
            tracing::debug!(task_id = %id, "abort requested");
        }
        fired
    }

    /// Re-queues a task in `error` or `canceled` with progress reset.
    /// Returns false (and does nothing) for any other state, an unknown id, or
    /// a task whose terminal event has not been delivered yet (`stats().settling`).
    pub fn retry(&self, id: TaskId) -> bool {
        let admitted = {
            let mut state = self.shared.lock();
            if !state.tasks.requeue(id) {
                return false;
            }
            let admitted = state.admit();
            self.shared.publish(&state);
            admitted
        };
        tracing::debug!(task_id = %id, "retry queued");
        self.shared.launch(admitted);
        true
    }

    /// Removes every `done` record whose terminal event was delivered.
    /// Returns how many were removed.
    pub fn clear_completed(&self) -> usize {
        let mut state = self.shared.lock();
        let removed = state.tasks.clear_completed();
        if removed > 0 {
            self.shared.publish(&state);
        }
        removed
    }

    /// All records in insertion order.
    pub fn snapshot(&self) -> Vec<TaskSnapshot> {
        self.shared.lock().tasks.snapshot()
    }

    pub fn get(&self, id: TaskId) -> Option<TaskSnapshot> {
        self.shared.lock().tasks.get(id).map(|r| r.snapshot())
    }

    pub fn stats(&self) -> QueueStats {
        self.shared.lock().tasks.stats()
    }

    /// Receiver updated after every state change.
    pub fn watch_stats(&self) -> watch::Receiver<QueueStats> {
        self.shared.stats_tx.subscribe()
    }

    /// Resolves once nothing is queued or uploading.
    pub async fn wait_idle(&self) {
        let mut rx = self.watch_stats();
        // The sender lives in `self.shared`, so the channel cannot close here.
        let _ = rx.wait_for(QueueStats::is_idle).await;
    }

    /// Executes a control command (from the control socket).
    pub fn apply(&self, command: ControlCommand) -> ControlReply {
        let effect = |applied: bool| {
            if applied {
                ControlReply::Ok
            } else {
                ControlReply::Ignored
            }
        };
        match command {
            ControlCommand::Cancel(id) => effect(self.cancel(id)),
            ControlCommand::Retry(id) => effect(self.retry(id)),
            ControlCommand::Status => ControlReply::Tasks(self.snapshot()),
            ControlCommand::ClearCompleted => ControlReply::Cleared(self.clear_completed()),
        }
    }
}
