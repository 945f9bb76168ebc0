//! Per-task driver: runs one transfer and reports back to the queue.
//!
//! Every notification for a task is emitted from its driver, which keeps the
//! per-task event order: started, progress..., then exactly one terminal event.
//! A settled task stays marked as settling until its terminal event is out,
//! so a retry cannot start a new attempt ahead of it.

use std::sync::Arc;

use crate::notify::NotificationEvent;
use crate::scheduler::Admission;
use crate::task::TaskId;
use crate::transport::{progress_channel, Settlement};

use super::Shared;

pub(super) async fn run_transfer(shared: Arc<Shared>, admission: Admission) {
    let Admission { job, abort } = admission;
    let id = job.id;
    let name = job.name.clone();
    shared.emit(id, &name, NotificationEvent::Started);

    let (reporter, mut progress_rx) = progress_channel();
    let transport = Arc::clone(&shared.transport);
    // A panicking transport only fails its own task: the panic surfaces as a JoinError.
    let mut transfer =
        tokio::spawn(async move { transport.transfer(job, reporter, abort).await });

    let settlement = loop {
        tokio::select! {
            Some(percent) = progress_rx.recv() => record_progress(&shared, id, &name, percent),
            joined = &mut transfer => {
                break joined.unwrap_or_else(|e| {
                    Settlement::Failure(format!("transport task failed: {}", e))
                });
            }
        }
    };
    while let Ok(percent) = progress_rx.try_recv() {
        record_progress(&shared, id, &name, percent);
    }

    settle(&shared, id, &name, settlement);
}

fn record_progress(shared: &Arc<Shared>, id: TaskId, name: &str, percent: u8) {
    let changed = {
        let mut state = shared.lock();
        let changed = state.tasks.raise_progress(id, percent);
        if changed {
            shared.publish(&state);
        }
        changed
    };
    if changed {
        shared.emit(id, name, NotificationEvent::Progress(percent.min(100)));
    }
}

fn settle(shared: &Arc<Shared>, id: TaskId, name: &str, settlement: Settlement) {
    let admitted = {
        let mut state = shared.lock();
        let super::QueueState { tasks, scheduler } = &mut *state;
        let admitted = scheduler.settle(id, &settlement, tasks);
        shared.publish(&state);
        admitted
    };
    shared.launch(admitted);

    let event = match settlement {
        Settlement::Success => {
            tracing::info!(task_id = %id, name, "upload completed");
            NotificationEvent::Succeeded
        }
        Settlement::Failure(message) => {
            tracing::warn!(task_id = %id, name, "upload failed: {}", message);
            NotificationEvent::Failed(message)
        }
        Settlement::Aborted => {
            tracing::info!(task_id = %id, name, "upload canceled");
            NotificationEvent::Canceled
        }
    };
    shared.emit(id, name, event);

    // Until this point `retry` refuses the task and the queue does not count as idle.
    let mut state = shared.lock();
    if state.tasks.finish_settling(id) {
        shared.publish(&state);
    }
}
