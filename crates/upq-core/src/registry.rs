//! Cancellation registry: task id -> live abort handle.
//!
//! A handle is present exactly while the task is uploading: the scheduler
//! registers it in the same critical section that moves the task to
//! `uploading`, and clears it before the task's terminal status is written.
//! That makes `invoke` on any other task a harmless no-op.

use std::collections::HashMap;

use crate::task::TaskId;
use crate::transport::AbortHandle;

#[derive(Debug, Default)]
pub struct CancelRegistry {
    handles: HashMap<TaskId, AbortHandle>,
}

impl CancelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the abort handle of a task that just started uploading.
    pub fn register(&mut self, id: TaskId, handle: AbortHandle) {
        if self.handles.insert(id, handle).is_some() {
            tracing::warn!(task_id = %id, "replaced a live abort handle");
        }
    }

    /// Invokes the handle for `id`. Returns whether one existed.
    /// The entry stays registered until the transfer settles.
    pub fn invoke(&self, id: TaskId) -> bool {
        match self.handles.get(&id) {
            Some(handle) => {
                handle.invoke();
                true
            }
            None => false,
        }
    }

    /// Drops the handle once the transfer has settled.
    pub fn clear(&mut self, id: TaskId) -> bool {
        self.handles.remove(&id).is_some()
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.handles.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
