//! Per-task record and the serializable snapshot handed to observers.

use serde::{Deserialize, Serialize};

use super::{TaskId, TaskStatus};
use crate::payload::Destination;
use crate::transport::Settlement;

/// One upload request tracked by the queue.
///
/// Identity and metadata are fixed at creation. Status, progress and the
/// error message only change through the transition methods below, which
/// reject anything the state machine does not allow.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    id: TaskId,
    name: String,
    size: u64,
    destination: Destination,
    progress: u8,
    status: TaskStatus,
    error_message: Option<String>,
    /// Settled, but the terminal event has not been delivered yet.
    settling: bool,
}

impl TaskRecord {
    pub(crate) fn new(id: TaskId, name: String, size: u64, destination: Destination) -> Self {
        Self {
            id,
            name,
            size,
            destination,
            progress: 0,
            status: TaskStatus::Queued,
            error_message: None,
            settling: false,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Present only while `status == Error`.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// True between settlement and delivery of the terminal event.
    pub fn is_settling(&self) -> bool {
        self.settling
    }

    /// queued -> uploading.
    pub(crate) fn begin_upload(&mut self) -> bool {
        self.transition(TaskStatus::Uploading)
    }

    /// Raises progress while uploading. Returns true if the value changed.
    pub(crate) fn raise_progress(&mut self, percent: u8) -> bool {
        let percent = percent.min(100);
        if self.status != TaskStatus::Uploading || percent <= self.progress {
            return false;
        }
        self.progress = percent;
        true
    }

    /// uploading -> done | error | canceled, depending on the settlement.
    pub(crate) fn settle(&mut self, settlement: &Settlement) -> bool {
        let next = settlement.terminal_status();
        if !self.transition(next) {
            return false;
        }
        match settlement {
            Settlement::Success => self.progress = 100,
            Settlement::Failure(message) => self.error_message = Some(message.clone()),
            Settlement::Aborted => {}
        }
        self.settling = true;
        true
    }

    /// Marks the terminal event as delivered. Returns false if it already was.
    pub(crate) fn finish_settling(&mut self) -> bool {
        std::mem::replace(&mut self.settling, false)
    }

    /// error | canceled -> queued, with progress and error cleared.
    /// Refused while the previous attempt is still settling.
    pub(crate) fn requeue(&mut self) -> bool {
        if self.settling || !self.transition(TaskStatus::Queued) {
            return false;
        }
        self.progress = 0;
        self.error_message = None;
        true
    }

    fn transition(&mut self, next: TaskStatus) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }
        self.status = next;
        true
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            id: self.id,
            name: self.name.clone(),
            size: self.size,
            destination: self.destination.clone(),
            progress: self.progress,
            status: self.status,
            error_message: self.error_message.clone(),
        }
    }
}

/// Point-in-time copy of a [`TaskRecord`], safe to hand out of the queue lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub id: TaskId,
    pub name: String,
    pub size: u64,
    pub destination: Destination,
    pub progress: u8,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}
