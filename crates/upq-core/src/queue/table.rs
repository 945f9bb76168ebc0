//! Task records in insertion order plus the payload store.

use std::collections::HashMap;

use crate::payload::{Destination, Payload, TransferRequest};
use crate::scheduler::TaskBoard;
use crate::task::{TaskId, TaskRecord, TaskSnapshot, TaskStatus};
use crate::transport::{Settlement, TransferJob};

use super::stats::QueueStats;

/// Ids are handed out in increasing order and records are only ever removed,
/// never reordered, so `records` stays sorted by id.
#[derive(Debug)]
pub(crate) struct TaskTable {
    records: Vec<TaskRecord>,
    payloads: HashMap<TaskId, Payload>,
    next_id: u64,
}

impl Default for TaskTable {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            payloads: HashMap::new(),
            next_id: 1,
        }
    }
}

impl TaskTable {
    pub(crate) fn insert(&mut self, request: TransferRequest, destination: &Destination) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.records.push(TaskRecord::new(
            id,
            request.name,
            request.size,
            destination.clone(),
        ));
        self.payloads.insert(id, request.payload);
        id
    }

    pub(crate) fn get(&self, id: TaskId) -> Option<&TaskRecord> {
        let i = self.position(id)?;
        Some(&self.records[i])
    }

    fn get_mut(&mut self, id: TaskId) -> Option<&mut TaskRecord> {
        let i = self.position(id)?;
        Some(&mut self.records[i])
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.records.binary_search_by_key(&id, |r| r.id()).ok()
    }

    /// Returns true if the stored progress changed.
    pub(crate) fn raise_progress(&mut self, id: TaskId, percent: u8) -> bool {
        self.get_mut(id)
            .map(|r| r.raise_progress(percent))
            .unwrap_or(false)
    }

    /// error | canceled -> queued. False for any other state or unknown id.
    pub(crate) fn requeue(&mut self, id: TaskId) -> bool {
        self.get_mut(id).map(|r| r.requeue()).unwrap_or(false)
    }

    /// Clears the settling mark once the terminal event is out. Returns true if it was set.
    pub(crate) fn finish_settling(&mut self, id: TaskId) -> bool {
        self.get_mut(id)
            .map(TaskRecord::finish_settling)
            .unwrap_or(false)
    }

    /// Removes every settled `done` record. Returns how many were removed.
    pub(crate) fn clear_completed(&mut self) -> usize {
        let before = self.records.len();
        let payloads = &mut self.payloads;
        self.records.retain(|r| {
            if r.status() == TaskStatus::Done && !r.is_settling() {
                payloads.remove(&r.id());
                false
            } else {
                true
            }
        });
        before - self.records.len()
    }

    pub(crate) fn snapshot(&self) -> Vec<TaskSnapshot> {
        self.records.iter().map(TaskRecord::snapshot).collect()
    }

    pub(crate) fn stats(&self) -> QueueStats {
        QueueStats::from_records(&self.records)
    }

    #[cfg(test)]
    pub(crate) fn has_payload(&self, id: TaskId) -> bool {
        self.payloads.contains_key(&id)
    }
}

impl TaskBoard for TaskTable {
    fn first_queued(&self) -> Option<TaskId> {
        self.records
            .iter()
            .find(|r| r.status() == TaskStatus::Queued)
            .map(TaskRecord::id)
    }

    fn start_upload(&mut self, id: TaskId) -> Option<TransferJob> {
        let payload = self.payloads.get(&id)?.clone();
        let record = self.get_mut(id)?;
        if !record.begin_upload() {
            return None;
        }
        Some(TransferJob {
            id,
            name: record.name().to_string(),
            size: record.size(),
            payload,
            destination: record.destination().clone(),
        })
    }

    fn finish_upload(&mut self, id: TaskId, settlement: &Settlement) -> bool {
        let applied = self
            .get_mut(id)
            .map(|r| r.settle(settlement))
            .unwrap_or(false);
        // Done tasks can never be retried, so their bytes are no longer needed.
        if applied && *settlement == Settlement::Success {
            self.payloads.remove(&id);
        }
        applied
    }
}
