#![allow(dead_code)]

pub mod transports;
pub mod upload_server;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use upq_core::notify::{Notification, NotificationEvent, NotificationSink};
use upq_core::payload::TransferRequest;
use upq_core::task::TaskId;

/// Polls `cond` until it holds; panics after 5 seconds.
pub async fn wait_until<F: FnMut() -> bool>(what: &str, mut cond: F) {
    let res = tokio::time::timeout(Duration::from_secs(5), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(res.is_ok(), "timed out waiting for: {}", what);
}

pub fn requests(names: &[&str]) -> Vec<TransferRequest> {
    names
        .iter()
        .map(|n| TransferRequest::from_bytes(*n, vec![0u8; 100]))
        .collect()
}

/// Sink that keeps every notification for later inspection.
#[derive(Default)]
pub struct RecordingSink {
    seen: Mutex<Vec<Notification>>,
    /// Blocks the emitting driver this long before recording a `Failed` event.
    failure_delay: Option<Duration>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn slow_on_failure(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            failure_delay: Some(delay),
            ..Self::default()
        })
    }

    pub fn events(&self, id: TaskId) -> Vec<NotificationEvent> {
        self.for_task(id).into_iter().map(|n| n.event).collect()
    }

    pub fn for_task(&self, id: TaskId) -> Vec<Notification> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.task_id == id)
            .cloned()
            .collect()
    }

    pub fn terminal_count(&self, id: TaskId) -> usize {
        self.for_task(id).iter().filter(|n| n.is_terminal()).count()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: &Notification) {
        if let (Some(delay), NotificationEvent::Failed(_)) = (self.failure_delay, &notification.event) {
            std::thread::sleep(delay);
        }
        self.seen.lock().unwrap().push(notification.clone());
    }
}
