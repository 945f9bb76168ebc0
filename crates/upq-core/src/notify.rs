//! Notification sink: observational status events, one stream per task.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::task::TaskId;

/// What happened to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "detail", rename_all = "lowercase")]
pub enum NotificationEvent {
    Started,
    Progress(u8),
    Succeeded,
    Failed(String),
    Canceled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub task_id: TaskId,
    pub name: String,
    #[serde(flatten)]
    pub event: NotificationEvent,
}

impl Notification {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.event,
            NotificationEvent::Succeeded | NotificationEvent::Failed(_) | NotificationEvent::Canceled
        )
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (id, name) = (self.task_id, &self.name);
        match &self.event {
            NotificationEvent::Started => write!(f, "[{id}] {name}: started"),
            NotificationEvent::Progress(p) => write!(f, "[{id}] {name}: {p}%"),
            NotificationEvent::Succeeded => write!(f, "[{id}] {name}: uploaded"),
            NotificationEvent::Failed(msg) => write!(f, "[{id}] {name}: failed: {msg}"),
            NotificationEvent::Canceled => write!(f, "[{id}] {name}: canceled"),
        }
    }
}

/// Receives task events. Called outside the queue lock; must not block for long.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&self, _notification: &Notification) {}
}

/// Writes events to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, n: &Notification) {
        match &n.event {
            NotificationEvent::Progress(_) => tracing::trace!(task_id = %n.task_id, "{}", n),
            NotificationEvent::Failed(_) => tracing::warn!(task_id = %n.task_id, "{}", n),
            _ => tracing::info!(task_id = %n.task_id, "{}", n),
        }
    }
}

/// Forwards events into an unbounded channel for an async consumer.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, notification: &Notification) {
        let _ = self.tx.send(notification.clone());
    }
}
