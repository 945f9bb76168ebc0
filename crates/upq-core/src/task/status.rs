//! Task status and its allowed transitions.

use serde::{Deserialize, Serialize};

/// Lifecycle state of one upload task.
///
/// `Done`, `Error` and `Canceled` are terminal for a transfer attempt; only
/// `Error` and `Canceled` may go back to `Queued` (retry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Queued,
    Uploading,
    Done,
    Error,
    Canceled,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Queued => "queued",
            TaskStatus::Uploading => "uploading",
            TaskStatus::Done => "done",
            TaskStatus::Error => "error",
            TaskStatus::Canceled => "canceled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Error | TaskStatus::Canceled)
    }

    /// True for states `retry` accepts.
    pub fn is_retryable(self) -> bool {
        matches!(self, TaskStatus::Error | TaskStatus::Canceled)
    }

    /// Whether `self -> next` is a permitted transition.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Queued, Uploading)
                | (Uploading, Done)
                | (Uploading, Error)
                | (Uploading, Canceled)
                | (Error, Queued)
                | (Canceled, Queued)
        )
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
