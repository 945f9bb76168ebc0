//! Prints task notifications to stdout during `upq upload`.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Mutex;
use upq_core::notify::{Notification, NotificationEvent, NotificationSink};
use upq_core::TaskId;

/// Progress lines are printed once per this many percent.
const PROGRESS_STEP: u8 = 10;

/// Human-readable lines, or one JSON object per event with `--json`.
pub struct PrintSink {
    json: bool,
    last_step: Mutex<HashMap<TaskId, u8>>,
}

impl PrintSink {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            last_step: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the line to print for `n`, if any. Text mode thins progress to `PROGRESS_STEP`s.
    pub(crate) fn render(&self, n: &Notification) -> Option<String> {
        if self.json {
            return serde_json::to_string(n).ok();
        }
        let mut last = self
            .last_step
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match n.event {
            NotificationEvent::Progress(p) => {
                let step = p / PROGRESS_STEP;
                let prev = last.entry(n.task_id).or_insert(0);
                if step <= *prev || p == 100 {
                    return None;
                }
                *prev = step;
            }
            NotificationEvent::Started => {
                last.insert(n.task_id, 0);
            }
            _ => {
                last.remove(&n.task_id);
            }
        }
        Some(n.to_string())
    }
}

impl NotificationSink for PrintSink {
    fn notify(&self, notification: &Notification) {
        if let Some(line) = self.render(notification) {
            let mut out = std::io::stdout().lock();
            let _ = writeln!(out, "{}", line);
        }
    }
}
