//! Control protocol for a running uploader: line commands and JSON replies.
//!
//! A controller (e.g. `upq cancel 3` in another shell) writes one command per
//! line to the control socket; the uploader answers each with one JSON line.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::task::{TaskId, TaskSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Cancel(TaskId),
    Retry(TaskId),
    Status,
    ClearCompleted,
}

impl ControlCommand {
    /// Parses `cancel <id>`, `retry <id>`, `status` or `clear`. Returns None for anything else.
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let verb = words.next()?;
        let arg = words.next();
        if words.next().is_some() {
            return None;
        }
        match (verb, arg) {
            ("cancel", Some(id)) => id.parse().ok().map(ControlCommand::Cancel),
            ("retry", Some(id)) => id.parse().ok().map(ControlCommand::Retry),
            ("status", None) => Some(ControlCommand::Status),
            ("clear", None) => Some(ControlCommand::ClearCompleted),
            _ => None,
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlCommand::Cancel(id) => write!(f, "cancel {}", id),
            ControlCommand::Retry(id) => write!(f, "retry {}", id),
            ControlCommand::Status => f.write_str("status"),
            ControlCommand::ClearCompleted => f.write_str("clear"),
        }
    }
}

/// Answer to one control command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reply", content = "detail", rename_all = "lowercase")]
pub enum ControlReply {
    /// The command changed something.
    Ok,
    /// The command was valid but had no effect (e.g. cancel on a queued task).
    Ignored,
    Tasks(Vec<TaskSnapshot>),
    Cleared(usize),
    /// The line could not be parsed.
    Invalid(String),
}

/// Default path for the control socket (XDG state dir, next to the log).
pub fn default_control_socket_path() -> std::io::Result<PathBuf> {
    let dir = xdg::BaseDirectories::with_prefix("upq")?.get_state_home();
    Ok(dir.join("control.sock"))
}
