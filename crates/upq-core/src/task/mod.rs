//! Task records: identity, status state machine, and observable snapshots.

mod record;
mod status;

pub use record::{TaskRecord, TaskSnapshot};
pub use status::TaskStatus;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Task identifier. Sequential per queue, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(TaskId)
    }
}
