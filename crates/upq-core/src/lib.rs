pub mod config;
pub mod logging;

pub mod control;
pub mod error;
pub mod notify;
pub mod payload;
pub mod queue;
pub mod registry;
pub mod scheduler;
pub mod task;
pub mod transport;

pub use queue::{QueueStats, UploadQueue};
pub use task::{TaskId, TaskSnapshot, TaskStatus};
