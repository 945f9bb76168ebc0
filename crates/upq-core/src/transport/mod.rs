//! Transport boundary: the collaborator that actually moves bytes.
//!
//! The scheduler hands each admitted task to a [`Transport`] together with a
//! [`ProgressReporter`] (per-task progress channel) and an [`AbortSignal`]
//! (the transport-side end of the task's abort handle). Whatever happens on
//! the wire, the transport answers with exactly one [`Settlement`].

mod abort;
pub mod http;
mod progress;

pub use abort::{AbortHandle, AbortSignal};
pub use http::HttpTransport;
pub use progress::{progress_channel, ProgressReporter};

use async_trait::async_trait;

use crate::payload::{Destination, Payload};
use crate::task::{TaskId, TaskStatus};

/// Everything a transport needs to perform one upload.
#[derive(Debug, Clone)]
pub struct TransferJob {
    pub id: TaskId,
    pub name: String,
    pub size: u64,
    pub payload: Payload,
    pub destination: Destination,
}

/// Terminal outcome of one transfer attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Success,
    Failure(String),
    Aborted,
}

impl Settlement {
    pub(crate) fn terminal_status(&self) -> TaskStatus {
        match self {
            Settlement::Success => TaskStatus::Done,
            Settlement::Failure(_) => TaskStatus::Error,
            Settlement::Aborted => TaskStatus::Canceled,
        }
    }
}

/// Performs transfers. Implementations must settle every call, and should
/// settle promptly with [`Settlement::Aborted`] once `abort` fires; a transfer
/// that ignores its signal keeps its slot until it settles on its own.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn transfer(
        &self,
        job: TransferJob,
        progress: ProgressReporter,
        abort: AbortSignal,
    ) -> Settlement;
}
