//! In-process transports for driving the queue from tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

use upq_core::transport::{AbortSignal, ProgressReporter, Settlement, TransferJob, Transport};

struct Pending {
    settle: oneshot::Sender<Settlement>,
    progress: ProgressReporter,
}

/// Transfers stay open until the test settles them by name.
#[derive(Default)]
pub struct ScriptedTransport {
    pending: Mutex<HashMap<String, Pending>>,
    started: Mutex<Vec<String>>,
    ignore_abort: bool,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A transport that never reacts to its abort signal.
    pub fn stubborn() -> Arc<Self> {
        Arc::new(Self {
            ignore_abort: true,
            ..Self::default()
        })
    }

    /// Names in the order their transfers began.
    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    pub fn is_open(&self, name: &str) -> bool {
        self.pending.lock().unwrap().contains_key(name)
    }

    pub fn progress(&self, name: &str, percent: u8) {
        let pending = self.pending.lock().unwrap();
        pending
            .get(name)
            .unwrap_or_else(|| panic!("{} is not in flight", name))
            .progress
            .report(percent);
    }

    pub fn finish(&self, name: &str, settlement: Settlement) {
        let pending = self
            .pending
            .lock()
            .unwrap()
            .remove(name)
            .unwrap_or_else(|| panic!("{} is not in flight", name));
        let _ = pending.settle.send(settlement);
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn transfer(
        &self,
        job: TransferJob,
        progress: ProgressReporter,
        abort: AbortSignal,
    ) -> Settlement {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(
            job.name.clone(),
            Pending {
                settle: tx,
                progress,
            },
        );
        self.started.lock().unwrap().push(job.name.clone());

        let outcome = |r: Result<Settlement, oneshot::error::RecvError>| {
            r.unwrap_or_else(|_| Settlement::Failure("test dropped transfer".into()))
        };
        if self.ignore_abort {
            return outcome(rx.await);
        }
        tokio::select! {
            r = rx => outcome(r),
            _ = abort.aborted() => {
                self.pending.lock().unwrap().remove(&job.name);
                Settlement::Aborted
            }
        }
    }
}

/// Settles on its own after a few progress steps; names starting with
/// "fail" fail. Tracks the peak number of concurrent transfers.
#[derive(Default)]
pub struct AutoTransport {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl AutoTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for AutoTransport {
    async fn transfer(
        &self,
        job: TransferJob,
        progress: ProgressReporter,
        abort: AbortSignal,
    ) -> Settlement {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let mut outcome = Settlement::Success;
        for pct in [25u8, 50, 75, 100] {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(3)) => progress.report(pct),
                _ = abort.aborted() => {
                    outcome = Settlement::Aborted;
                    break;
                }
            }
        }
        if outcome == Settlement::Success && job.name.starts_with("fail") {
            outcome = Settlement::Failure(format!("{} rejected", job.name));
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

/// Panics for the task named "boom", succeeds for everything else.
pub struct PanickingTransport;

#[async_trait]
impl Transport for PanickingTransport {
    async fn transfer(
        &self,
        job: TransferJob,
        _progress: ProgressReporter,
        _abort: AbortSignal,
    ) -> Settlement {
        if job.name == "boom" {
            panic!("transport exploded");
        }
        Settlement::Success
    }
}
