use super::*;
use crate::payload::{Destination, Payload};
use crate::task::TaskStatus;
use std::sync::Arc;

/// Minimal board: (id, status) pairs in insertion order.
#[derive(Default)]
struct FakeBoard {
    tasks: Vec<(TaskId, TaskStatus)>,
    starts: usize,
}

impl FakeBoard {
    fn with_queued(n: u64) -> Self {
        Self {
            tasks: (1..=n).map(|i| (TaskId(i), TaskStatus::Queued)).collect(),
            starts: 0,
        }
    }

    fn status(&self, id: u64) -> TaskStatus {
        self.tasks.iter().find(|(t, _)| t.0 == id).unwrap().1
    }

    fn uploading(&self) -> usize {
        self.tasks
            .iter()
            .filter(|(_, s)| *s == TaskStatus::Uploading)
            .count()
    }

    fn requeue(&mut self, id: u64) {
        let entry = self.tasks.iter_mut().find(|(t, _)| t.0 == id).unwrap();
        assert!(entry.1.can_transition_to(TaskStatus::Queued));
        entry.1 = TaskStatus::Queued;
    }
}

impl TaskBoard for FakeBoard {
    fn first_queued(&self) -> Option<TaskId> {
        self.tasks
            .iter()
            .find(|(_, s)| *s == TaskStatus::Queued)
            .map(|(id, _)| *id)
    }

    fn start_upload(&mut self, id: TaskId) -> Option<TransferJob> {
        let entry = self.tasks.iter_mut().find(|(t, _)| *t == id)?;
        if entry.1 != TaskStatus::Queued {
            return None;
        }
        entry.1 = TaskStatus::Uploading;
        self.starts += 1;
        Some(TransferJob {
            id,
            name: format!("t{}", id),
            size: 1,
            payload: Payload::Memory(Arc::from(vec![0u8])),
            destination: Destination::new("d"),
        })
    }

    fn finish_upload(&mut self, id: TaskId, settlement: &Settlement) -> bool {
        let Some(entry) = self.tasks.iter_mut().find(|(t, _)| *t == id) else {
            return false;
        };
        if entry.1 != TaskStatus::Uploading {
            return false;
        }
        entry.1 = settlement.terminal_status();
        true
    }
}

fn ids(admitted: &[Admission]) -> Vec<u64> {
    admitted.iter().map(|a| a.job.id.0).collect()
}

#[test]
fn admits_up_to_limit_in_fifo_order() {
    let mut sched = Scheduler::new(2);
    let mut board = FakeBoard::with_queued(3);
    let admitted = sched.admit(&mut board);
    assert_eq!(ids(&admitted), vec![1, 2]);
    assert_eq!(sched.running(), 2);
    assert_eq!(board.status(3), TaskStatus::Queued);
    assert!(sched.registry().contains(TaskId(1)));
    assert!(sched.registry().contains(TaskId(2)));
    assert!(!sched.registry().contains(TaskId(3)));
}

#[test]
fn admit_at_capacity_is_a_no_op() {
    let mut sched = Scheduler::new(2);
    let mut board = FakeBoard::with_queued(4);
    sched.admit(&mut board);
    let starts = board.starts;
    for _ in 0..3 {
        assert!(sched.admit(&mut board).is_empty());
    }
    assert_eq!(board.starts, starts);
    assert_eq!(sched.running(), 2);
    assert_eq!(board.uploading(), 2);
}

#[test]
fn admit_with_nothing_queued_is_a_no_op() {
    let mut sched = Scheduler::new(3);
    let mut board = FakeBoard::with_queued(1);
    assert_eq!(ids(&sched.admit(&mut board)), vec![1]);
    assert!(sched.admit(&mut board).is_empty());
    assert_eq!(sched.running(), 1);
    assert_eq!(sched.registry().len(), 1);
}

#[test]
fn settlement_backfills_freed_slot() {
    let mut sched = Scheduler::new(2);
    let mut board = FakeBoard::with_queued(3);
    sched.admit(&mut board);

    let next = sched.settle(TaskId(1), &Settlement::Success, &mut board);
    assert_eq!(ids(&next), vec![3]);
    assert_eq!(board.status(1), TaskStatus::Done);
    assert!(!sched.registry().contains(TaskId(1)));
    assert_eq!(sched.running(), 2);
}

#[test]
fn retry_waits_for_a_free_slot() {
    let mut sched = Scheduler::new(2);
    let mut board = FakeBoard::with_queued(3);
    sched.admit(&mut board); // 1, 2
    sched.settle(TaskId(1), &Settlement::Success, &mut board); // admits 3
    let none = sched.settle(TaskId(2), &Settlement::Failure("boom".into()), &mut board);
    assert!(none.is_empty());
    assert_eq!(board.status(2), TaskStatus::Error);
    assert_eq!(sched.running(), 1);

    board.requeue(2);
    assert_eq!(ids(&sched.admit(&mut board)), vec![2]);
    assert_eq!(sched.running(), 2);
}

#[test]
fn cancel_only_reaches_uploading_tasks() {
    let mut sched = Scheduler::new(1);
    let mut board = FakeBoard::with_queued(2);
    let admitted = sched.admit(&mut board);
    assert!(!sched.cancel(TaskId(2)), "queued task has no handle");
    assert!(sched.cancel(TaskId(1)));
    assert!(admitted[0].abort.is_aborted());

    let next = sched.settle(TaskId(1), &Settlement::Aborted, &mut board);
    assert_eq!(board.status(1), TaskStatus::Canceled);
    assert_eq!(ids(&next), vec![2]);
    assert!(!sched.cancel(TaskId(1)), "settled task has no handle");
}

#[test]
fn registry_matches_uploading_set_throughout() {
    let mut sched = Scheduler::new(3);
    let mut board = FakeBoard::with_queued(6);
    let check = |sched: &Scheduler, board: &FakeBoard| {
        for (id, status) in &board.tasks {
            assert_eq!(
                sched.registry().contains(*id),
                *status == TaskStatus::Uploading,
                "task {id} in {status}"
            );
        }
        assert!(board.uploading() <= sched.limit());
        assert_eq!(board.uploading(), sched.running());
    };
    sched.admit(&mut board);
    check(&sched, &board);
    for (id, s) in [
        (2, Settlement::Failure("x".into())),
        (1, Settlement::Success),
        (4, Settlement::Aborted),
        (3, Settlement::Success),
    ] {
        sched.settle(TaskId(id), &s, &mut board);
        check(&sched, &board);
    }
}

#[test]
fn zero_limit_is_clamped_to_one() {
    let mut sched = Scheduler::new(0);
    let mut board = FakeBoard::with_queued(2);
    assert_eq!(ids(&sched.admit(&mut board)), vec![1]);
}
