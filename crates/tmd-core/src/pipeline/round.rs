//! One drain cycle: a pending queue, a failure queue and the termination signal.

use std::sync::Arc;

use super::queue::TaskQueue;
use crate::task::Task;

/// Queue pair for a single round, owned by the controller.
///
/// The pending queue's closed flag is the round's termination signal; a new
/// round always gets a new pending queue, so the signal starts out false.
#[derive(Debug)]
pub struct Round {
    number: u32,
    pending: Arc<TaskQueue>,
    failures: Arc<TaskQueue>,
}

impl Round {
    /// First round: empty queues, filled by the enumerator while workers run.
    pub fn first() -> Self {
        Self {
            number: 0,
            pending: Arc::new(TaskQueue::new()),
            failures: Arc::new(TaskQueue::new()),
        }
    }

    /// Round `number` seeded with `tasks` (the previous round's failures).
    pub fn with_tasks(number: u32, tasks: Vec<Task>) -> Self {
        Self {
            number,
            pending: Arc::new(TaskQueue::from_tasks(tasks)),
            failures: Arc::new(TaskQueue::new()),
        }
    }

    /// Zero-based round number; round 0 is the first attempt.
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn pending(&self) -> &Arc<TaskQueue> {
        &self.pending
    }

    pub fn failures(&self) -> &Arc<TaskQueue> {
        &self.failures
    }

    /// Set the termination signal.
    pub fn terminate(&self) {
        self.pending.close();
    }

    /// Consume the finished round and build the next one.
    ///
    /// The failure queue becomes the next pending queue. Tasks still sitting in
    /// the old pending queue (never taken because termination came first) are
    /// carried over as well so nothing is lost.
    pub fn into_next(self) -> Round {
        let mut carried = self.failures.drain();
        carried.extend(self.pending.drain());
        Round::with_tasks(self.number + 1, carried)
    }

    /// Everything left over once no further round will run.
    pub fn into_residue(self) -> Vec<Task> {
        let mut residue = self.failures.drain();
        residue.extend(self.pending.drain());
        residue
    }
}
