//! Fixed-size pool of executor threads bound to one round.

use std::io;
use std::ops::AddAssign;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::executor::{Executor, Outcome};
use super::queue::TaskQueue;
use super::round::Round;
use crate::fetch::Fetcher;

/// Outcome counts for a set of executed tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Tally {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Completed => self.completed += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::TransportFailure | Outcome::WriteFailure => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.completed + self.skipped + self.failed
    }
}

impl AddAssign for Tally {
    fn add_assign(&mut self, rhs: Self) {
        self.completed += rhs.completed;
        self.skipped += rhs.skipped;
        self.failed += rhs.failed;
    }
}

/// Running workers of one round. Single-use: `stop` consumes the pool, and the
/// next round constructs a new one.
pub struct WorkerPool {
    round: u32,
    pending: Arc<TaskQueue>,
    workers: Vec<JoinHandle<Tally>>,
}

impl WorkerPool {
    /// Spawn `size` workers (at least one) draining `round`.
    pub fn start<F>(size: usize, round: &Round, executor: Arc<Executor<F>>) -> io::Result<Self>
    where
        F: Fetcher + 'static,
    {
        let size = size.max(1);
        let mut pool = WorkerPool {
            round: round.number(),
            pending: Arc::clone(round.pending()),
            workers: Vec::with_capacity(size),
        };
        for id in 0..size {
            let pending = Arc::clone(round.pending());
            let failures = Arc::clone(round.failures());
            let executor = Arc::clone(&executor);
            let spawned = thread::Builder::new()
                .name(format!("tmd-worker-{id}"))
                .spawn(move || work(id, &pending, &failures, &executor));
            match spawned {
                Ok(handle) => pool.workers.push(handle),
                Err(e) => {
                    pool.stop();
                    return Err(e);
                }
            }
        }
        tracing::debug!(round = pool.round, workers = size, "worker pool started");
        Ok(pool)
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// True when every worker thread has returned (normally only after `stop`,
    /// or if they all panicked).
    pub fn all_exited(&self) -> bool {
        self.workers.iter().all(|h| h.is_finished())
    }

    /// Set the termination signal and join every worker.
    ///
    /// Workers finish the task in hand first, so once this returns nobody writes
    /// to the round's queues anymore.
    pub fn stop(self) -> Tally {
        self.pending.close();
        let mut tally = Tally::default();
        for (id, handle) in self.workers.into_iter().enumerate() {
            match handle.join() {
                Ok(t) => tally += t,
                Err(_) => tracing::error!(round = self.round, worker = id, "worker thread panicked"),
            }
        }
        tracing::debug!(
            round = self.round,
            completed = tally.completed,
            skipped = tally.skipped,
            failed = tally.failed,
            "worker pool stopped"
        );
        tally
    }
}

fn work<F: Fetcher>(
    id: usize,
    pending: &TaskQueue,
    failures: &TaskQueue,
    executor: &Executor<F>,
) -> Tally {
    let mut tally = Tally::default();
    while let Some(task) = pending.take() {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| executor.execute(id, &task)))
            .unwrap_or_else(|_| {
                tracing::error!(worker = id, destination = %task.destination().display(), "executor panicked");
                Outcome::TransportFailure
            });
        tally.record(outcome);
        if outcome.is_failure() {
            failures.push(task);
        }
    }
    tracing::debug!(worker = id, "worker exiting");
    tally
}
