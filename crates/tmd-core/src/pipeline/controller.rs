//! Retry controller: drives rounds until the failure queue is empty or the
//! retry budget is spent.
//!
//! ```text
//! Enumerating -> Draining -> Evaluating -> Retrying -> Draining ...
//!                                       \-> Done
//! ```
//!
//! Workers of the first round start before enumeration, so downloads overlap
//! with discovering more posts. A round counts as drained only after the task
//! source is exhausted and the pending queue is observed empty.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use super::executor::{Executor, ExecutorSettings};
use super::pool::WorkerPool;
use super::report::{RoundSummary, RunReport};
use super::round::Round;
use crate::fetch::Fetcher;
use crate::task::Task;

/// How often the controller re-checks worker liveness while waiting for a drain.
const DRAIN_POLL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Enumerating,
    Draining,
    Evaluating,
    Retrying,
    Done,
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ControllerState::Enumerating => "enumerating",
            ControllerState::Draining => "draining",
            ControllerState::Evaluating => "evaluating",
            ControllerState::Retrying => "retrying",
            ControllerState::Done => "done",
        };
        f.write_str(s)
    }
}

/// Pipeline parameters fixed at controller construction.
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    /// Workers per round.
    pub workers: usize,
    /// Extra rounds after the first; each task is attempted at most `retry_budget + 1` times.
    pub retry_budget: u32,
    pub executor: ExecutorSettings,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            workers: 5,
            retry_budget: 3,
            executor: ExecutorSettings::default(),
        }
    }
}

pub struct RetryController<F> {
    executor: Arc<Executor<F>>,
    workers: usize,
    retry_budget: u32,
}

impl<F: Fetcher + 'static> RetryController<F> {
    pub fn new(fetcher: F, settings: PipelineSettings) -> Self {
        Self {
            executor: Arc::new(Executor::new(fetcher, settings.executor)),
            workers: settings.workers.max(1),
            retry_budget: settings.retry_budget,
        }
    }

    /// Run the pipeline over tasks that cannot fail to enumerate.
    pub fn run_tasks<I>(&self, tasks: I) -> Result<RunReport>
    where
        I: IntoIterator<Item = Task>,
    {
        self.run(tasks.into_iter().map(Ok::<Task, std::convert::Infallible>))
    }

    /// Run the pipeline to completion.
    ///
    /// `source` is consumed on the calling thread while the first pool drains
    /// concurrently. An `Err` item is logged and recorded in the report; it does
    /// not affect tasks already queued. Only failing to start worker threads is
    /// fatal.
    pub fn run<I, E>(&self, source: I) -> Result<RunReport>
    where
        I: IntoIterator<Item = std::result::Result<Task, E>>,
        E: fmt::Display,
    {
        let mut report = RunReport::default();
        let mut round = Round::first();
        let mut pool = self.start_pool(&round)?;

        self.transition(ControllerState::Enumerating, &round);
        let mut enqueued = 0usize;
        for item in source {
            match item {
                Ok(task) => {
                    round.pending().push(task);
                    enqueued += 1;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "enumeration failed");
                    report.enumeration_errors.push(e.to_string());
                }
            }
        }
        report.enqueued = enqueued;
        let mut entered = enqueued;

        loop {
            self.transition(ControllerState::Draining, &round);
            self.wait_drained(&round, &pool);
            round.terminate();
            let tally = pool.stop();
            report.rounds.push(RoundSummary {
                round: round.number(),
                entered,
                tally,
            });

            self.transition(ControllerState::Evaluating, &round);
            if round.failures().is_empty() && round.pending().is_empty() {
                break;
            }
            if round.number() >= self.retry_budget {
                tracing::warn!(
                    round = round.number(),
                    failed = round.failures().len(),
                    "retry budget exhausted"
                );
                break;
            }

            self.transition(ControllerState::Retrying, &round);
            round = round.into_next();
            entered = round.pending().len();
            tracing::info!(round = round.number(), tasks = entered, "retrying failed tasks");
            pool = self.start_pool(&round)?;
        }

        self.transition(ControllerState::Done, &round);
        report.failed = round.into_residue();
        Ok(report)
    }

    fn start_pool(&self, round: &Round) -> Result<WorkerPool> {
        WorkerPool::start(self.workers, round, Arc::clone(&self.executor))
            .with_context(|| format!("failed to start workers for round {}", round.number()))
    }

    /// Block until the pending queue is empty, or until no worker is left to empty it.
    fn wait_drained(&self, round: &Round, pool: &WorkerPool) {
        while !round.pending().wait_empty_for(DRAIN_POLL) {
            if pool.all_exited() {
                tracing::error!(
                    round = round.number(),
                    left = round.pending().len(),
                    "all workers exited before the queue drained"
                );
                return;
            }
        }
    }

    fn transition(&self, state: ControllerState, round: &Round) {
        tracing::debug!(round = round.number(), state = %state, "controller state");
    }
}
