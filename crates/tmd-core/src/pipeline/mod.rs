//! Concurrent download pipeline.
//!
//! A [`RetryController`] owns a [`Round`] (pending queue, failure queue,
//! termination signal) and runs a fresh [`WorkerPool`] of [`Executor`]s for
//! each round. Failed tasks move to the next round's pending queue until the
//! retry budget is used up.

mod controller;
mod executor;
mod pool;
mod queue;
mod report;
mod round;

pub use controller::{ControllerState, PipelineSettings, RetryController};
pub use executor::{Executor, ExecutorSettings, Outcome};
pub use pool::{Tally, WorkerPool};
pub use queue::TaskQueue;
pub use report::{RoundSummary, RunReport};
pub use round::Round;
