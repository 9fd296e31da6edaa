//! Download executor: one task in, one classified outcome out.

use std::fmt;
use std::thread;
use std::time::Duration;

use crate::fetch::{classify, Fetcher};
use crate::storage::StagedFile;
use crate::task::Task;

/// Result of executing a single task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Destination already present and overwrite disabled; no network access.
    Skipped,
    /// Body fetched and renamed into place.
    Completed,
    /// Network, timeout, DNS or HTTP status failure. Requeued.
    TransportFailure,
    /// Local I/O failure. Requeued.
    WriteFailure,
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::TransportFailure | Outcome::WriteFailure)
    }

    /// Label used in outcome log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Skipped => "Exists",
            Outcome::Completed => "Completed",
            Outcome::TransportFailure => "TransportFailure",
            Outcome::WriteFailure => "WriteFailure",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-task behavior shared by every worker of every round.
#[derive(Debug, Clone, Copy)]
pub struct ExecutorSettings {
    /// Re-download even when the destination exists.
    pub overwrite: bool,
    /// Pause before each fetch, per worker.
    pub delay: Duration,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            overwrite: false,
            delay: Duration::from_millis(500),
        }
    }
}

pub struct Executor<F> {
    fetcher: F,
    settings: ExecutorSettings,
}

impl<F: Fetcher> Executor<F> {
    pub fn new(fetcher: F, settings: ExecutorSettings) -> Self {
        Self { fetcher, settings }
    }

    pub fn settings(&self) -> &ExecutorSettings {
        &self.settings
    }

    /// Run one task on behalf of `worker` and log the outcome.
    pub fn execute(&self, worker: usize, task: &Task) -> Outcome {
        let destination = task.destination();
        if !self.settings.overwrite && destination.exists() {
            tracing::info!(
                worker,
                outcome = %Outcome::Skipped,
                destination = %destination.display(),
                "destination exists, skipping"
            );
            return Outcome::Skipped;
        }

        if !self.settings.delay.is_zero() {
            thread::sleep(self.settings.delay);
        }

        let mut staged = match StagedFile::create(destination) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(
                    worker,
                    outcome = %Outcome::WriteFailure,
                    destination = %destination.display(),
                    error = %e,
                    "could not create file"
                );
                return Outcome::WriteFailure;
            }
        };

        match self.fetcher.fetch_to(task.source_url(), &mut staged) {
            Ok(bytes) => match staged.commit() {
                Ok(()) => {
                    tracing::info!(
                        worker,
                        outcome = %Outcome::Completed,
                        destination = %destination.display(),
                        bytes,
                        "download completed"
                    );
                    Outcome::Completed
                }
                Err(e) => {
                    tracing::warn!(
                        worker,
                        outcome = %Outcome::WriteFailure,
                        destination = %destination.display(),
                        error = %e,
                        "could not move file into place"
                    );
                    Outcome::WriteFailure
                }
            },
            Err(e) => {
                // `staged` drops here and removes the partial body.
                let outcome = if e.is_write() {
                    Outcome::WriteFailure
                } else {
                    Outcome::TransportFailure
                };
                tracing::warn!(
                    worker,
                    outcome = %outcome,
                    destination = %destination.display(),
                    url = task.source_url(),
                    kind = classify(&e).as_str(),
                    error = %e,
                    "download failed"
                );
                outcome
            }
        }
    }
}
