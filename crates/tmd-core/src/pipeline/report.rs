//! End-of-run accounting.

use super::pool::Tally;
use crate::task::Task;

/// What one round did with the tasks it was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSummary {
    pub round: u32,
    /// Tasks in the pending queue when the round was drained.
    pub entered: usize,
    pub tally: Tally,
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Tasks produced by the source.
    pub enqueued: usize,
    pub rounds: Vec<RoundSummary>,
    /// Tasks still failing after the last round, in no particular order.
    pub failed: Vec<Task>,
    /// One entry per content type whose enumeration aborted.
    pub enumeration_errors: Vec<String>,
}

impl RunReport {
    pub fn completed(&self) -> usize {
        self.rounds.iter().map(|r| r.tally.completed).sum()
    }

    pub fn skipped(&self) -> usize {
        self.rounds.iter().map(|r| r.tally.skipped).sum()
    }

    /// Total download attempts across all rounds (skips are not attempts).
    pub fn attempts(&self) -> usize {
        self.rounds
            .iter()
            .map(|r| r.tally.completed + r.tally.failed)
            .sum()
    }

    /// Nothing left failing and every content type enumerated fully.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.enumeration_errors.is_empty()
    }

    /// More than half of the enqueued tasks ended up completed or skipped.
    pub fn mostly_succeeded(&self) -> bool {
        if self.enqueued == 0 {
            return true;
        }
        (self.completed() + self.skipped()) * 2 > self.enqueued
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(round: u32, completed: usize, skipped: usize, failed: usize) -> RoundSummary {
        RoundSummary {
            round,
            entered: completed + skipped + failed,
            tally: Tally {
                completed,
                skipped,
                failed,
            },
        }
    }

    #[test]
    fn totals_across_rounds() {
        let report = RunReport {
            enqueued: 10,
            rounds: vec![summary(0, 6, 1, 3), summary(1, 2, 0, 1)],
            failed: vec![Task::new("/tmp/x", "http://x/x")],
            enumeration_errors: Vec::new(),
        };
        assert_eq!(report.completed(), 8);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.attempts(), 12);
        assert!(!report.is_success());
        assert!(report.mostly_succeeded());
    }

    #[test]
    fn half_failed_is_not_mostly_succeeded() {
        let report = RunReport {
            enqueued: 2,
            rounds: vec![summary(0, 1, 0, 1)],
            failed: vec![Task::new("/tmp/x", "http://x/x")],
            enumeration_errors: Vec::new(),
        };
        assert!(!report.mostly_succeeded());
    }
}
