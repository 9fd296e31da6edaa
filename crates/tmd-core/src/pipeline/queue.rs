//! Blocking multi-producer/multi-consumer task queue.
//!
//! Workers suspend on the condition variable while the queue is empty and wake
//! when a task is pushed or the queue is closed. Closing is the round's
//! termination signal: once closed, `take` returns `None` without handing out
//! further tasks, and anything left behind stays in the queue for the
//! controller to collect with `drain`.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::task::Task;

#[derive(Debug, Default)]
struct QueueState {
    tasks: VecDeque<Task>,
    closed: bool,
}

#[derive(Debug, Default)]
pub struct TaskQueue {
    state: Mutex<QueueState>,
    changed: Condvar,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            state: Mutex::new(QueueState {
                tasks: tasks.into_iter().collect(),
                closed: false,
            }),
            changed: Condvar::new(),
        }
    }

    // Nothing panics while holding the lock, so a poisoned state is still consistent.
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a task and wake the waiters.
    ///
    /// Pushing after `close` is allowed; the task is kept and returned by `drain`.
    pub fn push(&self, task: Task) {
        self.lock().tasks.push_back(task);
        self.changed.notify_all();
    }

    /// Take the next task, blocking while the queue is empty.
    ///
    /// Returns `None` once the queue is closed, even if tasks remain.
    pub fn take(&self) -> Option<Task> {
        let mut state = self.lock();
        loop {
            if state.closed {
                return None;
            }
            if let Some(task) = state.tasks.pop_front() {
                if state.tasks.is_empty() {
                    // Wake the controller waiting in `wait_empty_for`.
                    self.changed.notify_all();
                }
                return Some(task);
            }
            state = self
                .changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Set the termination signal and wake every waiter. Idempotent.
    pub fn close(&self) {
        self.lock().closed = true;
        self.changed.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn len(&self) -> usize {
        self.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().tasks.is_empty()
    }

    /// Wait up to `timeout` for the queue to become empty. Returns whether it is empty.
    pub fn wait_empty_for(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        while !state.tasks.is_empty() {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = self
                .changed
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;
        }
        true
    }

    /// Remove and return every queued task.
    pub fn drain(&self) -> Vec<Task> {
        self.lock().tasks.drain(..).collect()
    }
}
