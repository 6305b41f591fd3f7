//! Driving the event loop from native code.

use crate::context::Context;
use crate::error::AwaitError;
use async_runtime::{PromiseState, Turn};
use core_types::Value;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Outcome of [`Context::run_once`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The loop has no work left.
    Idle,
    /// A task ran.
    Progress,
    /// The deadline passed first.
    TimedOut,
}

impl Context {
    /// Runs one loop iteration: pending microtasks, at most one task, then
    /// the microtasks it queued.
    ///
    /// Blocks until a task is ready or `deadline` passes. Collects garbage
    /// afterwards when enough has been allocated.
    pub fn run_once(&mut self, deadline: Option<Instant>) -> RunStatus {
        self.run_jobs();
        let event_loop = Rc::clone(self.event_loop());
        let status = match event_loop.turn(self, deadline) {
            Turn::Ran => RunStatus::Progress,
            Turn::Idle => RunStatus::Idle,
            Turn::TimedOut => RunStatus::TimedOut,
        };
        self.run_jobs();
        self.maybe_collect();
        status
    }

    /// Runs the loop until it has no work left.
    pub fn run(&mut self) {
        while self.run_once(None) == RunStatus::Progress {}
    }

    /// Runs the loop until `promise` settles.
    ///
    /// Returns the fulfillment value with a handle the caller releases, or
    /// the rejection reason. Awaiting counts as handling a rejection.
    ///
    /// # Errors
    ///
    /// [`AwaitError::Stalled`] when the loop runs dry with the promise still
    /// pending, [`AwaitError::TimedOut`] when `timeout` elapses first.
    pub fn block_on(&mut self, promise: &Value, timeout: Option<Duration>) -> Result<Value, AwaitError> {
        let Some(id) = promise.as_object().filter(|_| self.is_promise(promise)) else {
            return Err(AwaitError::NotAPromise);
        };
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        let promise = self.dup_value(promise);
        self.mark_promise_handled(id);

        let result = loop {
            self.run_jobs();
            match self.promise_state(&promise) {
                Some(PromiseState::Fulfilled(value)) => break Ok(value),
                Some(PromiseState::Rejected(reason)) => break Err(AwaitError::Rejected(reason)),
                Some(PromiseState::Pending) => {}
                None => break Err(AwaitError::NotAPromise),
            }
            match self.run_once(deadline) {
                RunStatus::Progress => {}
                RunStatus::Idle => break Err(AwaitError::Stalled),
                RunStatus::TimedOut => break Err(AwaitError::TimedOut),
            }
        };

        if let Ok(value) | Err(AwaitError::Rejected(value)) = &result {
            self.dup_value(value);
        }
        self.free_value(&promise);
        result
    }
}
