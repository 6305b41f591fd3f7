//! Task and microtask queue management.
//!
//! Tasks are executed one at a time by the event loop, with the host
//! draining its microtask queue after each task.

use std::collections::VecDeque;

/// A task to be executed by the event loop.
///
/// Tasks represent work to be done in a later iteration of the loop: timer
/// callbacks, I/O completions, work handed back from other threads. The
/// context `C` is lent to the task when it runs.
pub struct Task<C> {
    callback: Box<dyn FnOnce(&mut C)>,
}

impl<C> Task<C> {
    /// Creates a new Task from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(&mut C) + 'static,
    {
        Self {
            callback: Box::new(f),
        }
    }

    /// Executes the task.
    pub fn run(self, cx: &mut C) {
        (self.callback)(cx)
    }
}

impl<C> std::fmt::Debug for Task<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Task {{ ... }}")
    }
}

/// A task built on another thread.
///
/// Only the closure crosses threads; it runs on the loop thread like any
/// other task.
pub struct RemoteTask<C> {
    callback: Box<dyn FnOnce(&mut C) + Send>,
}

impl<C> RemoteTask<C> {
    /// Creates a new RemoteTask from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        Self {
            callback: Box::new(f),
        }
    }

    pub(crate) fn wake() -> Self {
        Self::new(|_| {})
    }

    /// Executes the task.
    pub fn run(self, cx: &mut C) {
        (self.callback)(cx)
    }
}

impl<C> std::fmt::Debug for RemoteTask<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RemoteTask {{ ... }}")
    }
}

/// FIFO queue for tasks.
pub struct TaskQueue<C> {
    queue: VecDeque<Task<C>>,
}

impl<C> TaskQueue<C> {
    /// Creates an empty TaskQueue.
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Adds a task to the back of the queue.
    pub fn enqueue(&mut self, task: Task<C>) {
        self.queue.push_back(task);
    }

    /// Removes and returns the task at the front of the queue.
    pub fn dequeue(&mut self) -> Option<Task<C>> {
        self.queue.pop_front()
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the number of tasks in the queue.
    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

impl<C> Default for TaskQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for TaskQueue<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue").field("len", &self.queue.len()).finish()
    }
}

/// FIFO queue for microtasks.
///
/// Microtasks are drained completely after each task; jobs enqueued while
/// draining run in the same checkpoint.
#[derive(Debug, Clone)]
pub struct MicrotaskQueue<J> {
    queue: VecDeque<J>,
}

impl<J> MicrotaskQueue<J> {
    /// Creates an empty MicrotaskQueue.
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Adds a job to the back of the queue.
    pub fn enqueue(&mut self, job: J) {
        self.queue.push_back(job);
    }

    /// Removes and returns the job at the front of the queue.
    pub fn dequeue(&mut self) -> Option<J> {
        self.queue.pop_front()
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the number of queued jobs.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Iterates over queued jobs in run order.
    pub fn iter(&self) -> impl Iterator<Item = &J> {
        self.queue.iter()
    }

    /// Drops every queued job.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl<J> Default for MicrotaskQueue<J> {
    fn default() -> Self {
        Self::new()
    }
}
