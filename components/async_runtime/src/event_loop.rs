//! Event loop implementation.
//!
//! The loop owns three sources of work:
//! 1. the task queue, in FIFO order
//! 2. timers, promoted to the task queue once their deadline passes
//! 3. remote completions sent from other threads through a [`RemoteHandle`]
//!
//! The loop never touches the script engine. Each [`turn`](EventLoop::turn)
//! runs at most one task against the caller's context; draining microtasks
//! between turns is the host's job.

use crate::task_queue::{RemoteTask, Task, TaskQueue};
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use std::cell::RefCell;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared handle to a loop; contexts keep one for their whole life.
pub type LoopHandle<C> = Rc<EventLoop<C>>;

static NEXT_LOOP_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoopId(u64);

/// Identifies a pending timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Outcome of one [`EventLoop::turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// One task ran.
    Ran,
    /// Nothing left that could ever produce work.
    Idle,
    /// The deadline passed before any task became ready.
    TimedOut,
}

struct LoopState<C> {
    tasks: TaskQueue<C>,
    timers: BinaryHeap<Reverse<(Instant, TimerId)>>,
    timer_tasks: HashMap<TimerId, Task<C>>,
    next_timer: u64,
}

impl<C> LoopState<C> {
    fn promote_due_timers(&mut self, now: Instant) {
        while let Some(Reverse((deadline, id))) = self.timers.peek().copied() {
            if deadline > now {
                break;
            }
            self.timers.pop();
            // cancelled timers leave stale heap entries behind
            if let Some(task) = self.timer_tasks.remove(&id) {
                self.tasks.enqueue(task);
            }
        }
    }

    fn next_deadline(&mut self) -> Option<Instant> {
        while let Some(Reverse((deadline, id))) = self.timers.peek().copied() {
            if self.timer_tasks.contains_key(&id) {
                return Some(deadline);
            }
            self.timers.pop();
        }
        None
    }
}

/// Single-threaded event loop over a context type `C`.
pub struct EventLoop<C> {
    id: LoopId,
    state: RefCell<LoopState<C>>,
    remote_tx: Sender<RemoteTask<C>>,
    remote_rx: Receiver<RemoteTask<C>>,
    outstanding: Arc<AtomicUsize>,
}

impl<C> EventLoop<C> {
    /// Creates a loop with no pending work.
    pub fn new() -> Self {
        let (remote_tx, remote_rx) = channel::unbounded();
        Self {
            id: LoopId(NEXT_LOOP_ID.fetch_add(1, Ordering::Relaxed)),
            state: RefCell::new(LoopState {
                tasks: TaskQueue::new(),
                timers: BinaryHeap::new(),
                timer_tasks: HashMap::new(),
                next_timer: 1,
            }),
            remote_tx,
            remote_rx,
            outstanding: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Identity of this loop.
    pub fn id(&self) -> LoopId {
        self.id
    }

    /// Adds a task to the back of the task queue.
    pub fn enqueue_task(&self, task: Task<C>) {
        self.state.borrow_mut().tasks.enqueue(task);
    }

    /// Schedules `task` to run once `delay` has elapsed.
    pub fn set_timer(&self, delay: Duration, task: Task<C>) -> TimerId {
        let mut state = self.state.borrow_mut();
        let id = TimerId(state.next_timer);
        state.next_timer += 1;
        state.timers.push(Reverse((Instant::now() + delay, id)));
        state.timer_tasks.insert(id, task);
        log::trace!("loop {:?}: timer {:?} armed for {:?}", self.id, id, delay);
        id
    }

    /// Cancels a timer. Returns false if it already fired or was cleared.
    pub fn clear_timer(&self, id: TimerId) -> bool {
        self.state.borrow_mut().timer_tasks.remove(&id).is_some()
    }

    /// Creates a handle other threads use to send exactly one task back.
    ///
    /// The loop stays alive until the handle sends or is dropped.
    pub fn remote(&self) -> RemoteHandle<C> {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        RemoteHandle {
            tx: Some(self.remote_tx.clone()),
            outstanding: Arc::clone(&self.outstanding),
        }
    }

    /// Number of remote handles that have not reported back yet.
    pub fn outstanding_remote(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Returns true if any queued task, timer, or remote handle remains.
    pub fn is_alive(&self) -> bool {
        let state = self.state.borrow();
        !state.tasks.is_empty()
            || !state.timer_tasks.is_empty()
            || !self.remote_rx.is_empty()
            || self.outstanding_remote() > 0
    }

    /// Returns true if the task queue is empty.
    pub fn is_task_queue_empty(&self) -> bool {
        self.state.borrow().tasks.is_empty()
    }

    /// Number of timers that have not fired or been cleared.
    pub fn pending_timers(&self) -> usize {
        self.state.borrow().timer_tasks.len()
    }

    /// Takes the next runnable task, promoting timers due at `now` first.
    pub fn pop_ready(&self, now: Instant) -> Option<Task<C>> {
        let mut state = self.state.borrow_mut();
        state.promote_due_timers(now);
        state.tasks.dequeue()
    }

    /// Deadline of the earliest live timer.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.state.borrow_mut().next_deadline()
    }

    /// Waits for a remote task, forever when `timeout` is `None`.
    pub fn wait_remote(&self, timeout: Option<Duration>) -> Option<RemoteTask<C>> {
        let received = match timeout {
            Some(timeout) => match self.remote_rx.recv_timeout(timeout) {
                Ok(task) => Some(task),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
            },
            None => self.remote_rx.recv().ok(),
        };
        if received.is_some() {
            self.outstanding.fetch_sub(1, Ordering::SeqCst);
        }
        received
    }

    fn try_remote(&self) -> Option<RemoteTask<C>> {
        let task = self.remote_rx.try_recv().ok()?;
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
        Some(task)
    }

    /// Runs at most one task against `cx`.
    ///
    /// Blocks until a timer fires, a remote task arrives, or `deadline`
    /// passes. Returns [`Turn::Idle`] without blocking when nothing could
    /// ever produce work.
    pub fn turn(&self, cx: &mut C, deadline: Option<Instant>) -> Turn {
        loop {
            let now = Instant::now();
            if let Some(task) = self.pop_ready(now) {
                task.run(cx);
                return Turn::Ran;
            }
            if let Some(task) = self.try_remote() {
                task.run(cx);
                return Turn::Ran;
            }
            if !self.is_alive() {
                return Turn::Idle;
            }

            let mut wake = self.next_deadline();
            if let Some(deadline) = deadline {
                if deadline <= now {
                    return Turn::TimedOut;
                }
                wake = Some(wake.map_or(deadline, |w| w.min(deadline)));
            }
            let timeout = wake.map(|w| w.saturating_duration_since(now));
            log::debug!("loop {:?}: waiting {:?}", self.id, timeout);
            if let Some(task) = self.wait_remote(timeout) {
                task.run(cx);
                return Turn::Ran;
            }
        }
    }
}

impl<C> Default for EventLoop<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for EventLoop<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("EventLoop")
            .field("id", &self.id)
            .field("tasks", &state.tasks.len())
            .field("timers", &state.timer_tasks.len())
            .field("outstanding", &self.outstanding_remote())
            .finish()
    }
}

/// Sends one task back to the loop from any thread.
pub struct RemoteHandle<C> {
    tx: Option<Sender<RemoteTask<C>>>,
    outstanding: Arc<AtomicUsize>,
}

impl<C> RemoteHandle<C> {
    /// Queues `f` to run on the loop thread.
    pub fn send<F>(mut self, f: F)
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        if let Some(tx) = self.tx.take() {
            if tx.send(RemoteTask::new(f)).is_err() {
                self.outstanding.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }
}

impl<C> Drop for RemoteHandle<C> {
    fn drop(&mut self) {
        // wake a blocked loop so it can see the handle is gone
        if let Some(tx) = self.tx.take() {
            if tx.send(RemoteTask::wake()).is_err() {
                self.outstanding.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }
}

impl<C> std::fmt::Debug for RemoteHandle<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteHandle")
            .field("sent", &self.tx.is_none())
            .finish()
    }
}
