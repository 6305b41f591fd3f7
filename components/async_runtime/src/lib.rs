//! Async runtime building blocks for the JavaScript host.
//!
//! This crate provides the pieces a host needs to run asynchronous work:
//! - [`PromiseRecord`] - engine-side promise state with reaction jobs
//! - [`MicrotaskQueue`] - FIFO job queue drained after every task
//! - [`EventLoop`] - macrotasks, timers, and completions sent from other threads
//!
//! Everything here is generic over the value type `V` and the context type
//! `C`, so the crate knows nothing about the heap or the script engine.
//!
//! # Examples
//!
//! ## Event Loop Usage
//!
//! ```
//! use async_runtime::{EventLoop, Task, Turn};
//! use std::time::Duration;
//!
//! let event_loop = EventLoop::<Vec<u32>>::new();
//! let mut order = Vec::new();
//!
//! event_loop.set_timer(Duration::from_millis(1), Task::new(|order: &mut Vec<u32>| order.push(2)));
//! event_loop.enqueue_task(Task::new(|order: &mut Vec<u32>| order.push(1)));
//!
//! while event_loop.turn(&mut order, None) == Turn::Ran {}
//! assert_eq!(order, vec![1, 2]);
//! ```
//!
//! ## Promise Usage
//!
//! ```
//! use async_runtime::{PromiseReaction, PromiseRecord, PromiseState};
//!
//! let mut promise: PromiseRecord<i32> = PromiseRecord::new();
//! promise.then(PromiseReaction::new(Some(1), Some(2), None));
//!
//! let jobs = promise.fulfill(42).unwrap();
//! assert_eq!(jobs.len(), 1);
//! assert_eq!(jobs[0].handler, Some(1));
//! assert!(matches!(promise.state(), PromiseState::Fulfilled(42)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod event_loop;
pub mod promise;
pub mod task_queue;

// Re-export main types at crate root
pub use event_loop::{EventLoop, LoopHandle, LoopId, RemoteHandle, TimerId, Turn};
pub use promise::{
    PromiseError, PromiseReaction, PromiseRecord, PromiseState, ReactionCapability, ReactionJob,
    ReactionKind,
};
pub use task_queue::{MicrotaskQueue, RemoteTask, Task, TaskQueue};
