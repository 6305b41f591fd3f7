//! Error types for the runtime

use core_types::Value;
use memory_manager::HeapError;
use thiserror::Error;

/// Failures of runtime operations.
///
/// Script exceptions are not errors at this level; they travel as thrown
/// [`Value`]s.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The heap refused an allocation or saw a bad handle
    #[error(transparent)]
    Heap(#[from] HeapError),

    /// A promise operation was given something else
    #[error("value is not a promise")]
    NotAPromise,

    /// The context was closed
    #[error("context is closed")]
    ContextClosed,
}

/// Why [`Context::block_on`](crate::Context::block_on) returned without a
/// fulfillment value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AwaitError {
    /// The promise rejected with this reason
    #[error("promise rejected")]
    Rejected(Value),

    /// The deadline passed while the promise was pending
    #[error("timed out waiting for promise")]
    TimedOut,

    /// The loop ran out of work while the promise was pending
    #[error("event loop is idle but the promise is still pending")]
    Stalled,

    /// The awaited value is not a promise
    #[error("value is not a promise")]
    NotAPromise,
}

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;
