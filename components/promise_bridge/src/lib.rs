//! Native-to-script promise bridge.
//!
//! Native asynchronous operations (timers, worker threads, I/O) must hand a
//! promise to script synchronously and settle it much later, exactly once.
//! [`BridgedPromise`] is the native-side owner of that promise and of the two
//! resolving functions created with it.
//!
//! The lifecycle is a tagged state:
//!
//! ```text
//! Pending --settle--> Settled
//! Pending --clear---> Cleared
//! Pending --runtime teardown--> TornDown
//! ```
//!
//! The three right-hand states are terminal. The capabilities are moved out
//! of the state before one of them runs, so a second settlement finds
//! nothing to invoke. Settling, clearing, or tearing down a bridge that is
//! not pending goes to the fatal path of the engine's
//! [`Diagnostics`](diagnostics::Diagnostics).
//!
//! Values held by a pending bridge are not rooted. The structure that owns
//! the bridge must report them from its GC mark hook with
//! [`BridgedPromise::mark`] until the bridge settles or is cleared.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod bridge;
mod engine;
mod helpers;

pub use bridge::{BridgeStatus, BridgedPromise, Settlement};
pub use engine::{Capability, PromiseCapability, RuntimeHandle, ScriptEngine};
pub use helpers::{new_rejected_promise, new_resolved_promise};
