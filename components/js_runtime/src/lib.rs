//! A minimal JavaScript host runtime.
//!
//! Hosts the promise bridge end to end: a traced heap of promises,
//! functions, errors, and native host objects; a microtask queue; one event
//! loop per context; and native async operations whose promises settle
//! through [`BridgedPromise`](promise_bridge::BridgedPromise).
//!
//! There is no parser. Script functions are native closures created with
//! [`Context::new_function`].
//!
//! # Examples
//!
//! ```
//! use js_runtime::{timers, Runtime, RuntimeConfig, Value};
//! use std::time::Duration;
//!
//! let runtime = Runtime::new(RuntimeConfig::default());
//! let mut ctx = runtime.new_context().unwrap();
//!
//! let delay = timers::delay(&mut ctx, Duration::from_millis(1), Value::Smi(42));
//! let value = ctx.block_on(&delay.promise, None).unwrap();
//! assert_eq!(value, Value::Smi(42));
//! ctx.free_value(&delay.promise);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod blocking;
mod config;
mod context;
mod driver;
mod error;
mod object;
mod promise;
mod rejection;
mod report;
mod runtime;
pub mod timers;

pub use config::RuntimeConfig;
pub use context::{get_event_loop, Context};
pub use driver::RunStatus;
pub use error::{AwaitError, RuntimeError, RuntimeResult};
pub use object::{HostData, HostObject, JsObject, NativeFn, NativeFunction, ResolvingKind};
pub use runtime::Runtime;

pub use async_runtime::{LoopHandle, PromiseState};
pub use core_types::{ErrorKind, JsError, Value};
pub use memory_manager::Marker;
