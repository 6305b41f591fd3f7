//! Integration test suite for the promise bridge runtime
//!
//! These tests drive the bridge through a real runtime: heap, microtask
//! queue, event loop, and diagnostics wired together.

use diagnostics::{CapturedOutput, Diagnostics};
use js_runtime::{Context, Runtime, RuntimeConfig};

/// Re-export components for test convenience
pub mod components {
    pub use async_runtime;
    pub use core_types;
    pub use diagnostics;
    pub use js_runtime;
    pub use memory_manager;
    pub use promise_bridge;
}

/// Installs the test logger once per process.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A context whose diagnostics are captured and whose fatal path unwinds.
pub fn captured_context() -> (Context, CapturedOutput) {
    init_logging();
    let (diagnostics, output) = Diagnostics::capture();
    let runtime = Runtime::with_diagnostics(RuntimeConfig::default(), diagnostics);
    let ctx = runtime
        .new_context()
        .expect("a fresh runtime has room for a context");
    (ctx, output)
}
