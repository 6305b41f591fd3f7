//! The narrow interface the bridge needs from a script engine.

use diagnostics::Diagnostics;
use std::fmt;

/// Services that outlive every context of a runtime.
///
/// Used on the teardown path, when no context is left to call into.
pub trait RuntimeHandle {
    /// The runtime's diagnostic stream.
    fn diagnostics(&self) -> &Diagnostics;
}

/// A script engine context able to create and settle promises.
pub trait ScriptEngine {
    /// Engine value type.
    type Value: Clone + fmt::Debug;

    /// The diagnostic stream contract violations are reported to.
    fn diagnostics(&self) -> &Diagnostics;

    /// Creates a pending promise and its two resolving functions.
    ///
    /// The returned values carry no handles. The caller keeps them alive by
    /// reporting them during marking. Returns `None` when the engine cannot
    /// allocate.
    fn new_promise_capability(&mut self) -> Option<PromiseCapability<Self::Value>>;

    /// Calls a resolving function with `args`.
    ///
    /// Resolution enqueues reaction jobs; continuations never run before
    /// this returns.
    fn invoke_capability(&mut self, function: &Self::Value, args: &[Self::Value]);
}

/// A promise with the functions that resolve and reject it.
#[derive(Debug, Clone, PartialEq)]
pub struct PromiseCapability<V> {
    /// The promise
    pub promise: V,
    /// Fulfils or chains the promise
    pub resolve: V,
    /// Rejects the promise
    pub reject: V,
}

/// One resolving function, usable once.
///
/// Not `Clone`: invoking consumes it.
pub struct Capability<V> {
    function: V,
}

impl<V> Capability<V> {
    /// Wraps a resolving function.
    pub fn new(function: V) -> Self {
        Self { function }
    }

    /// The wrapped function value, for marking.
    pub fn value(&self) -> &V {
        &self.function
    }

    /// Calls the function through `engine`.
    pub fn invoke<E>(self, engine: &mut E, args: &[V])
    where
        E: ScriptEngine<Value = V> + ?Sized,
    {
        engine.invoke_capability(&self.function, args);
    }
}

impl<V: fmt::Debug> fmt::Debug for Capability<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Capability").field(&self.function).finish()
    }
}
