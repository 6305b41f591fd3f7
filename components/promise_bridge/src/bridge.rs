//! The bridged promise state machine.

use crate::engine::{Capability, PromiseCapability, RuntimeHandle, ScriptEngine};
use diagnostics::{check_some, error_and_abort, Diagnostics};
use std::fmt;
use std::mem;

/// Observable lifecycle state of a [`BridgedPromise`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeStatus {
    /// Waiting for the native operation to complete.
    Pending,
    /// One of the resolving functions ran.
    Settled,
    /// Abandoned; the script promise stays pending forever.
    Cleared,
    /// Released while the runtime was shutting down.
    TornDown,
}

enum State<V> {
    Pending {
        promise: V,
        resolve: Capability<V>,
        reject: Capability<V>,
    },
    // The promise is kept for observation only; the engine owns it now.
    Settled {
        promise: V,
    },
    Cleared,
    TornDown,
}

/// A capability taken out of a bridge, ready to run.
///
/// Produced by [`BridgedPromise::take_settlement`]. The bridge is already
/// `Settled` when this exists, so running it can safely destroy whatever
/// structure held the bridge.
pub struct Settlement<V> {
    capability: Capability<V>,
    is_rejection: bool,
}

impl<V> Settlement<V> {
    /// Whether this settlement rejects the promise.
    pub fn is_rejection(&self) -> bool {
        self.is_rejection
    }

    /// Runs the resolving function with `args`.
    pub fn invoke<E>(self, engine: &mut E, args: &[V])
    where
        E: ScriptEngine<Value = V> + ?Sized,
    {
        self.capability.invoke(engine, args);
    }
}

impl<V: fmt::Debug> fmt::Debug for Settlement<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settlement")
            .field("capability", &self.capability)
            .field("is_rejection", &self.is_rejection)
            .finish()
    }
}

/// Native-side owner of one script promise and its resolving functions.
///
/// Created when a native operation starts, settled exactly once when it
/// completes. Settling a bridge that is not pending is a defect in native
/// code and goes to the fatal path.
pub struct BridgedPromise<V> {
    state: State<V>,
}

impl<V: Clone + fmt::Debug> BridgedPromise<V> {
    /// Creates a pending promise and returns the bridge with the promise
    /// value to hand to script.
    ///
    /// Failing to allocate the promise is fatal.
    pub fn init<E>(engine: &mut E) -> (Self, V)
    where
        E: ScriptEngine<Value = V> + ?Sized,
    {
        let capability = engine.new_promise_capability();
        let PromiseCapability {
            promise,
            resolve,
            reject,
        } = check_some!(engine.diagnostics(), capability);
        log::trace!("bridge init: promise {:?}", promise);
        let bridge = Self {
            state: State::Pending {
                promise: promise.clone(),
                resolve: Capability::new(resolve),
                reject: Capability::new(reject),
            },
        };
        (bridge, promise)
    }

    /// The current lifecycle state.
    pub fn status(&self) -> BridgeStatus {
        match self.state {
            State::Pending { .. } => BridgeStatus::Pending,
            State::Settled { .. } => BridgeStatus::Settled,
            State::Cleared => BridgeStatus::Cleared,
            State::TornDown => BridgeStatus::TornDown,
        }
    }

    /// Returns true until the bridge settles, clears, or is torn down.
    pub fn is_pending(&self) -> bool {
        matches!(self.state, State::Pending { .. })
    }

    /// The promise value, while pending or after settlement.
    pub fn promise(&self) -> Option<&V> {
        match &self.state {
            State::Pending { promise, .. } | State::Settled { promise } => Some(promise),
            State::Cleared | State::TornDown => None,
        }
    }

    /// Moves the bridge to `Settled` and returns the capability to run.
    ///
    /// The other capability is released here. Owners that keep the bridge
    /// behind a borrow use this to end the borrow before any script runs.
    pub fn take_settlement(&mut self, diagnostics: &Diagnostics, is_reject: bool) -> Settlement<V> {
        match mem::replace(&mut self.state, State::Cleared) {
            State::Pending {
                promise,
                resolve,
                reject,
            } => {
                log::trace!(
                    "bridge settle: promise {:?} ({})",
                    promise,
                    if is_reject { "reject" } else { "resolve" }
                );
                self.state = State::Settled { promise };
                let capability = if is_reject { reject } else { resolve };
                Settlement {
                    capability,
                    is_rejection: is_reject,
                }
            }
            previous => {
                self.state = previous;
                error_and_abort!(diagnostics, self.is_pending())
            }
        }
    }

    /// Calls the resolve or reject function with `args`.
    ///
    /// Releases both functions and keeps the promise value. Fatal unless
    /// the bridge is pending.
    pub fn settle<E>(&mut self, engine: &mut E, is_reject: bool, args: &[V])
    where
        E: ScriptEngine<Value = V> + ?Sized,
    {
        let settlement = self.take_settlement(engine.diagnostics(), is_reject);
        settlement.invoke(engine, args);
    }

    /// Settles with the resolve function.
    pub fn resolve<E>(&mut self, engine: &mut E, args: &[V])
    where
        E: ScriptEngine<Value = V> + ?Sized,
    {
        self.settle(engine, false, args);
    }

    /// Settles with the reject function.
    pub fn reject<E>(&mut self, engine: &mut E, args: &[V])
    where
        E: ScriptEngine<Value = V> + ?Sized,
    {
        self.settle(engine, true, args);
    }

    /// Abandons a pending bridge without running either function.
    ///
    /// Releases all three values; the script promise never settles. Fatal
    /// unless the bridge is pending.
    pub fn clear<E>(&mut self, engine: &E)
    where
        E: ScriptEngine<Value = V> + ?Sized,
    {
        match &self.state {
            State::Pending { promise, .. } => {
                log::trace!("bridge clear: promise {:?}", promise);
                self.state = State::Cleared;
            }
            _ => error_and_abort!(engine.diagnostics(), self.is_pending()),
        }
    }

    /// Reports every value the bridge keeps alive.
    ///
    /// Pure traversal; callable from inside a collection pause.
    pub fn mark(&self, mark: &mut dyn FnMut(&V)) {
        if let State::Pending {
            promise,
            resolve,
            reject,
        } = &self.state
        {
            mark(promise);
            mark(resolve.value());
            mark(reject.value());
        }
    }

    /// Releases a pending bridge while the runtime shuts down.
    ///
    /// Only runtime-level services are used; every context may already be
    /// gone. Fatal unless the bridge is pending.
    pub fn free_at_runtime_teardown<R>(&mut self, runtime: &R)
    where
        R: RuntimeHandle + ?Sized,
    {
        match &self.state {
            State::Pending { promise, .. } => {
                log::trace!("bridge teardown: promise {:?}", promise);
                self.state = State::TornDown;
            }
            _ => error_and_abort!(runtime.diagnostics(), self.is_pending()),
        }
    }
}

impl<V> Drop for BridgedPromise<V> {
    fn drop(&mut self) {
        if matches!(self.state, State::Pending { .. }) {
            log::warn!("bridged promise dropped while pending; it will never settle");
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for BridgedPromise<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("BridgedPromise");
        match &self.state {
            State::Pending { promise, .. } => s.field("state", &"Pending").field("promise", promise),
            State::Settled { promise } => s.field("state", &"Settled").field("promise", promise),
            State::Cleared => s.field("state", &"Cleared"),
            State::TornDown => s.field("state", &"TornDown"),
        };
        s.finish()
    }
}
