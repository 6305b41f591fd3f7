//! Execution contexts.

use crate::blocking::{self, BlockingRegistry};
use crate::error::{RuntimeError, RuntimeResult};
use crate::object::{HostObject, JsObject, NativeFunction, ResolvingKind};
use crate::runtime::Runtime;
use crate::timers::{self, TimerRegistry};
use async_runtime::{EventLoop, LoopHandle};
use core_types::{ErrorKind, JsError, ObjectId, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// A context in which native code creates values and runs functions.
///
/// Each context owns one event loop for its whole life. Values returned by
/// the `new_*` constructors, by [`promise_then`](Context::promise_then), and
/// by the async operations in [`timers`](crate::timers) and
/// [`blocking`](crate::blocking) carry a handle the caller releases with
/// [`free_value`](Context::free_value). Other returned values are only
/// guaranteed to live until the next collection unless duplicated with
/// [`dup_value`](Context::dup_value).
pub struct Context {
    runtime: Runtime,
    event_loop: LoopHandle<Context>,
    pub(crate) timers: Rc<RefCell<TimerRegistry>>,
    pub(crate) blocking: Rc<RefCell<BlockingRegistry>>,
    registry_objects: Vec<Value>,
    closed: bool,
}

impl Context {
    pub(crate) fn new(runtime: Runtime) -> RuntimeResult<Self> {
        let timers = Rc::new(RefCell::new(TimerRegistry::new()));
        let blocking = Rc::new(RefCell::new(BlockingRegistry::new()));
        let mut ctx = Self {
            runtime,
            event_loop: Rc::new(EventLoop::new()),
            timers: Rc::clone(&timers),
            blocking: Rc::clone(&blocking),
            registry_objects: Vec::new(),
            closed: false,
        };
        // The registries live in the heap so the collector asks them for
        // the values their bridges hold.
        let timers: HostObject = timers;
        let timers = ctx.new_host_object(timers)?;
        ctx.registry_objects.push(timers);
        let blocking: HostObject = blocking;
        let blocking = ctx.new_host_object(blocking)?;
        ctx.registry_objects.push(blocking);
        log::debug!("context created on loop {:?}", ctx.event_loop.id());
        Ok(ctx)
    }

    /// The runtime this context belongs to.
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// The event loop attached to this context.
    pub fn event_loop(&self) -> &LoopHandle<Context> {
        &self.event_loop
    }

    /// Returns true once [`close`](Context::close) has run.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Takes a handle on `value` and returns it.
    pub fn dup_value(&self, value: &Value) -> Value {
        self.runtime.dup(value);
        value.clone()
    }

    /// Releases a handle on `value`. Primitives are ignored.
    pub fn free_value(&self, value: &Value) {
        self.runtime.free_value_rt(value);
    }

    pub(crate) fn alloc(&self, object: JsObject) -> RuntimeResult<ObjectId> {
        if self.closed {
            return Err(RuntimeError::ContextClosed);
        }
        Ok(self.runtime.allocate(object)?)
    }

    fn alloc_owned(&self, object: JsObject) -> RuntimeResult<Value> {
        let value = Value::Object(self.alloc(object)?);
        self.runtime.dup(&value);
        Ok(value)
    }

    /// Creates an error object.
    pub fn new_error(&mut self, kind: ErrorKind, message: impl Into<String>) -> RuntimeResult<Value> {
        self.new_error_from(JsError::new(kind, message))
    }

    /// Creates an error object from a native error.
    pub fn new_error_from(&mut self, error: JsError) -> RuntimeResult<Value> {
        self.alloc_owned(JsObject::Error(error))
    }

    /// Creates a native function.
    ///
    /// `data` is passed to every call and kept alive with the function.
    pub fn new_function<F>(&mut self, name: &str, data: Vec<Value>, func: F) -> RuntimeResult<Value>
    where
        F: Fn(&mut Context, &[Value], &[Value]) -> Result<Value, Value> + 'static,
    {
        self.alloc_owned(JsObject::Function(NativeFunction {
            name: name.to_string(),
            func: Rc::new(func),
            data,
        }))
    }

    /// Places a native structure in the heap.
    pub fn new_host_object(&mut self, host: HostObject) -> RuntimeResult<Value> {
        self.alloc_owned(JsObject::Host(host))
    }

    /// Builds an error to throw; falls back to a string when the heap is
    /// exhausted.
    pub(crate) fn throw_error(&mut self, kind: ErrorKind, message: &str) -> Value {
        match self.alloc(JsObject::Error(JsError::new(kind, message))) {
            Ok(id) => Value::Object(id),
            Err(err) => {
                log::warn!("cannot allocate {}: {}", kind, err);
                Value::String(format!("{}: {}", kind, message))
            }
        }
    }

    /// The native error behind an error object.
    pub fn error_of(&self, value: &Value) -> Option<JsError> {
        let id = value.as_object()?;
        match self.runtime.inner.heap.borrow().get(id) {
            Some(JsObject::Error(error)) => Some(error.clone()),
            _ => None,
        }
    }

    /// Returns true if `value` is callable.
    pub fn is_function(&self, value: &Value) -> bool {
        let Some(id) = value.as_object() else {
            return false;
        };
        matches!(
            self.runtime.inner.heap.borrow().get(id),
            Some(JsObject::Function(_)) | Some(JsObject::ResolvingFunction { .. })
        )
    }

    /// Calls `func` with `args`.
    ///
    /// Returns the result, or the thrown value.
    pub fn call(&mut self, func: &Value, args: &[Value]) -> Result<Value, Value> {
        enum Callee {
            Native(NativeFunction),
            Resolving(ObjectId, ResolvingKind, Rc<std::cell::Cell<bool>>),
        }

        let callee = func.as_object().and_then(|id| {
            match self.runtime.inner.heap.borrow().get(id) {
                Some(JsObject::Function(function)) => Some(Callee::Native(function.clone())),
                Some(JsObject::ResolvingFunction {
                    promise,
                    kind,
                    already_resolved,
                }) => Some(Callee::Resolving(*promise, *kind, Rc::clone(already_resolved))),
                _ => None,
            }
        });

        match callee {
            Some(Callee::Native(function)) => (function.func)(self, args, &function.data),
            Some(Callee::Resolving(promise, kind, already_resolved)) => {
                if already_resolved.replace(true) {
                    return Ok(Value::Undefined);
                }
                let argument = args.first().cloned().unwrap_or(Value::Undefined);
                match kind {
                    ResolvingKind::Resolve => self.resolve_promise(promise, argument),
                    ResolvingKind::Reject => self.reject_promise(promise, argument),
                }
                Ok(Value::Undefined)
            }
            None => Err(self.throw_error(ErrorKind::TypeError, "value is not a function")),
        }
    }

    /// Runs a full collection.
    ///
    /// Roots are the handles, the pending and running jobs, and the tracked
    /// rejections.
    /// Host objects that were swept are finalized. Returns the number of
    /// objects freed.
    pub fn run_gc(&mut self) -> usize {
        let inner = &self.runtime.inner;
        let collection = {
            let jobs = inner.jobs.borrow();
            let rejections = inner.rejections.borrow();
            let running = inner.running.borrow();
            let mut heap = inner.heap.borrow_mut();
            heap.collect(|marker| {
                for job in jobs.iter() {
                    job.mark(marker);
                }
                for value in running.iter() {
                    marker.mark_value(value);
                }
                rejections.mark(marker);
            })
        };
        let freed = collection.freed.len();
        for object in collection.freed {
            if let JsObject::Host(host) = object {
                host.borrow_mut().finalize(&*self.runtime.inner);
            }
        }
        freed
    }

    /// Runs `f` with `values` reported to every collection it triggers.
    ///
    /// Host-run jobs and callbacks hold their values outside the heap graph
    /// while script runs, and script may collect.
    pub(crate) fn with_rooted<R>(&mut self, values: Vec<Value>, f: impl FnOnce(&mut Self) -> R) -> R {
        let base = {
            let mut running = self.runtime.inner.running.borrow_mut();
            let base = running.len();
            running.extend(values);
            base
        };
        let result = f(self);
        self.runtime.inner.running.borrow_mut().truncate(base);
        result
    }

    pub(crate) fn maybe_collect(&mut self) {
        let due = self.runtime.inner.heap.borrow().should_collect();
        if due {
            self.run_gc();
        }
    }

    /// Shuts the context down.
    ///
    /// Pending timers are cancelled and every in-flight bridged promise is
    /// cleared, so its promise stays pending forever. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        timers::cancel_all(self);
        blocking::cancel_all(self);
        for value in std::mem::take(&mut self.registry_objects) {
            self.runtime.free_value_rt(&value);
        }
        log::debug!("context on loop {:?} closed", self.event_loop.id());
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("event_loop", &self.event_loop)
            .field("closed", &self.closed)
            .finish()
    }
}

/// The event loop attached to `ctx`.
pub fn get_event_loop(ctx: &Context) -> &LoopHandle<Context> {
    ctx.event_loop()
}
