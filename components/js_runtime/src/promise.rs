//! Promise operations and the job queue.

use crate::context::Context;
use crate::error::{RuntimeError, RuntimeResult};
use crate::object::{JsObject, ResolvingKind};
use async_runtime::{PromiseReaction, PromiseRecord, PromiseState, ReactionCapability, ReactionJob, ReactionKind};
use core_types::{ErrorKind, ObjectId, Value};
use diagnostics::Diagnostics;
use memory_manager::Marker;
use promise_bridge::{PromiseCapability, ScriptEngine};
use std::cell::Cell;
use std::rc::Rc;

/// A microtask.
#[derive(Debug)]
pub(crate) enum Job {
    /// A `then` handler, or a pass-through to a derived promise
    Reaction(ReactionJob<Value>),
    /// Adopt the state of `thenable` into `promise`
    ResolveThenable { promise: ObjectId, thenable: ObjectId },
    /// A plain callback
    Callback { func: Value, args: Vec<Value> },
}

impl Job {
    /// Visits every value the job holds.
    pub(crate) fn for_each_value(&self, mut f: impl FnMut(&Value)) {
        match self {
            Job::Reaction(job) => job.for_each_value(f),
            Job::ResolveThenable { promise, thenable } => {
                f(&Value::Object(*promise));
                f(&Value::Object(*thenable));
            }
            Job::Callback { func, args } => {
                f(func);
                for arg in args {
                    f(arg);
                }
            }
        }
    }

    pub(crate) fn mark(&self, marker: &mut Marker) {
        self.for_each_value(|value| marker.mark_value(value));
    }
}

impl Context {
    fn promise_id(&self, value: &Value) -> Option<ObjectId> {
        let id = value.as_object()?;
        match self.runtime().inner.heap.borrow().get(id) {
            Some(JsObject::Promise(_)) => Some(id),
            _ => None,
        }
    }

    /// Returns true if `value` is a promise.
    pub fn is_promise(&self, value: &Value) -> bool {
        self.promise_id(value).is_some()
    }

    /// A snapshot of a promise's state.
    pub fn promise_state(&self, promise: &Value) -> Option<PromiseState<Value>> {
        let id = promise.as_object()?;
        match self.runtime().inner.heap.borrow().get(id) {
            Some(JsObject::Promise(record)) => Some(record.state().clone()),
            _ => None,
        }
    }

    pub(crate) fn create_capability(&mut self) -> RuntimeResult<PromiseCapability<Value>> {
        let promise = self.alloc(JsObject::Promise(PromiseRecord::new()))?;
        let (resolve, reject) = self.create_resolving_functions(promise)?;
        Ok(PromiseCapability {
            promise: Value::Object(promise),
            resolve,
            reject,
        })
    }

    fn create_resolving_functions(&mut self, promise: ObjectId) -> RuntimeResult<(Value, Value)> {
        let already_resolved = Rc::new(Cell::new(false));
        let resolve = self.alloc(JsObject::ResolvingFunction {
            promise,
            kind: ResolvingKind::Resolve,
            already_resolved: Rc::clone(&already_resolved),
        })?;
        let reject = self.alloc(JsObject::ResolvingFunction {
            promise,
            kind: ResolvingKind::Reject,
            already_resolved,
        })?;
        Ok((Value::Object(resolve), Value::Object(reject)))
    }

    /// Resolves `promise` with `resolution`, following promise resolutions.
    pub(crate) fn resolve_promise(&mut self, promise: ObjectId, resolution: Value) {
        if resolution.as_object() == Some(promise) {
            let error = self.throw_error(ErrorKind::TypeError, "Chaining cycle detected for promise");
            self.reject_promise(promise, error);
            return;
        }
        if let Some(thenable) = self.promise_id(&resolution) {
            self.enqueue(Job::ResolveThenable { promise, thenable });
            return;
        }
        self.fulfill_promise(promise, resolution);
    }

    fn fulfill_promise(&mut self, promise: ObjectId, value: Value) {
        let jobs = match self.runtime().inner.heap.borrow_mut().get_mut(promise) {
            Some(JsObject::Promise(record)) => record.fulfill(value),
            _ => return,
        };
        match jobs {
            Ok(jobs) => {
                log::trace!("promise {} fulfilled, {} reactions", promise, jobs.len());
                for job in jobs {
                    self.enqueue(Job::Reaction(job));
                }
            }
            Err(err) => log::debug!("promise {}: {}", promise, err),
        }
    }

    pub(crate) fn reject_promise(&mut self, promise: ObjectId, reason: Value) {
        let (jobs, unhandled) = match self.runtime().inner.heap.borrow_mut().get_mut(promise) {
            Some(JsObject::Promise(record)) => {
                let unhandled = !record.is_handled();
                (record.reject(reason), unhandled)
            }
            _ => return,
        };
        match jobs {
            Ok(jobs) => {
                log::trace!("promise {} rejected, {} reactions", promise, jobs.len());
                if unhandled {
                    self.runtime().inner.rejections.borrow_mut().rejected(promise);
                }
                for job in jobs {
                    self.enqueue(Job::Reaction(job));
                }
            }
            Err(err) => log::debug!("promise {}: {}", promise, err),
        }
    }

    fn add_reaction(&mut self, promise: ObjectId, reaction: PromiseReaction<Value>) {
        let (job, was_unhandled) = match self.runtime().inner.heap.borrow_mut().get_mut(promise) {
            Some(JsObject::Promise(record)) => {
                let was_unhandled = record.is_unhandled_rejection();
                (record.then(reaction), was_unhandled)
            }
            _ => return,
        };
        if was_unhandled {
            self.runtime().inner.rejections.borrow_mut().handled(promise);
        }
        if let Some(job) = job {
            self.enqueue(Job::Reaction(job));
        }
    }

    pub(crate) fn mark_promise_handled(&mut self, promise: ObjectId) {
        if let Some(JsObject::Promise(record)) = self.runtime().inner.heap.borrow_mut().get_mut(promise) {
            record.mark_handled();
        }
        self.runtime().inner.rejections.borrow_mut().handled(promise);
    }

    /// Registers handlers on `promise` and returns the derived promise.
    ///
    /// A missing handler passes the settlement through to the derived
    /// promise. A handler that throws rejects it.
    pub fn promise_then(
        &mut self,
        promise: &Value,
        on_fulfilled: Option<Value>,
        on_rejected: Option<Value>,
    ) -> RuntimeResult<Value> {
        let id = self.promise_id(promise).ok_or(RuntimeError::NotAPromise)?;
        let capability = self.create_capability()?;
        let derived = capability.promise.clone();
        self.add_reaction(
            id,
            PromiseReaction::new(
                on_fulfilled,
                on_rejected,
                Some(ReactionCapability {
                    promise: capability.promise,
                    resolve: capability.resolve,
                    reject: capability.reject,
                }),
            ),
        );
        Ok(self.dup_value(&derived))
    }

    fn enqueue(&self, job: Job) {
        self.runtime().inner.jobs.borrow_mut().enqueue(job);
    }

    /// Queues `func(args)` as a microtask.
    pub fn enqueue_job(&mut self, func: Value, args: Vec<Value>) {
        self.enqueue(Job::Callback { func, args });
    }

    /// Returns true if microtasks are waiting.
    pub fn has_pending_jobs(&self) -> bool {
        !self.runtime().inner.jobs.borrow().is_empty()
    }

    /// Drains the microtask queue, then reports unhandled rejections.
    ///
    /// Jobs queued while draining run in the same call. Returns the number
    /// of jobs run.
    pub fn run_jobs(&mut self) -> usize {
        let mut ran = 0;
        loop {
            let job = self.runtime().inner.jobs.borrow_mut().dequeue();
            let Some(job) = job else {
                break;
            };
            self.run_job(job);
            ran += 1;
        }
        self.report_unhandled_rejections();
        ran
    }

    fn run_job(&mut self, job: Job) {
        let mut roots = Vec::new();
        job.for_each_value(|value| roots.push(value.clone()));
        self.with_rooted(roots, |ctx| match job {
            Job::Reaction(job) => ctx.run_reaction(job),
            Job::ResolveThenable { promise, thenable } => match ctx.create_resolving_functions(promise) {
                Ok((resolve, reject)) => {
                    ctx.add_reaction(thenable, PromiseReaction::new(Some(resolve), Some(reject), None));
                }
                Err(err) => {
                    let reason = Value::String(err.to_string());
                    ctx.reject_promise(promise, reason);
                }
            },
            Job::Callback { func, args } => {
                ctx.call_handler(&func, &args);
            }
        });
    }

    fn run_reaction(&mut self, job: ReactionJob<Value>) {
        let ReactionJob {
            kind,
            handler,
            capability,
            argument,
        } = job;
        let outcome = match &handler {
            Some(handler) => self.call(handler, std::slice::from_ref(&argument)),
            None => match kind {
                ReactionKind::Fulfill => Ok(argument),
                ReactionKind::Reject => Err(argument),
            },
        };
        match (capability, outcome) {
            (Some(capability), Ok(value)) => {
                self.call_handler(&capability.resolve, &[value]);
            }
            (Some(capability), Err(reason)) => {
                self.call_handler(&capability.reject, &[reason]);
            }
            (None, Ok(_)) => {}
            (None, Err(exception)) => self.report_exception(&exception, true),
        }
    }

    fn report_unhandled_rejections(&mut self) {
        let pending = self.runtime().inner.rejections.borrow_mut().take();
        for promise in pending {
            let reason = match self.runtime().inner.heap.borrow().get(promise) {
                Some(JsObject::Promise(record)) if record.is_unhandled_rejection() => match record.state() {
                    PromiseState::Rejected(reason) => reason.clone(),
                    _ => continue,
                },
                _ => continue,
            };
            log::warn!("unhandled promise rejection: promise {}", promise);
            if self.runtime().config().report_unhandled_rejections {
                let report = self.exception_report(&reason);
                self.runtime().diagnostics().report_unhandled_rejection(&report);
            }
        }
    }
}

impl ScriptEngine for Context {
    type Value = Value;

    fn diagnostics(&self) -> &Diagnostics {
        self.runtime().diagnostics()
    }

    fn new_promise_capability(&mut self) -> Option<PromiseCapability<Value>> {
        match self.create_capability() {
            Ok(capability) => Some(capability),
            Err(err) => {
                log::error!("cannot create promise: {}", err);
                None
            }
        }
    }

    fn invoke_capability(&mut self, function: &Value, args: &[Value]) {
        if let Err(exception) = self.call(function, args) {
            self.report_exception(&exception, true);
        }
    }
}
