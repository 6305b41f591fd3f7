//! The runtime: heap, job queue, and diagnostics shared by its contexts.

use crate::context::Context;
use crate::error::RuntimeResult;
use crate::object::JsObject;
use crate::promise::Job;
use crate::rejection::RejectionTracker;
use crate::RuntimeConfig;
use async_runtime::MicrotaskQueue;
use core_types::{ObjectId, Value};
use diagnostics::Diagnostics;
use memory_manager::{GcStats, Heap, HeapConfig, HeapError};
use promise_bridge::RuntimeHandle;
use std::cell::RefCell;
use std::rc::Rc;

pub(crate) struct RuntimeInner {
    pub(crate) heap: RefCell<Heap<JsObject>>,
    pub(crate) jobs: RefCell<MicrotaskQueue<Job>>,
    pub(crate) rejections: RefCell<RejectionTracker>,
    /// Values of jobs and callbacks currently running
    pub(crate) running: RefCell<Vec<Value>>,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) config: RuntimeConfig,
}

impl RuntimeHandle for RuntimeInner {
    fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

impl Drop for RuntimeInner {
    fn drop(&mut self) {
        self.jobs.get_mut().clear();
        self.running.get_mut().clear();
        let objects = self.heap.get_mut().drain();
        log::debug!("runtime teardown: releasing {} objects", objects.len());
        for object in objects {
            if let JsObject::Host(host) = object {
                host.borrow_mut().finalize(&*self);
            }
        }
    }
}

/// A JavaScript runtime.
///
/// Cheap to clone; every clone and every [`Context`] created from it share
/// one heap. Host objects still alive when the last handle goes away are
/// finalized through the runtime teardown path.
///
/// # Examples
///
/// ```
/// use js_runtime::{Runtime, RuntimeConfig};
///
/// let runtime = Runtime::new(RuntimeConfig::default());
/// let ctx = runtime.new_context().unwrap();
/// assert_eq!(ctx.runtime().object_count(), 2);
/// ```
#[derive(Clone)]
pub struct Runtime {
    pub(crate) inner: Rc<RuntimeInner>,
}

impl Runtime {
    /// Creates a runtime reporting to standard error.
    pub fn new(config: RuntimeConfig) -> Self {
        Self::with_diagnostics(config, Diagnostics::stderr())
    }

    /// Creates a runtime reporting to `diagnostics`.
    pub fn with_diagnostics(config: RuntimeConfig, diagnostics: Diagnostics) -> Self {
        let heap = Heap::with_config(HeapConfig {
            max_objects: config.max_heap_objects,
            gc_threshold: config.gc_threshold,
        });
        Self {
            inner: Rc::new(RuntimeInner {
                heap: RefCell::new(heap),
                jobs: RefCell::new(MicrotaskQueue::new()),
                rejections: RefCell::new(RejectionTracker::new()),
                running: RefCell::new(Vec::new()),
                diagnostics,
                config,
            }),
        }
    }

    /// Creates a context with its own event loop.
    pub fn new_context(&self) -> RuntimeResult<Context> {
        Context::new(self.clone())
    }

    /// The runtime configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    /// The diagnostic stream.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.inner.diagnostics
    }

    /// Number of live heap objects.
    pub fn object_count(&self) -> usize {
        self.inner.heap.borrow().len()
    }

    /// Returns true if `value` is an object still on the heap.
    pub fn is_live(&self, value: &Value) -> bool {
        value
            .as_object()
            .is_some_and(|id| self.inner.heap.borrow().contains(id))
    }

    /// Number of handles held on an object.
    pub fn handle_count(&self, value: &Value) -> Option<u32> {
        value
            .as_object()
            .and_then(|id| self.inner.heap.borrow().handle_count(id))
    }

    /// Collection counters.
    pub fn gc_stats(&self) -> GcStats {
        self.inner.heap.borrow().stats().clone()
    }

    /// Releases a handle without a context.
    ///
    /// Primitives are ignored. Releasing a handle that does not exist is a
    /// bug in the caller and is logged.
    pub fn free_value_rt(&self, value: &Value) {
        if let Some(id) = value.as_object() {
            if let Err(err) = self.inner.heap.borrow_mut().free(id) {
                log::warn!("free_value: {}", err);
            }
        }
    }

    pub(crate) fn dup(&self, value: &Value) {
        if let Some(id) = value.as_object() {
            if let Err(err) = self.inner.heap.borrow_mut().dup(id) {
                log::warn!("dup_value: {}", err);
            }
        }
    }

    pub(crate) fn allocate(&self, object: JsObject) -> Result<ObjectId, HeapError> {
        self.inner.heap.borrow_mut().allocate(object)
    }
}

impl RuntimeHandle for Runtime {
    fn diagnostics(&self) -> &Diagnostics {
        &self.inner.diagnostics
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("objects", &self.object_count())
            .field("config", &self.inner.config)
            .finish()
    }
}
