//! Heap object kinds

use crate::Context;
use async_runtime::PromiseRecord;
use core_types::{JsError, ObjectId, Value};
use memory_manager::{Marker, Trace};
use promise_bridge::RuntimeHandle;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Signature of a native function body.
///
/// Receives the calling context, the call arguments, and the values captured
/// at creation. Returns the result or the thrown value.
pub type NativeFn = Rc<dyn Fn(&mut Context, &[Value], &[Value]) -> Result<Value, Value>>;

/// A function implemented in Rust.
///
/// Heap values the body needs must be passed as `data`, which is traced.
/// Values captured inside the closure itself are invisible to the collector.
#[derive(Clone)]
pub struct NativeFunction {
    pub(crate) name: String,
    pub(crate) func: NativeFn,
    pub(crate) data: Vec<Value>,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("data", &self.data)
            .finish()
    }
}

/// Which resolving function of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvingKind {
    /// Resolves (or chains) the promise
    Resolve,
    /// Rejects the promise
    Reject,
}

/// A native structure living in the heap.
///
/// Host objects hold references the heap cannot see (bridged promises,
/// pending callbacks). They report them from [`mark`](HostData::mark) and
/// release them in [`finalize`](HostData::finalize), which runs when the
/// object is swept or the runtime shuts down.
pub trait HostData {
    /// Name used in debug output.
    fn class_name(&self) -> &'static str;

    /// Reports every value this object keeps alive.
    fn mark(&self, marker: &mut Marker);

    /// Releases held values. No context is available here.
    fn finalize(&mut self, runtime: &dyn RuntimeHandle);
}

/// Shared pointer to a host object.
pub type HostObject = Rc<RefCell<dyn HostData>>;

/// Everything the heap can hold.
pub enum JsObject {
    /// A promise
    Promise(PromiseRecord<Value>),
    /// One function of a resolve/reject pair
    ResolvingFunction {
        /// The promise it settles
        promise: ObjectId,
        /// Resolve or reject
        kind: ResolvingKind,
        /// Shared with the other function of the pair
        already_resolved: Rc<Cell<bool>>,
    },
    /// A native function
    Function(NativeFunction),
    /// An error object
    Error(JsError),
    /// A native structure
    Host(HostObject),
}

impl Trace for JsObject {
    fn trace(&self, marker: &mut Marker) {
        match self {
            JsObject::Promise(record) => record.for_each_value(|value| marker.mark_value(value)),
            JsObject::ResolvingFunction { promise, .. } => marker.mark(*promise),
            JsObject::Function(function) => function.data.trace(marker),
            JsObject::Error(_) => {}
            JsObject::Host(host) => host.borrow().mark(marker),
        }
    }
}

impl fmt::Debug for JsObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsObject::Promise(record) => f.debug_tuple("Promise").field(record.state()).finish(),
            JsObject::ResolvingFunction { promise, kind, .. } => f
                .debug_struct("ResolvingFunction")
                .field("promise", promise)
                .field("kind", kind)
                .finish(),
            JsObject::Function(function) => function.fmt(f),
            JsObject::Error(error) => f.debug_tuple("Error").field(error).finish(),
            JsObject::Host(host) => match host.try_borrow() {
                Ok(host) => write!(f, "Host({})", host.class_name()),
                Err(_) => write!(f, "Host(<borrowed>)"),
            },
        }
    }
}
