//! Work on a helper thread, settled back on the loop thread.

use crate::context::Context;
use crate::object::HostData;
use core_types::{ErrorKind, JsError, Value};
use memory_manager::Marker;
use promise_bridge::{BridgedPromise, RuntimeHandle};
use std::collections::HashMap;
use std::thread;

pub(crate) struct BlockingRegistry {
    pending: HashMap<u64, BridgedPromise<Value>>,
    next_id: u64,
}

impl BlockingRegistry {
    pub(crate) fn new() -> Self {
        Self {
            pending: HashMap::new(),
            next_id: 1,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }
}

impl HostData for BlockingRegistry {
    fn class_name(&self) -> &'static str {
        "BlockingRegistry"
    }

    fn mark(&self, marker: &mut Marker) {
        for bridge in self.pending.values() {
            bridge.mark(&mut |held| marker.mark_value(held));
        }
    }

    fn finalize(&mut self, runtime: &dyn RuntimeHandle) {
        for (_, mut bridge) in self.pending.drain() {
            bridge.free_at_runtime_teardown(runtime);
        }
    }
}

/// Runs `work` on a new thread and returns a promise for its result.
///
/// The result is delivered to the loop thread through a remote handle and
/// settles the promise there: `Ok` resolves it, `Err` rejects it with an
/// error object. `work` can only produce primitive values.
pub fn spawn_blocking<F>(ctx: &mut Context, work: F) -> Value
where
    F: FnOnce() -> Result<Value, JsError> + Send + 'static,
{
    let (bridge, promise) = BridgedPromise::init(ctx);
    let id = {
        let mut registry = ctx.blocking.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.pending.insert(id, bridge);
        id
    };

    let remote = ctx.event_loop().remote();
    let spawned = thread::Builder::new()
        .name("js-blocking".to_string())
        .spawn(move || {
            let outcome = work();
            remote.send(move |ctx: &mut Context| complete(ctx, id, outcome));
        });
    if let Err(err) = spawned {
        log::error!("cannot spawn blocking worker: {}", err);
        complete(ctx, id, Err(JsError::new(ErrorKind::InternalError, err.to_string())));
    }

    ctx.dup_value(&promise)
}

/// Number of blocking operations still in flight.
pub fn pending_blocking(ctx: &Context) -> usize {
    ctx.blocking.borrow().len()
}

fn complete(ctx: &mut Context, id: u64, outcome: Result<Value, JsError>) {
    let bridge = ctx.blocking.borrow_mut().pending.remove(&id);
    // cleared by context shutdown
    let Some(mut bridge) = bridge else {
        return;
    };
    match outcome {
        Ok(value) => bridge.resolve(ctx, &[value]),
        Err(error) => {
            let reason = match ctx.new_error_from(error) {
                Ok(reason) => reason,
                Err(err) => Value::String(err.to_string()),
            };
            bridge.reject(ctx, &[reason.clone()]);
            ctx.free_value(&reason);
        }
    }
}

pub(crate) fn cancel_all(ctx: &mut Context) {
    let pending: Vec<BridgedPromise<Value>> = ctx
        .blocking
        .borrow_mut()
        .pending
        .drain()
        .map(|(_, bridge)| bridge)
        .collect();
    for mut bridge in pending {
        bridge.clear(&*ctx);
    }
}
