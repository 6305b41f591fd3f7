//! Unit tests for collection of bridge-held values

use crate::{runtime_with, setup};
use js_runtime::timers::{delay, set_timeout};
use js_runtime::{HostData, HostObject, Marker, PromiseState, RuntimeConfig, Value};
use promise_bridge::{BridgeStatus, BridgedPromise, RuntimeHandle, ScriptEngine};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

struct PendingOp {
    bridge: BridgedPromise<Value>,
    finalized: Rc<Cell<Option<BridgeStatus>>>,
}

impl HostData for PendingOp {
    fn class_name(&self) -> &'static str {
        "PendingOp"
    }

    fn mark(&self, marker: &mut Marker) {
        self.bridge.mark(&mut |value| marker.mark_value(value));
    }

    fn finalize(&mut self, runtime: &dyn RuntimeHandle) {
        self.bridge.free_at_runtime_teardown(runtime);
        self.finalized.set(Some(self.bridge.status()));
    }
}

#[test]
fn pending_delay_survives_collection_without_handles() {
    let (mut ctx, _) = setup();
    let pending = delay(&mut ctx, Duration::from_millis(5), Value::Smi(1));
    ctx.free_value(&pending.promise);

    ctx.run_gc();

    assert!(ctx.runtime().is_live(&pending.promise));
    assert_eq!(ctx.promise_state(&pending.promise), Some(PromiseState::Pending));
}

#[test]
fn settled_delay_is_released_to_the_collector() {
    let (mut ctx, _) = setup();
    let pending = delay(&mut ctx, Duration::from_millis(1), Value::Smi(1));
    ctx.free_value(&pending.promise);

    ctx.run();
    ctx.run_gc();

    assert!(!ctx.runtime().is_live(&pending.promise));
}

#[test]
fn unmarked_capability_is_collected() {
    let (mut ctx, _) = setup();
    let capability = ctx.new_promise_capability().unwrap();

    let freed = ctx.run_gc();

    assert_eq!(freed, 3);
    assert!(!ctx.runtime().is_live(&capability.promise));
    assert!(!ctx.runtime().is_live(&capability.resolve));
}

#[test]
fn host_object_marks_its_bridge() {
    let (mut ctx, _) = setup();
    let (bridge, promise) = BridgedPromise::init(&mut ctx);
    let finalized = Rc::new(Cell::new(None));
    let op: HostObject = Rc::new(RefCell::new(PendingOp {
        bridge,
        finalized: Rc::clone(&finalized),
    }));
    let object = ctx.new_host_object(op).unwrap();

    ctx.run_gc();
    assert!(ctx.runtime().is_live(&promise));

    ctx.free_value(&object);
    ctx.run_gc();
    assert_eq!(finalized.get(), Some(BridgeStatus::TornDown));
    assert!(!ctx.runtime().is_live(&promise));
}

#[test]
fn runtime_teardown_finalizes_pending_bridges() {
    let (runtime, _) = runtime_with(RuntimeConfig::default());
    let finalized = Rc::new(Cell::new(None));
    {
        let mut ctx = runtime.new_context().unwrap();
        let (bridge, _promise) = BridgedPromise::init(&mut ctx);
        let op: HostObject = Rc::new(RefCell::new(PendingOp {
            bridge,
            finalized: Rc::clone(&finalized),
        }));
        ctx.new_host_object(op).unwrap();
    }
    assert_eq!(finalized.get(), None);

    drop(runtime);

    assert_eq!(finalized.get(), Some(BridgeStatus::TornDown));
}

#[test]
fn automatic_collection_at_checkpoints() {
    let (runtime, _) = runtime_with(RuntimeConfig::default().with_gc_threshold(4));
    let mut ctx = runtime.new_context().unwrap();
    for _ in 0..4 {
        ctx.new_promise_capability().unwrap();
    }

    ctx.run_once(None);

    assert_eq!(runtime.gc_stats().collections, 1);
    assert_eq!(runtime.object_count(), 2);
}

#[test]
fn handles_keep_objects_alive() {
    let (mut ctx, _) = setup();
    let error = ctx.new_error(js_runtime::ErrorKind::Error, "kept").unwrap();
    assert_eq!(ctx.runtime().handle_count(&error), Some(1));

    let copy = ctx.dup_value(&error);
    ctx.free_value(&error);
    ctx.run_gc();
    assert!(ctx.runtime().is_live(&copy));

    ctx.free_value(&copy);
    ctx.run_gc();
    assert!(!ctx.runtime().is_live(&copy));
}

#[test]
fn collection_inside_handler_keeps_chain_alive() {
    let (mut ctx, output) = setup();
    let source = delay(&mut ctx, Duration::from_millis(1), Value::Smi(6));
    let collect = ctx
        .new_function("collect", vec![], |ctx, args, _| {
            ctx.run_gc();
            match args.first() {
                Some(Value::Smi(n)) => Ok(Value::Smi(n + 1)),
                _ => Err(Value::from("not a number")),
            }
        })
        .unwrap();
    let first = ctx.promise_then(&source.promise, Some(collect.clone()), None).unwrap();
    let second = ctx.promise_then(&first, None, None).unwrap();
    // only `second` keeps a handle
    ctx.free_value(&source.promise);
    ctx.free_value(&collect);
    ctx.free_value(&first);

    assert_eq!(ctx.block_on(&second, None), Ok(Value::Smi(7)));
    assert_eq!(ctx.promise_state(&first), Some(PromiseState::Fulfilled(Value::Smi(7))));
    assert!(output.contents().is_empty());
}

#[test]
fn collection_inside_timeout_callback_keeps_its_data() {
    let (mut ctx, output) = setup();
    let payload = ctx.new_error(js_runtime::ErrorKind::Error, "payload").unwrap();
    let seen = Rc::new(Cell::new(None));
    let sink = Rc::clone(&seen);
    let callback = ctx
        .new_function("collect", vec![payload.clone()], move |ctx, _, data| {
            ctx.run_gc();
            sink.set(Some(ctx.error_of(&data[0]).is_some()));
            Ok(Value::Undefined)
        })
        .unwrap();
    set_timeout(&mut ctx, callback.clone(), Duration::from_millis(1), vec![]);
    ctx.free_value(&payload);
    ctx.free_value(&callback);

    ctx.run();

    assert_eq!(seen.get(), Some(true));
    assert!(output.contents().is_empty());
}
