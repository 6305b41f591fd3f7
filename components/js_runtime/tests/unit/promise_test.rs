//! Unit tests for promise operations

use crate::{recorder, setup};
use js_runtime::{ErrorKind, PromiseState, RuntimeError, Value};
use promise_bridge::ScriptEngine;

#[test]
fn resolve_function_fulfills_and_runs_handler() {
    let (mut ctx, _) = setup();
    let capability = ctx.new_promise_capability().unwrap();
    let (on_fulfilled, seen) = recorder(&mut ctx);
    ctx.promise_then(&capability.promise, Some(on_fulfilled), None).unwrap();

    ctx.call(&capability.resolve, &[Value::Smi(42)]).unwrap();

    assert_eq!(
        ctx.promise_state(&capability.promise),
        Some(PromiseState::Fulfilled(Value::Smi(42)))
    );
    // continuations are microtasks
    assert!(seen.borrow().is_empty());
    ctx.run_jobs();
    assert_eq!(*seen.borrow(), vec![Value::Smi(42)]);
}

#[test]
fn resolving_functions_settle_once() {
    let (mut ctx, _) = setup();
    let capability = ctx.new_promise_capability().unwrap();

    ctx.call(&capability.resolve, &[Value::Smi(1)]).unwrap();
    ctx.call(&capability.resolve, &[Value::Smi(2)]).unwrap();
    ctx.call(&capability.reject, &[Value::Smi(3)]).unwrap();

    assert_eq!(
        ctx.promise_state(&capability.promise),
        Some(PromiseState::Fulfilled(Value::Smi(1)))
    );
}

#[test]
fn resolving_with_a_promise_adopts_its_state() {
    let (mut ctx, _) = setup();
    let inner = ctx.new_promise_capability().unwrap();
    let outer = ctx.new_promise_capability().unwrap();

    ctx.call(&outer.resolve, &[inner.promise.clone()]).unwrap();
    ctx.run_jobs();
    assert_eq!(ctx.promise_state(&outer.promise), Some(PromiseState::Pending));

    ctx.call(&inner.resolve, &[Value::from("done")]).unwrap();
    ctx.run_jobs();
    assert_eq!(
        ctx.promise_state(&outer.promise),
        Some(PromiseState::Fulfilled(Value::from("done")))
    );
}

#[test]
fn resolving_with_itself_rejects_with_type_error() {
    let (mut ctx, _) = setup();
    let capability = ctx.new_promise_capability().unwrap();

    ctx.call(&capability.resolve, &[capability.promise.clone()]).unwrap();

    let Some(PromiseState::Rejected(reason)) = ctx.promise_state(&capability.promise) else {
        panic!("expected a rejection");
    };
    assert_eq!(ctx.error_of(&reason).unwrap().kind, ErrorKind::TypeError);
}

#[test]
fn throwing_handler_rejects_derived_promise() {
    let (mut ctx, _) = setup();
    let capability = ctx.new_promise_capability().unwrap();
    let thrower = ctx
        .new_function("thrower", vec![], |_, _, _| Err(Value::from("bad")))
        .unwrap();
    let derived = ctx.promise_then(&capability.promise, Some(thrower), None).unwrap();
    let (on_rejected, seen) = recorder(&mut ctx);
    ctx.promise_then(&derived, None, Some(on_rejected)).unwrap();

    ctx.call(&capability.resolve, &[Value::Undefined]).unwrap();
    ctx.run_jobs();

    assert_eq!(*seen.borrow(), vec![Value::from("bad")]);
}

#[test]
fn missing_handler_passes_settlement_through() {
    let (mut ctx, _) = setup();
    let capability = ctx.new_promise_capability().unwrap();
    let derived = ctx.promise_then(&capability.promise, None, None).unwrap();

    ctx.call(&capability.reject, &[Value::Smi(9)]).unwrap();
    let result = ctx.block_on(&derived, None);

    assert_eq!(result, Err(js_runtime::AwaitError::Rejected(Value::Smi(9))));
}

#[test]
fn handler_return_value_fulfills_derived_promise() {
    let (mut ctx, _) = setup();
    let capability = ctx.new_promise_capability().unwrap();
    let double = ctx
        .new_function("double", vec![], |_, args, _| match args.first() {
            Some(Value::Smi(n)) => Ok(Value::Smi(n * 2)),
            _ => Ok(Value::Undefined),
        })
        .unwrap();
    let derived = ctx.promise_then(&capability.promise, Some(double), None).unwrap();

    ctx.call(&capability.resolve, &[Value::Smi(21)]).unwrap();

    assert_eq!(ctx.block_on(&derived, None), Ok(Value::Smi(42)));
}

#[test]
fn then_on_non_promise_fails() {
    let (mut ctx, _) = setup();
    let result = ctx.promise_then(&Value::Smi(1), None, None);
    assert!(matches!(result, Err(RuntimeError::NotAPromise)));
}

#[test]
fn queued_jobs_run_in_order() {
    let (mut ctx, _) = setup();
    let (func, seen) = recorder(&mut ctx);
    ctx.enqueue_job(func.clone(), vec![Value::Smi(1)]);
    ctx.enqueue_job(func, vec![Value::Smi(2)]);
    assert!(ctx.has_pending_jobs());

    assert_eq!(ctx.run_jobs(), 2);
    assert_eq!(*seen.borrow(), vec![Value::Smi(1), Value::Smi(2)]);
    assert!(!ctx.has_pending_jobs());
}
