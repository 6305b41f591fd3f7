use crate::{BridgedPromise, ScriptEngine};

/// Creates a promise already fulfilled with `args`.
pub fn new_resolved_promise<E>(engine: &mut E, args: &[E::Value]) -> E::Value
where
    E: ScriptEngine + ?Sized,
{
    new_settled_promise(engine, false, args)
}

/// Creates a promise already rejected with `args`.
pub fn new_rejected_promise<E>(engine: &mut E, args: &[E::Value]) -> E::Value
where
    E: ScriptEngine + ?Sized,
{
    new_settled_promise(engine, true, args)
}

fn new_settled_promise<E>(engine: &mut E, is_reject: bool, args: &[E::Value]) -> E::Value
where
    E: ScriptEngine + ?Sized,
{
    let (mut bridge, promise) = BridgedPromise::init(engine);
    bridge.settle(engine, is_reject, args);
    promise
}
