//! Timer operations built on the promise bridge.
//!
//! [`delay`] returns a promise that a loop timer settles later. The bridge
//! and the value it will resolve with live in the context's timer registry,
//! a host object that reports them to the collector until the timer fires
//! or is cleared.

use crate::context::Context;
use crate::object::HostData;
use async_runtime::{Task, TimerId};
use core_types::Value;
use memory_manager::Marker;
use promise_bridge::{BridgedPromise, RuntimeHandle};
use std::collections::HashMap;
use std::time::Duration;

/// Identifies a timer created by [`delay`] or [`set_timeout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeoutId(u64);

/// A pending [`delay`].
#[derive(Debug, Clone, PartialEq)]
pub struct Delay {
    /// Pass to [`clear_timeout`] to abandon the delay
    pub id: TimeoutId,
    /// Resolves with the delay value once the timer fires
    pub promise: Value,
}

enum TimerKind {
    Delay {
        bridge: BridgedPromise<Value>,
        value: Value,
    },
    Timeout {
        callback: Value,
        args: Vec<Value>,
    },
}

struct TimerEntry {
    timer: TimerId,
    kind: TimerKind,
}

/// Timers of one context.
pub(crate) struct TimerRegistry {
    entries: HashMap<TimeoutId, TimerEntry>,
    next_id: u64,
}

impl TimerRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
            next_id: 1,
        }
    }

    fn next_id(&mut self) -> TimeoutId {
        let id = TimeoutId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl HostData for TimerRegistry {
    fn class_name(&self) -> &'static str {
        "TimerRegistry"
    }

    fn mark(&self, marker: &mut Marker) {
        for entry in self.entries.values() {
            match &entry.kind {
                TimerKind::Delay { bridge, value } => {
                    bridge.mark(&mut |held| marker.mark_value(held));
                    marker.mark_value(value);
                }
                TimerKind::Timeout { callback, args } => {
                    marker.mark_value(callback);
                    for arg in args {
                        marker.mark_value(arg);
                    }
                }
            }
        }
    }

    fn finalize(&mut self, runtime: &dyn RuntimeHandle) {
        for (_, entry) in self.entries.drain() {
            if let TimerKind::Delay { mut bridge, .. } = entry.kind {
                bridge.free_at_runtime_teardown(runtime);
            }
        }
    }
}

/// Returns a promise that resolves with `value` after `duration`.
pub fn delay(ctx: &mut Context, duration: Duration, value: Value) -> Delay {
    let (bridge, promise) = BridgedPromise::init(ctx);
    let id = ctx.timers.borrow_mut().next_id();
    let timer = ctx
        .event_loop()
        .set_timer(duration, Task::new(move |ctx: &mut Context| fire(ctx, id)));
    ctx.timers.borrow_mut().entries.insert(
        id,
        TimerEntry {
            timer,
            kind: TimerKind::Delay { bridge, value },
        },
    );
    Delay {
        id,
        promise: ctx.dup_value(&promise),
    }
}

/// Calls `callback(args)` after `duration`.
///
/// An exception thrown by the callback is reported, not propagated.
pub fn set_timeout(ctx: &mut Context, callback: Value, duration: Duration, args: Vec<Value>) -> TimeoutId {
    let id = ctx.timers.borrow_mut().next_id();
    let timer = ctx
        .event_loop()
        .set_timer(duration, Task::new(move |ctx: &mut Context| fire(ctx, id)));
    ctx.timers.borrow_mut().entries.insert(
        id,
        TimerEntry {
            timer,
            kind: TimerKind::Timeout { callback, args },
        },
    );
    id
}

/// Cancels a timer. A cleared [`delay`] promise never settles.
///
/// Returns false if the timer already fired or was cleared.
pub fn clear_timeout(ctx: &mut Context, id: TimeoutId) -> bool {
    let entry = ctx.timers.borrow_mut().entries.remove(&id);
    let Some(entry) = entry else {
        return false;
    };
    ctx.event_loop().clear_timer(entry.timer);
    if let TimerKind::Delay { mut bridge, .. } = entry.kind {
        bridge.clear(&*ctx);
    }
    true
}

/// Number of timers that have not fired or been cleared.
pub fn pending_timers(ctx: &Context) -> usize {
    ctx.timers.borrow().len()
}

fn fire(ctx: &mut Context, id: TimeoutId) {
    // Removed before settling: the callback may clear or add timers.
    let entry = ctx.timers.borrow_mut().entries.remove(&id);
    match entry.map(|entry| entry.kind) {
        Some(TimerKind::Delay { mut bridge, value }) => bridge.resolve(ctx, &[value]),
        Some(TimerKind::Timeout { callback, args }) => {
            let mut roots = args.clone();
            roots.push(callback.clone());
            ctx.with_rooted(roots, |ctx| ctx.call_handler(&callback, &args));
        }
        None => {}
    }
}

pub(crate) fn cancel_all(ctx: &mut Context) {
    let entries: Vec<TimerEntry> = ctx
        .timers
        .borrow_mut()
        .entries
        .drain()
        .map(|(_, entry)| entry)
        .collect();
    for entry in entries {
        ctx.event_loop().clear_timer(entry.timer);
        if let TimerKind::Delay { mut bridge, .. } = entry.kind {
            bridge.clear(&*ctx);
        }
    }
}
