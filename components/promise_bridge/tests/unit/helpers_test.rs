//! Unit tests for the settled-promise helpers

use crate::mock_engine::{MockEngine, Settled};
use promise_bridge::{new_rejected_promise, new_resolved_promise};

#[test]
fn resolved_promise_is_settled_immediately() {
    let mut engine = MockEngine::new();
    let promise = new_resolved_promise(&mut engine, &[9]);
    assert_eq!(engine.settlement_of(promise), Some((Settled::Fulfilled, vec![9])));
}

#[test]
fn rejected_promise_is_settled_immediately() {
    let mut engine = MockEngine::new();
    let promise = new_rejected_promise(&mut engine, &[4]);
    assert_eq!(engine.settlement_of(promise), Some((Settled::Rejected, vec![4])));
}
