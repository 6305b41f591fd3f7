//! Unit tests for PromiseRecord

use async_runtime::{
    PromiseError, PromiseReaction, PromiseRecord, PromiseState, ReactionCapability, ReactionKind,
};

fn capability(base: i32) -> ReactionCapability<i32> {
    ReactionCapability {
        promise: base,
        resolve: base + 1,
        reject: base + 2,
    }
}

#[test]
fn new_promise_is_pending() {
    let promise: PromiseRecord<i32> = PromiseRecord::new();
    assert_eq!(promise.state(), &PromiseState::Pending);
    assert!(promise.is_pending());
}

#[test]
fn reject_produces_reject_jobs() {
    let mut promise = PromiseRecord::new();
    promise.then(PromiseReaction::new(Some(1), Some(2), Some(capability(10))));

    let jobs = promise.reject(-1).unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].kind, ReactionKind::Reject);
    assert_eq!(jobs[0].handler, Some(2));
    assert_eq!(jobs[0].argument, -1);
    assert_eq!(jobs[0].capability, Some(capability(10)));
}

#[test]
fn then_on_settled_promise_returns_job_immediately() {
    let mut promise = PromiseRecord::new();
    promise.fulfill(5).unwrap();

    let job = promise
        .then(PromiseReaction::new(Some(1), None, None))
        .expect("settled promise yields a job");
    assert_eq!(job.kind, ReactionKind::Fulfill);
    assert_eq!(job.argument, 5);
    assert!(!promise.has_pending_reactions());
}

#[test]
fn rejection_without_handler_is_unhandled() {
    let mut promise: PromiseRecord<i32> = PromiseRecord::new();
    promise.reject(0).unwrap();
    assert!(promise.is_unhandled_rejection());
    assert!(!promise.is_handled());
}

#[test]
fn handler_registered_before_rejection_counts_as_handled() {
    let mut promise = PromiseRecord::new();
    promise.then(PromiseReaction::new(None, Some(1), None));
    promise.reject(0).unwrap();
    assert!(!promise.is_unhandled_rejection());
}

#[test]
fn settling_twice_fails() {
    let mut promise = PromiseRecord::new();
    promise.reject("first").unwrap();
    assert_eq!(promise.fulfill("second"), Err(PromiseError::AlreadySettled));
    assert_eq!(promise.state(), &PromiseState::Rejected("first"));
}

#[test]
fn job_for_each_value_visits_everything() {
    let mut promise = PromiseRecord::new();
    promise.then(PromiseReaction::new(Some(1), None, Some(capability(10))));
    let jobs = promise.fulfill(99).unwrap();

    let mut seen = Vec::new();
    jobs[0].for_each_value(|v| seen.push(*v));
    assert_eq!(seen, vec![1, 10, 11, 12, 99]);
}
