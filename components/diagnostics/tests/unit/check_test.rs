//! The check! family: passing checks are silent, failing checks take the fatal path

use diagnostics::{
    check, check_eq, check_ge, check_gt, check_le, check_lt, check_ne, check_none, check_some,
    error_and_abort, ContractViolation, Diagnostics,
};
use std::panic::{catch_unwind, AssertUnwindSafe};

fn violation_of<F: FnOnce()>(f: F) -> ContractViolation {
    let payload = catch_unwind(AssertUnwindSafe(f)).expect_err("check should have failed");
    *payload
        .downcast_ref::<ContractViolation>()
        .expect("payload should be a ContractViolation")
}

#[test]
fn passing_checks_write_nothing() {
    let (diag, output) = Diagnostics::capture();
    check!(&diag, true);
    check_eq!(&diag, 2, 2);
    check_ne!(&diag, 1, 2);
    check_lt!(&diag, 1, 2);
    check_le!(&diag, 2, 2);
    check_gt!(&diag, 3, 2);
    check_ge!(&diag, 3, 3);
    check_none!(&diag, None::<u8>);
    assert!(output.contents().is_empty());
}

#[test]
fn check_records_expression_text() {
    let (diag, output) = Diagnostics::capture();
    let settled = true;
    let violation = violation_of(|| check!(&diag, !settled));
    assert_eq!(violation.info.message, "!settled");
    assert!(violation.info.file_line.contains("check_test.rs:"));
    assert!(output.contents().contains("assertion `!settled` failed"));
}

#[test]
fn check_eq_records_comparison() {
    let (diag, _output) = Diagnostics::capture();
    let violation = violation_of(|| check_eq!(&diag, 1 + 1, 3));
    assert_eq!(violation.info.message, "1 + 1 == 3");
}

#[test]
fn check_some_returns_inner_value() {
    let (diag, _output) = Diagnostics::capture();
    let value = check_some!(&diag, Some(7));
    assert_eq!(value, 7);
}

#[test]
fn check_some_fails_on_none() {
    let (diag, _output) = Diagnostics::capture();
    let missing: Option<u32> = None;
    let violation = violation_of(|| {
        let _ = check_some!(&diag, missing);
    });
    assert_eq!(violation.info.message, "missing.is_some()");
}

#[test]
fn check_none_fails_on_some() {
    let (diag, _output) = Diagnostics::capture();
    let violation = violation_of(|| check_none!(&diag, Some(1)));
    assert_eq!(violation.info.message, "Some(1).is_none()");
}

#[test]
fn error_and_abort_names_enclosing_function() {
    let (diag, _output) = Diagnostics::capture();
    let violation = violation_of(|| error_and_abort!(&diag, unreachable_state));
    assert_eq!(violation.info.message, "unreachable_state");
    assert!(violation
        .info
        .function
        .contains("error_and_abort_names_enclosing_function"));
}
