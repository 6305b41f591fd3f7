//! Exception reports are written to the sink and never terminate

use diagnostics::{Diagnostics, ExceptionReport};

#[test]
fn thrown_plain_value_is_prefixed() {
    let (diag, output) = Diagnostics::capture();
    diag.report_exception(&ExceptionReport::value("boom"), true);
    assert_eq!(output.contents(), "Throw: boom\n");
}

#[test]
fn non_thrown_plain_value_is_not_prefixed() {
    let (diag, output) = Diagnostics::capture();
    diag.report_exception(&ExceptionReport::value("boom"), false);
    assert_eq!(output.contents(), "boom\n");
}

#[test]
fn thrown_error_prints_message_and_stack() {
    let (diag, output) = Diagnostics::capture();
    let report = ExceptionReport::error(
        "TypeError: not a function",
        Some("    at run (main.js:3:7)".to_string()),
    );
    diag.report_exception(&report, true);
    assert_eq!(
        output.contents(),
        "TypeError: not a function\n    at run (main.js:3:7)\n"
    );
}

#[test]
fn unhandled_rejection_is_labelled() {
    let (diag, output) = Diagnostics::capture();
    diag.report_unhandled_rejection(&ExceptionReport::value("boom"));
    assert_eq!(output.contents(), "Uncaught (in promise) boom\n");
}

#[test]
fn reporting_continues_after_many_reports() {
    let (diag, output) = Diagnostics::capture();
    for i in 0..3 {
        diag.report_exception(&ExceptionReport::value(format!("e{}", i)), false);
    }
    assert_eq!(output.contents(), "e0\ne1\ne2\n");
}
