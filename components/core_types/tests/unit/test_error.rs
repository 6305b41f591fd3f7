//! Unit tests for JsError and ErrorKind

use core_types::{ErrorKind, JsError, StackFrame};

#[test]
fn error_kind_names() {
    assert_eq!(ErrorKind::Error.name(), "Error");
    assert_eq!(ErrorKind::TypeError.to_string(), "TypeError");
    assert_eq!(ErrorKind::URIError.name(), "URIError");
}

#[test]
fn new_error_has_empty_stack() {
    let error = JsError::new(ErrorKind::RangeError, "out of range");
    assert!(error.stack.is_empty());
    assert!(error.source_position.is_none());
    assert!(error.stack_trace().is_none());
}

#[test]
fn with_frame_keeps_order() {
    let error = JsError::new(ErrorKind::Error, "boom")
        .with_frame(StackFrame::new("first", "main.js", 1, 1))
        .with_frame(StackFrame::new("second", "main.js", 2, 1));
    assert_eq!(error.stack[0].function_name.as_deref(), Some("first"));
    assert_eq!(error.stack[1].function_name.as_deref(), Some("second"));
}

#[test]
fn js_error_is_std_error() {
    fn takes_error(_: &dyn std::error::Error) {}
    takes_error(&JsError::new(ErrorKind::Error, "x"));
}
