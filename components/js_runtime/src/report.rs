//! Uncaught exception reporting.

use crate::context::Context;
use crate::object::JsObject;
use core_types::Value;
use diagnostics::ExceptionReport;

impl Context {
    /// Describes a thrown value for the diagnostic stream.
    ///
    /// Error objects report their message and stack; anything else is
    /// rendered as a string.
    pub fn exception_report(&self, value: &Value) -> ExceptionReport {
        if let Some(error) = self.error_of(value) {
            return ExceptionReport::error(error.to_string(), error.stack_trace());
        }
        ExceptionReport::value(self.describe(value))
    }

    fn describe(&self, value: &Value) -> String {
        let Some(id) = value.as_object() else {
            return value.to_string();
        };
        match self.runtime().inner.heap.borrow().get(id) {
            Some(JsObject::Promise(_)) => "[object Promise]".to_string(),
            Some(JsObject::Function(function)) => format!("function {}() {{ [native code] }}", function.name),
            Some(JsObject::ResolvingFunction { .. }) => "function () { [native code] }".to_string(),
            Some(JsObject::Host(host)) => match host.try_borrow() {
                Ok(host) => format!("[object {}]", host.class_name()),
                Err(_) => "[object Object]".to_string(),
            },
            Some(JsObject::Error(error)) => error.to_string(),
            None => value.to_string(),
        }
    }

    /// Prints an uncaught exception to the diagnostic stream.
    ///
    /// `is_throw` marks a value that was thrown rather than returned.
    pub fn report_exception(&self, value: &Value, is_throw: bool) {
        let report = self.exception_report(value);
        self.runtime().diagnostics().report_exception(&report, is_throw);
    }

    /// Calls `func`, reporting an exception instead of returning it.
    ///
    /// For callbacks run by the host (timer callbacks, queued jobs) where
    /// no script frame could catch the exception.
    pub fn call_handler(&mut self, func: &Value, args: &[Value]) -> Option<Value> {
        match self.call(func, args) {
            Ok(value) => Some(value),
            Err(exception) => {
                self.report_exception(&exception, true);
                None
            }
        }
    }
}
