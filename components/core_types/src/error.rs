//! JavaScript error types and error handling.
//!
//! This module provides error types that correspond to JavaScript's built-in
//! error types, along with stack trace information.

use crate::{SourcePosition, StackFrame};
use std::fmt;

/// The kind of JavaScript error.
///
/// These correspond to JavaScript's built-in error constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Generic `Error`
    Error,
    /// Syntax error in JavaScript code
    SyntaxError,
    /// Type error (e.g., calling a non-function)
    TypeError,
    /// Reference to an undefined variable
    ReferenceError,
    /// Value out of allowed range
    RangeError,
    /// Error in eval() function
    EvalError,
    /// Error in URI handling functions
    URIError,
    /// Internal engine error
    InternalError,
}

impl ErrorKind {
    /// The constructor name, as shown in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::EvalError => "EvalError",
            ErrorKind::URIError => "URIError",
            ErrorKind::InternalError => "InternalError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A JavaScript error with message and stack trace.
///
/// This struct represents a JavaScript exception that can be thrown and caught.
/// Native code produces it off the script thread (it is `Send`); the runtime
/// turns it into an error object before it reaches script.
///
/// # Examples
///
/// ```
/// use core_types::{ErrorKind, JsError, StackFrame};
///
/// let error = JsError::new(ErrorKind::RangeError, "bad length")
///     .with_frame(StackFrame::new("readChunk", "file:///io.js", 12, 3));
///
/// assert_eq!(error.message, "bad length");
/// assert_eq!(error.stack.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct JsError {
    /// The type of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Stack trace (call stack at the time of the error)
    pub stack: Vec<StackFrame>,
    /// Source position where the error occurred
    pub source_position: Option<SourcePosition>,
}

impl JsError {
    /// Creates an error with no stack or position.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            stack: Vec::new(),
            source_position: None,
        }
    }

    /// Appends a stack frame (innermost first).
    pub fn with_frame(mut self, frame: StackFrame) -> Self {
        self.stack.push(frame);
        self
    }

    /// Renders the stack as `    at ...` lines, or `None` when empty.
    pub fn stack_trace(&self) -> Option<String> {
        if self.stack.is_empty() {
            return None;
        }
        let lines: Vec<String> = self
            .stack
            .iter()
            .map(|frame| format!("    at {}", frame))
            .collect();
        Some(lines.join("\n"))
    }
}

impl fmt::Display for JsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for JsError {}
