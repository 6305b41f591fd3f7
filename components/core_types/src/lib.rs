//! Core JavaScript value types and error handling.
//!
//! This crate provides the foundational types shared by the runtime
//! components: value representation, heap object identities, error types,
//! and source location tracking.
//!
//! # Overview
//!
//! - [`Value`] - Tagged representation of JavaScript values
//! - [`ObjectId`] - Generation-checked identity of a heap object
//! - [`JsError`] - JavaScript errors with stack traces
//! - [`ErrorKind`] - Types of JavaScript errors
//! - [`SourcePosition`] - Source code location
//! - [`StackFrame`] - Call stack frame information
//!
//! # Examples
//!
//! ```
//! use core_types::{ErrorKind, JsError, Value};
//!
//! let num = Value::Smi(42);
//! assert!(num.is_truthy());
//! assert_eq!(num.type_of(), "number");
//!
//! let error = JsError::new(ErrorKind::TypeError, "undefined is not a function");
//! assert_eq!(error.to_string(), "TypeError: undefined is not a function");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod object;
mod source;
mod value;

pub use error::{ErrorKind, JsError};
pub use object::ObjectId;
pub use source::{SourcePosition, StackFrame};
pub use value::Value;
