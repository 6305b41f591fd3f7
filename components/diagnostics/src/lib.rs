//! Fatal assertions and error reporting for the runtime.
//!
//! Two kinds of failure are handled here, and they never mix:
//!
//! - **Contract violations** in native code (settling a promise twice, a
//!   missing value that is guaranteed to exist, an allocation the runtime
//!   cannot do without). These go through the [`check!`] family of macros and
//!   end in [`Diagnostics::fail`], which never returns.
//! - **Script exceptions** that nothing handled. These are written to the
//!   diagnostic stream with [`Diagnostics::report_exception`] and execution
//!   continues.
//!
//! The diagnostic stream is not a hidden global: a [`Diagnostics`] value is
//! created at startup and handed to the runtime, so tests can capture it.
//!
//! # Examples
//!
//! ```
//! use diagnostics::{check, check_eq, Diagnostics};
//!
//! let (diag, output) = Diagnostics::capture();
//! check!(&diag, 1 + 1 == 2);
//! check_eq!(&diag, "ok".len(), 2);
//! assert!(output.contents().is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod assertion;
mod report;
mod sink;

pub use assertion::{AssertionInfo, ContractViolation};
pub use report::ExceptionReport;
pub use sink::{CapturedOutput, Diagnostics, FailureMode};

#[doc(hidden)]
pub fn __type_name_of<T>(_: T) -> &'static str {
    std::any::type_name::<T>()
}
