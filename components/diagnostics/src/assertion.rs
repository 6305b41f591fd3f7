//! Assertion records and the `check!` macro family.

use std::fmt;

/// Where a check failed and what it checked.
///
/// Built at the call site by the `check!` macros and consumed once by
/// [`Diagnostics::fail`](crate::Diagnostics::fail).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssertionInfo {
    /// `file:line` of the check
    pub file_line: &'static str,
    /// Source text of the failed expression
    pub message: &'static str,
    /// Enclosing function path, empty when unknown
    pub function: &'static str,
}

impl fmt::Display for AssertionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.function.is_empty() {
            write!(
                f,
                "{}: assertion `{}` failed",
                self.file_line, self.message
            )
        } else {
            write!(
                f,
                "{}: {}: assertion `{}` failed",
                self.file_line, self.function, self.message
            )
        }
    }
}

/// Panic payload raised by [`FailureMode::Unwind`](crate::FailureMode::Unwind).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractViolation {
    /// The failed check
    pub info: AssertionInfo,
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contract violation: {}", self.info)
    }
}

/// Expands to the path of the enclosing function.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn f() {}
        let name = $crate::__type_name_of(f);
        name.strip_suffix("::f").unwrap_or(name)
    }};
}

/// Fails unconditionally, recording `expr` as the failed expression.
#[macro_export]
macro_rules! error_and_abort {
    ($diag:expr, $($expr:tt)+) => {
        $crate::Diagnostics::fail(
            $diag,
            &$crate::AssertionInfo {
                file_line: concat!(file!(), ":", line!()),
                message: stringify!($($expr)+),
                function: $crate::function_name!(),
            },
        )
    };
}

/// Fails through `$diag` when `$cond` is false.
#[macro_export]
macro_rules! check {
    ($diag:expr, $cond:expr $(,)?) => {
        if !($cond) {
            $crate::error_and_abort!($diag, $cond);
        }
    };
}

/// Fails unless `$a == $b`.
#[macro_export]
macro_rules! check_eq {
    ($diag:expr, $a:expr, $b:expr $(,)?) => {
        if !($a == $b) {
            $crate::error_and_abort!($diag, $a == $b);
        }
    };
}

/// Fails unless `$a != $b`.
#[macro_export]
macro_rules! check_ne {
    ($diag:expr, $a:expr, $b:expr $(,)?) => {
        if !($a != $b) {
            $crate::error_and_abort!($diag, $a != $b);
        }
    };
}

/// Fails unless `$a < $b`.
#[macro_export]
macro_rules! check_lt {
    ($diag:expr, $a:expr, $b:expr $(,)?) => {
        if !($a < $b) {
            $crate::error_and_abort!($diag, $a < $b);
        }
    };
}

/// Fails unless `$a <= $b`.
#[macro_export]
macro_rules! check_le {
    ($diag:expr, $a:expr, $b:expr $(,)?) => {
        if !($a <= $b) {
            $crate::error_and_abort!($diag, $a <= $b);
        }
    };
}

/// Fails unless `$a > $b`.
#[macro_export]
macro_rules! check_gt {
    ($diag:expr, $a:expr, $b:expr $(,)?) => {
        if !($a > $b) {
            $crate::error_and_abort!($diag, $a > $b);
        }
    };
}

/// Fails unless `$a >= $b`.
#[macro_export]
macro_rules! check_ge {
    ($diag:expr, $a:expr, $b:expr $(,)?) => {
        if !($a >= $b) {
            $crate::error_and_abort!($diag, $a >= $b);
        }
    };
}

/// Unwraps an `Option`, failing on `None`.
#[macro_export]
macro_rules! check_some {
    ($diag:expr, $opt:expr $(,)?) => {
        match $opt {
            Some(value) => value,
            None => $crate::error_and_abort!($diag, $opt.is_some()),
        }
    };
}

/// Fails unless `$opt` is `None`.
#[macro_export]
macro_rules! check_none {
    ($diag:expr, $opt:expr $(,)?) => {
        if ($opt).is_some() {
            $crate::error_and_abort!($diag, $opt.is_none());
        }
    };
}
