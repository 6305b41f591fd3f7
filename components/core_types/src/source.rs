//! Source position and stack frame types for JavaScript error tracking.

use std::fmt;

/// Represents a position in source code.
///
/// # Examples
///
/// ```
/// use core_types::SourcePosition;
///
/// let pos = SourcePosition {
///     line: 10,
///     column: 5,
///     offset: 150,
/// };
///
/// assert_eq!(pos.line, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePosition {
    /// Line number (1-indexed)
    pub line: u32,
    /// Column number (1-indexed)
    pub column: u32,
    /// Byte offset from the start of the source file
    pub offset: usize,
}

/// Represents a single frame in a JavaScript call stack.
///
/// # Examples
///
/// ```
/// use core_types::StackFrame;
///
/// let frame = StackFrame::new("myFunction", "file:///main.js", 25, 10);
/// assert_eq!(frame.to_string(), "myFunction (file:///main.js:25:10)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// Name of the function, or None for anonymous functions
    pub function_name: Option<String>,
    /// URL or file path of the source, or None if not available
    pub source_url: Option<String>,
    /// Line number where the call occurred
    pub line: u32,
    /// Column number where the call occurred
    pub column: u32,
}

impl StackFrame {
    /// Creates a frame for a named function.
    pub fn new(
        function_name: impl Into<String>,
        source_url: impl Into<String>,
        line: u32,
        column: u32,
    ) -> Self {
        Self {
            function_name: Some(function_name.into()),
            source_url: Some(source_url.into()),
            line,
            column,
        }
    }

    /// Creates a frame for an anonymous function.
    pub fn anonymous(source_url: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            function_name: None,
            source_url: Some(source_url.into()),
            line,
            column,
        }
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.function_name.as_deref().unwrap_or("<anonymous>");
        let url = self.source_url.as_deref().unwrap_or("native");
        write!(f, "{} ({}:{}:{})", name, url, self.line, self.column)
    }
}
