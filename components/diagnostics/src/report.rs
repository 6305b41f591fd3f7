//! Rendering of uncaught exceptions.

/// The printable parts of an exception value.
///
/// The runtime extracts these from a script value (it knows how to read an
/// error object's message and stack); this crate only formats them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionReport {
    /// `String()` of the value, or `Kind: message` for error objects
    pub message: String,
    /// Rendered stack, one frame per line
    pub stack: Option<String>,
    /// Whether the value is an error object
    pub is_error: bool,
}

impl ExceptionReport {
    /// Report for an error object.
    pub fn error(message: impl Into<String>, stack: Option<String>) -> Self {
        Self {
            message: message.into(),
            stack,
            is_error: true,
        }
    }

    /// Report for any other thrown value.
    pub fn value(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: None,
            is_error: false,
        }
    }

    pub(crate) fn render(&self) -> String {
        match &self.stack {
            Some(stack) if !stack.is_empty() => format!("{}\n{}", self.message, stack),
            _ => self.message.clone(),
        }
    }
}
