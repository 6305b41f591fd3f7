//! The diagnostic stream and the fatal path.

use crate::{AssertionInfo, ContractViolation, ExceptionReport};
use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

/// What [`Diagnostics::fail`] does after writing the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Terminate the process with `abort()`.
    #[default]
    Abort,
    /// Panic with a [`ContractViolation`] payload.
    ///
    /// Lets a test harness observe the fatal path with `catch_unwind`
    /// instead of losing the process.
    Unwind,
}

type Sink = Arc<Mutex<Box<dyn Write + Send>>>;

/// Handle to the process diagnostic stream.
///
/// Cloning is cheap and every clone writes to the same sink. The sink is
/// locked per report, so lines from different threads never interleave.
#[derive(Clone)]
pub struct Diagnostics {
    sink: Sink,
    mode: FailureMode,
}

impl Diagnostics {
    /// Diagnostics writing to `sink`.
    pub fn new<W>(sink: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            sink: Arc::new(Mutex::new(Box::new(sink))),
            mode: FailureMode::default(),
        }
    }

    /// Diagnostics writing to standard error.
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Diagnostics writing to an in-memory buffer, in unwinding mode.
    ///
    /// Returns the handle and a reader for everything written through it.
    pub fn capture() -> (Self, CapturedOutput) {
        let output = CapturedOutput::default();
        let diagnostics = Self::new(output.clone()).with_failure_mode(FailureMode::Unwind);
        (diagnostics, output)
    }

    /// Sets the behaviour of [`fail`](Self::fail).
    pub fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.mode = mode;
        self
    }

    /// The configured failure mode.
    pub fn failure_mode(&self) -> FailureMode {
        self.mode
    }

    /// Reports a failed check and terminates.
    ///
    /// Only for defects in native code. Nothing a script does should be able
    /// to reach this.
    pub fn fail(&self, info: &AssertionInfo) -> ! {
        log::error!("{}", info);
        self.write_lines(&info.to_string());
        match self.mode {
            FailureMode::Abort => std::process::abort(),
            FailureMode::Unwind => std::panic::panic_any(ContractViolation { info: *info }),
        }
    }

    /// Prints an uncaught exception. Never terminates.
    ///
    /// `is_throw` marks a value that was thrown; a thrown non-error value is
    /// prefixed with `Throw: ` so it is not mistaken for a log line.
    pub fn report_exception(&self, report: &ExceptionReport, is_throw: bool) {
        let prefix = if is_throw && !report.is_error {
            "Throw: "
        } else {
            ""
        };
        self.write_lines(&format!("{}{}", prefix, report.render()));
    }

    /// Prints a rejection that no handler observed. Never terminates.
    pub fn report_unhandled_rejection(&self, report: &ExceptionReport) {
        self.write_lines(&format!("Uncaught (in promise) {}", report.render()));
    }

    fn write_lines(&self, text: &str) {
        let mut sink = self.sink.lock();
        // Nothing sensible is left to report a broken diagnostic stream to.
        let _ = writeln!(sink, "{}", text);
        let _ = sink.flush();
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::stderr()
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// Shared buffer behind [`Diagnostics::capture`].
#[derive(Clone, Default)]
pub struct CapturedOutput {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CapturedOutput {
    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    /// Discards the buffered output.
    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Debug for CapturedOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CapturedOutput")
            .field(&self.buffer.lock().len())
            .finish()
    }
}
