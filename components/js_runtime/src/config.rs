//! Runtime configuration

/// Configuration for a [`Runtime`](crate::Runtime).
///
/// # Examples
///
/// ```
/// use js_runtime::RuntimeConfig;
///
/// let config = RuntimeConfig::new()
///     .with_max_heap_objects(10_000)
///     .with_gc_threshold(64);
/// assert_eq!(config.max_heap_objects, Some(10_000));
/// assert!(config.report_unhandled_rejections);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Upper bound on live heap objects, `None` for unbounded
    pub max_heap_objects: Option<usize>,
    /// Allocations between automatic collections at loop checkpoints
    pub gc_threshold: usize,
    /// Print rejections nobody handled by the end of a checkpoint
    pub report_unhandled_rejections: bool,
}

impl RuntimeConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits the number of live heap objects.
    pub fn with_max_heap_objects(mut self, max: usize) -> Self {
        self.max_heap_objects = Some(max);
        self
    }

    /// Sets the automatic collection threshold.
    pub fn with_gc_threshold(mut self, threshold: usize) -> Self {
        self.gc_threshold = threshold;
        self
    }

    /// Enables or disables unhandled rejection reports.
    pub fn with_unhandled_rejection_reports(mut self, enabled: bool) -> Self {
        self.report_unhandled_rejections = enabled;
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_heap_objects: None,
            gc_threshold: 256,
            report_unhandled_rejections: true,
        }
    }
}
