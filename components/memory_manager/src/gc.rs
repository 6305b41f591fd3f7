//! Mark-phase types shared by the heap and its clients.

use core_types::{ObjectId, Value};
use std::time::Duration;

/// Mark colors for tri-color marking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MarkColor {
    /// Unmarked (not yet visited)
    White = 0,
    /// In process (reachable, needs scanning)
    Gray = 1,
    /// Fully processed (reachable, all references scanned)
    Black = 2,
}

/// The mark callback handed to every participant of a collection.
///
/// Reporting an id only queues it; the heap scans queued objects after all
/// roots have been reported. Reporting the same id twice, or an id whose
/// object is already gone, is harmless.
#[derive(Debug, Default)]
pub struct Marker {
    gray: Vec<ObjectId>,
    reported: usize,
}

impl Marker {
    /// Creates an empty marker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports a reachable object.
    pub fn mark(&mut self, id: ObjectId) {
        self.reported += 1;
        self.gray.push(id);
    }

    /// Reports a value; primitives are ignored.
    pub fn mark_value(&mut self, value: &Value) {
        if let Value::Object(id) = value {
            self.mark(*id);
        }
    }

    /// Number of references reported so far, duplicates included.
    pub fn reported(&self) -> usize {
        self.reported
    }

    pub(crate) fn pop(&mut self) -> Option<ObjectId> {
        self.gray.pop()
    }
}

/// Reports the heap references held by a value.
///
/// Implemented by heap payloads (their children) and by native structures
/// that keep script values alive (their roots). Implementations must only
/// report; they may not allocate or run script.
pub trait Trace {
    /// Reports every heap reference held by `self`.
    fn trace(&self, marker: &mut Marker);
}

impl Trace for Value {
    fn trace(&self, marker: &mut Marker) {
        marker.mark_value(self);
    }
}

impl<T: Trace> Trace for Option<T> {
    fn trace(&self, marker: &mut Marker) {
        if let Some(inner) = self {
            inner.trace(marker);
        }
    }
}

impl<T: Trace> Trace for Vec<T> {
    fn trace(&self, marker: &mut Marker) {
        for item in self {
            item.trace(marker);
        }
    }
}

/// Counters kept across collections.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GcStats {
    /// Number of completed collections
    pub collections: usize,
    /// Objects reclaimed over all collections
    pub objects_freed: usize,
    /// Objects reclaimed by the last collection
    pub last_freed: usize,
    /// Live objects after the last collection
    pub last_live: usize,
    /// Total time spent collecting
    pub total_pause: Duration,
}
