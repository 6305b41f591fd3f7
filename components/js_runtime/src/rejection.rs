//! Host rejection tracking.
//!
//! A promise rejected with no handler is remembered until the end of the
//! current microtask checkpoint. If a handler is attached before then, it is
//! forgotten; otherwise it is reported as an unhandled rejection.

use core_types::ObjectId;
use memory_manager::Marker;

#[derive(Debug, Default)]
pub(crate) struct RejectionTracker {
    pending: Vec<ObjectId>,
}

impl RejectionTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A promise was rejected while unhandled.
    pub(crate) fn rejected(&mut self, promise: ObjectId) {
        if !self.pending.contains(&promise) {
            self.pending.push(promise);
        }
    }

    /// A handler was attached to a rejected promise.
    pub(crate) fn handled(&mut self, promise: ObjectId) {
        self.pending.retain(|id| *id != promise);
    }

    pub(crate) fn take(&mut self) -> Vec<ObjectId> {
        std::mem::take(&mut self.pending)
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub(crate) fn mark(&self, marker: &mut Marker) {
        for id in &self.pending {
            marker.mark(*id);
        }
    }
}
