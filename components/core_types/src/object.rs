//! Heap object identities.

use std::fmt;

/// Identity of an object living in the garbage-collected heap.
///
/// An `ObjectId` is an index into the heap's slot table plus the generation
/// of the slot at allocation time. When a slot is swept and reused its
/// generation is bumped, so an id that outlived its object never aliases the
/// new occupant; lookups with a stale id simply fail.
///
/// # Examples
///
/// ```
/// use core_types::ObjectId;
///
/// let id = ObjectId::new(3, 1);
/// assert_eq!(id.index(), 3);
/// assert_eq!(id.generation(), 1);
/// assert_eq!(id.to_string(), "#3@1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

impl ObjectId {
    /// Creates an id from a slot index and slot generation.
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index in the heap.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when the object was allocated.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.index, self.generation)
    }
}
