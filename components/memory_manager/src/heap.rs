//! The object heap.
//!
//! Objects live in a slot table. A slot keeps a generation counter that is
//! bumped whenever its object is swept, so ids handed out for the previous
//! occupant stop resolving instead of aliasing the new one.
//!
//! Liveness has two sources:
//! - **Handles.** `dup` and `free` count references held by native code
//!   that does not take part in marking. An object with a non-zero handle
//!   count is a root.
//! - **Marking.** Everything reachable from the roots, plus whatever the
//!   caller of [`Heap::collect`] reports, through [`Trace`].

use crate::gc::{GcStats, MarkColor, Marker, Trace};
use core_types::ObjectId;
use std::time::Instant;
use thiserror::Error;

/// Errors returned by heap operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HeapError {
    /// The configured object limit is reached.
    #[error("heap limit of {limit} objects reached")]
    OutOfMemory {
        /// The configured limit
        limit: usize,
    },
    /// The id refers to an object that has been collected.
    #[error("object {0} is no longer live")]
    StaleObject(ObjectId),
    /// `free` was called more often than `dup`.
    #[error("object {0} has no handles to release")]
    HandleUnderflow(ObjectId),
}

/// Heap sizing and collection policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapConfig {
    /// Maximum number of live objects, unlimited when `None`
    pub max_objects: Option<usize>,
    /// Allocations between collections suggested by [`Heap::should_collect`]
    pub gc_threshold: usize,
}

impl Default for HeapConfig {
    fn default() -> Self {
        HeapConfig {
            max_objects: None,
            gc_threshold: 256,
        }
    }
}

/// Result of one collection.
#[derive(Debug)]
pub struct Collection<T> {
    /// Payloads of the swept objects, for the owner to finalize
    pub freed: Vec<T>,
    /// Objects still live
    pub live: usize,
}

#[derive(Debug)]
struct HeapCell<T> {
    value: T,
    handles: u32,
    color: MarkColor,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    cell: Option<HeapCell<T>>,
}

/// Garbage-collected storage for objects of type `T`.
#[derive(Debug)]
pub struct Heap<T> {
    slots: Vec<Slot<T>>,
    free_slots: Vec<u32>,
    live: usize,
    allocated_since_gc: usize,
    config: HeapConfig,
    stats: GcStats,
}

impl<T: Trace> Heap<T> {
    /// Creates an empty heap with the default configuration.
    pub fn new() -> Self {
        Self::with_config(HeapConfig::default())
    }

    /// Creates an empty heap.
    pub fn with_config(config: HeapConfig) -> Self {
        Self {
            slots: Vec::new(),
            free_slots: Vec::new(),
            live: 0,
            allocated_since_gc: 0,
            config,
            stats: GcStats::default(),
        }
    }

    /// Stores `value` and returns its id.
    ///
    /// The new object has no handles: unless it becomes reachable before the
    /// next collection, it is swept.
    pub fn allocate(&mut self, value: T) -> Result<ObjectId, HeapError> {
        if let Some(limit) = self.config.max_objects {
            if self.live >= limit {
                return Err(HeapError::OutOfMemory { limit });
            }
        }

        let cell = HeapCell {
            value,
            handles: 0,
            color: MarkColor::White,
        };
        let index = match self.free_slots.pop() {
            Some(index) => {
                self.slots[index as usize].cell = Some(cell);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    cell: Some(cell),
                });
                (self.slots.len() - 1) as u32
            }
        };

        self.live += 1;
        self.allocated_since_gc += 1;
        Ok(ObjectId::new(index, self.slots[index as usize].generation))
    }

    fn cell(&self, id: ObjectId) -> Option<&HeapCell<T>> {
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.cell.as_ref()
    }

    fn cell_mut(&mut self, id: ObjectId) -> Option<&mut HeapCell<T>> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.cell.as_mut()
    }

    /// Returns the object, or `None` if it was collected.
    pub fn get(&self, id: ObjectId) -> Option<&T> {
        self.cell(id).map(|cell| &cell.value)
    }

    /// Returns the object mutably, or `None` if it was collected.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut T> {
        self.cell_mut(id).map(|cell| &mut cell.value)
    }

    /// Returns true while the object is live.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.cell(id).is_some()
    }

    /// Adds a handle, making the object a root.
    pub fn dup(&mut self, id: ObjectId) -> Result<(), HeapError> {
        let cell = self.cell_mut(id).ok_or(HeapError::StaleObject(id))?;
        cell.handles += 1;
        Ok(())
    }

    /// Releases a handle taken with [`dup`](Self::dup).
    pub fn free(&mut self, id: ObjectId) -> Result<(), HeapError> {
        let cell = self.cell_mut(id).ok_or(HeapError::StaleObject(id))?;
        if cell.handles == 0 {
            return Err(HeapError::HandleUnderflow(id));
        }
        cell.handles -= 1;
        Ok(())
    }

    /// Current handle count, or `None` if the object was collected.
    pub fn handle_count(&self, id: ObjectId) -> Option<u32> {
        self.cell(id).map(|cell| cell.handles)
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns true when no object is live.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Whether enough allocation happened since the last collection.
    pub fn should_collect(&self) -> bool {
        self.allocated_since_gc >= self.config.gc_threshold
    }

    /// Collection counters.
    pub fn stats(&self) -> &GcStats {
        &self.stats
    }

    /// The heap configuration.
    pub fn config(&self) -> &HeapConfig {
        &self.config
    }

    /// Runs a full mark-and-sweep collection.
    ///
    /// Objects with handles are roots. `roots` is called once with the
    /// marker and must report every reference held outside the heap that
    /// should keep objects alive. It runs inside the collection pause: it
    /// must not allocate or run script.
    pub fn collect<F>(&mut self, roots: F) -> Collection<T>
    where
        F: FnOnce(&mut Marker),
    {
        let started = Instant::now();
        let mut marker = Marker::new();

        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(cell) = &slot.cell {
                if cell.handles > 0 {
                    marker.mark(ObjectId::new(index as u32, slot.generation));
                }
            }
        }
        roots(&mut marker);

        // Mark
        while let Some(id) = marker.pop() {
            let Some(cell) = self.cell_mut(id) else {
                continue;
            };
            if cell.color != MarkColor::White {
                continue;
            }
            cell.color = MarkColor::Gray;
            cell.value.trace(&mut marker);
            cell.color = MarkColor::Black;
        }

        // Sweep
        let mut freed = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let unreached = matches!(&slot.cell, Some(cell) if cell.color == MarkColor::White);
            if unreached {
                if let Some(cell) = slot.cell.take() {
                    freed.push(cell.value);
                }
                slot.generation = slot.generation.wrapping_add(1);
                self.free_slots.push(index as u32);
            } else if let Some(cell) = slot.cell.as_mut() {
                cell.color = MarkColor::White;
            }
        }

        self.live -= freed.len();
        self.allocated_since_gc = 0;
        self.stats.collections += 1;
        self.stats.objects_freed += freed.len();
        self.stats.last_freed = freed.len();
        self.stats.last_live = self.live;
        self.stats.total_pause += started.elapsed();
        log::debug!(
            "gc #{}: freed {} objects, {} live, {} references reported",
            self.stats.collections,
            freed.len(),
            self.live,
            marker.reported()
        );

        Collection {
            freed,
            live: self.live,
        }
    }

    /// Removes every object regardless of reachability.
    ///
    /// Used at teardown; all outstanding ids become stale.
    pub fn drain(&mut self) -> Vec<T> {
        let mut drained = Vec::with_capacity(self.live);
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(cell) = slot.cell.take() {
                drained.push(cell.value);
                slot.generation = slot.generation.wrapping_add(1);
                self.free_slots.push(index as u32);
            }
        }
        self.live = 0;
        drained
    }
}

impl<T: Trace> Default for Heap<T> {
    fn default() -> Self {
        Self::new()
    }
}
