//! Memory Manager - garbage-collected object heap
//!
//! This component provides:
//! - A slot heap addressed by generation-checked [`ObjectId`](core_types::ObjectId)s
//! - Handle counts (`dup`/`free`) that act as roots for native references
//! - Tri-color mark-and-sweep collection driven by the [`Trace`] contract
//!
//! Native structures that hold values outside the heap graph take part in
//! collection by reporting those values to a [`Marker`] when the collector
//! asks for roots.
//!
//! # Examples
//!
//! ```
//! use core_types::Value;
//! use memory_manager::{Heap, Marker, Trace};
//!
//! struct Cell(Vec<Value>);
//!
//! impl Trace for Cell {
//!     fn trace(&self, marker: &mut Marker) {
//!         self.0.trace(marker);
//!     }
//! }
//!
//! let mut heap = Heap::new();
//! let leaf = heap.allocate(Cell(vec![])).unwrap();
//! let parent = heap.allocate(Cell(vec![Value::Object(leaf)])).unwrap();
//!
//! // Only `parent` is reported; `leaf` survives because `parent` traces it.
//! let collection = heap.collect(|marker| marker.mark(parent));
//! assert!(collection.freed.is_empty());
//!
//! let collection = heap.collect(|_| {});
//! assert_eq!(collection.freed.len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod gc;
pub mod heap;

pub use gc::{GcStats, MarkColor, Marker, Trace};
pub use heap::{Collection, Heap, HeapConfig, HeapError};
