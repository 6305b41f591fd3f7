//! Heap collection driven by handles and caller-reported roots

use core_types::Value;
use memory_manager::{Heap, HeapConfig, Marker, Trace};

struct Holder {
    children: Vec<Value>,
}

impl Trace for Holder {
    fn trace(&self, marker: &mut Marker) {
        self.children.trace(marker);
    }
}

fn holder(children: Vec<Value>) -> Holder {
    Holder { children }
}

/// A native structure outside the heap that keeps values alive by marking them.
struct NativeOwner {
    held: Option<Value>,
}

impl Trace for NativeOwner {
    fn trace(&self, marker: &mut Marker) {
        self.held.trace(marker);
    }
}

#[test]
fn reported_roots_keep_objects_alive() {
    let mut heap = Heap::new();
    let id = heap.allocate(holder(vec![])).unwrap();
    let owner = NativeOwner {
        held: Some(Value::Object(id)),
    };

    heap.collect(|marker| owner.trace(marker));
    assert!(heap.contains(id));
}

#[test]
fn objects_die_once_owner_stops_reporting() {
    let mut heap = Heap::new();
    let id = heap.allocate(holder(vec![])).unwrap();
    let mut owner = NativeOwner {
        held: Some(Value::Object(id)),
    };

    heap.collect(|marker| owner.trace(marker));
    owner.held = None;
    heap.collect(|marker| owner.trace(marker));
    assert!(!heap.contains(id));
}

#[test]
fn reachability_is_transitive() {
    let mut heap = Heap::new();
    let c = heap.allocate(holder(vec![])).unwrap();
    let b = heap.allocate(holder(vec![Value::Object(c)])).unwrap();
    let a = heap.allocate(holder(vec![Value::Object(b)])).unwrap();
    heap.dup(a).unwrap();

    let collection = heap.collect(|_| {});
    assert!(collection.freed.is_empty());
    assert_eq!(collection.live, 3);
}

#[test]
fn stale_ids_reported_as_roots_are_ignored() {
    let mut heap = Heap::new();
    let gone = heap.allocate(holder(vec![])).unwrap();
    heap.collect(|_| {});
    let fresh = heap.allocate(holder(vec![])).unwrap();

    // The stale id points at the reused slot but must not keep it alive.
    let collection = heap.collect(|marker| marker.mark(gone));
    assert_eq!(collection.freed.len(), 1);
    assert!(!heap.contains(fresh));
}

#[test]
fn limit_applies_to_live_objects_only() {
    let mut heap = Heap::with_config(HeapConfig {
        max_objects: Some(2),
        gc_threshold: 100,
    });
    heap.allocate(holder(vec![])).unwrap();
    heap.allocate(holder(vec![])).unwrap();
    assert!(heap.allocate(holder(vec![])).is_err());

    heap.collect(|_| {});
    assert!(heap.allocate(holder(vec![])).is_ok());
}
