//! Position tracking hooks
//!
//! Every sift step that changes the index of an element reports it to the
//! heap's [`PositionTracker`]. The default [`NoTracker`] is a zero-sized type
//! whose methods are empty and always inlined, so an untracked heap compiles
//! down to the plain sift loops.
//!
//! A real tracker turns "find this element" from an O(n) scan into an O(1)
//! lookup, which is what makes O(log n) removal and re-prioritisation by
//! identity possible:
//!
//! - [`KeyedTracker`]: side map from a stable key (see [`Keyed`]) to the index
//! - [`SlotTracker`]: writes the index back into a [`Cell`] embedded in the
//!   element itself (see [`HasSlot`])
//! - [`TracingTracker`]: emits a `tracing` event per notification, for
//!   debugging and visualising the algorithms
//!
//! Two trackers can be combined as a tuple `(A, B)`.
//!
//! # Notification order
//!
//! An element leaving its slot without being relocated by a sift (the root on
//! `pop`, the target of `erase`/`update`, the last element used to fill a
//! hole) is reported with `on_remove`. Elements displaced by a sift are
//! reported with `on_move`. The element being sifted is reported once with
//! `on_insert` when it comes to rest.
//!
//! # Example
//!
//! ```rust
//! use rust_tracked_heap::binary_heap::BinaryHeap;
//! use rust_tracked_heap::compare::Less;
//! use rust_tracked_heap::tracker::{Keyed, KeyedTracker};
//!
//! #[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
//! struct Job { priority: u32, id: u32 }
//!
//! impl Keyed for Job {
//!     type Key = u32;
//!     fn key(&self) -> u32 { self.id }
//! }
//!
//! let mut heap = BinaryHeap::with_tracker(Less, KeyedTracker::<u32>::new());
//! heap.push(Job { priority: 1, id: 10 });
//! heap.push(Job { priority: 7, id: 11 });
//! heap.push(Job { priority: 4, id: 12 });
//!
//! let pos = heap.tracker().index_of(&12).unwrap();
//! assert_eq!(heap.take(pos).id, 12);
//! assert_eq!(heap.tracker().index_of(&12), None);
//! assert_eq!(heap.top().id, 11);
//! ```

use rustc_hash::FxHashMap;
use std::cell::Cell;
use std::fmt;
use std::hash::Hash;

/// Observer notified of every index change inside a heap
///
/// All methods default to doing nothing, so an implementation only needs to
/// override the notifications it cares about.
pub trait PositionTracker<T: ?Sized> {
    /// `value` was placed at `index`
    #[inline(always)]
    fn on_insert(&mut self, value: &T, index: usize) {
        let _ = (value, index);
    }

    /// `value` was relocated from `from` to `to`
    #[inline(always)]
    fn on_move(&mut self, value: &T, from: usize, to: usize) {
        let _ = (value, from, to);
    }

    /// `value` left `index`
    #[inline(always)]
    fn on_remove(&mut self, value: &T, index: usize) {
        let _ = (value, index);
    }
}

/// The no-op tracker used by default
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoTracker;

impl<T: ?Sized> PositionTracker<T> for NoTracker {}

impl<T: ?Sized, A, B> PositionTracker<T> for (A, B)
where
    A: PositionTracker<T>,
    B: PositionTracker<T>,
{
    #[inline]
    fn on_insert(&mut self, value: &T, index: usize) {
        self.0.on_insert(value, index);
        self.1.on_insert(value, index);
    }

    #[inline]
    fn on_move(&mut self, value: &T, from: usize, to: usize) {
        self.0.on_move(value, from, to);
        self.1.on_move(value, from, to);
    }

    #[inline]
    fn on_remove(&mut self, value: &T, index: usize) {
        self.0.on_remove(value, index);
        self.1.on_remove(value, index);
    }
}

// ============================================================================
// KeyedTracker
// ============================================================================

/// Elements with a stable identity that survives relocation
pub trait Keyed {
    /// Identity type
    type Key: Hash + Eq + Clone;

    /// Returns this element's identity
    fn key(&self) -> Self::Key;
}

impl<T: Keyed + ?Sized> Keyed for Box<T> {
    type Key = T::Key;

    #[inline]
    fn key(&self) -> Self::Key {
        (**self).key()
    }
}

/// Side map from element key to current heap index
///
/// Keys must be unique among the elements present in the heap at any time.
pub struct KeyedTracker<K> {
    positions: FxHashMap<K, usize>,
}

impl<K: Hash + Eq> KeyedTracker<K> {
    /// Creates an empty tracker
    pub fn new() -> Self {
        Self {
            positions: FxHashMap::default(),
        }
    }

    /// Creates an empty tracker with room for `capacity` keys
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Returns the current heap index of the element with `key`
    #[inline]
    pub fn index_of(&self, key: &K) -> Option<usize> {
        self.positions.get(key).copied()
    }

    /// Returns true if an element with `key` is in the heap
    pub fn contains(&self, key: &K) -> bool {
        self.positions.contains_key(key)
    }

    /// Number of tracked elements
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Forgets every key
    pub fn clear(&mut self) {
        self.positions.clear();
    }
}

impl<K: Hash + Eq> Default for KeyedTracker<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone> Clone for KeyedTracker<K> {
    fn clone(&self) -> Self {
        Self {
            positions: self.positions.clone(),
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for KeyedTracker<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.positions.iter()).finish()
    }
}

impl<T: Keyed + ?Sized> PositionTracker<T> for KeyedTracker<T::Key> {
    #[inline]
    fn on_insert(&mut self, value: &T, index: usize) {
        self.positions.insert(value.key(), index);
    }

    #[inline]
    fn on_move(&mut self, value: &T, _from: usize, to: usize) {
        self.positions.insert(value.key(), to);
    }

    #[inline]
    fn on_remove(&mut self, value: &T, _index: usize) {
        self.positions.remove(&value.key());
    }
}

// ============================================================================
// SlotTracker
// ============================================================================

/// Slot value of an element that is not in any heap
pub const NOT_IN_HEAP: usize = usize::MAX;

/// Elements carrying their own heap index
///
/// The slot is a [`Cell`] so the tracker can update it through the shared
/// reference it is handed.
pub trait HasSlot {
    /// The embedded index cell
    fn slot(&self) -> &Cell<usize>;

    /// Current heap index, or `None` if not in a heap
    #[inline]
    fn heap_index(&self) -> Option<usize> {
        match self.slot().get() {
            NOT_IN_HEAP => None,
            idx => Some(idx),
        }
    }
}

impl<T: HasSlot + ?Sized> HasSlot for Box<T> {
    #[inline]
    fn slot(&self) -> &Cell<usize> {
        (**self).slot()
    }
}

/// Writes each element's index into its embedded slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotTracker;

impl<T: HasSlot + ?Sized> PositionTracker<T> for SlotTracker {
    #[inline]
    fn on_insert(&mut self, value: &T, index: usize) {
        value.slot().set(index);
    }

    #[inline]
    fn on_move(&mut self, value: &T, _from: usize, to: usize) {
        value.slot().set(to);
    }

    #[inline]
    fn on_remove(&mut self, value: &T, _index: usize) {
        value.slot().set(NOT_IN_HEAP);
    }
}

// ============================================================================
// TracingTracker
// ============================================================================

/// Emits a `TRACE` level event for every notification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TracingTracker;

impl<T: fmt::Debug + ?Sized> PositionTracker<T> for TracingTracker {
    fn on_insert(&mut self, value: &T, index: usize) {
        tracing::trace!(?value, index, "inserted");
    }

    fn on_move(&mut self, value: &T, from: usize, to: usize) {
        tracing::trace!(?value, from, to, "moved");
    }

    fn on_remove(&mut self, value: &T, index: usize) {
        tracing::trace!(?value, index, "removed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Item {
        id: u32,
        slot: Cell<usize>,
    }

    impl Keyed for Item {
        type Key = u32;
        fn key(&self) -> u32 {
            self.id
        }
    }

    impl HasSlot for Item {
        fn slot(&self) -> &Cell<usize> {
            &self.slot
        }
    }

    fn item(id: u32) -> Item {
        Item {
            id,
            slot: Cell::new(NOT_IN_HEAP),
        }
    }

    #[test]
    fn test_keyed_tracker_follows_notifications() {
        let mut tracker = KeyedTracker::<u32>::new();
        let a = item(1);

        tracker.on_insert(&a, 3);
        assert_eq!(tracker.index_of(&1), Some(3));

        tracker.on_move(&a, 3, 1);
        assert_eq!(tracker.index_of(&1), Some(1));
        assert_eq!(tracker.len(), 1);

        tracker.on_remove(&a, 1);
        assert_eq!(tracker.index_of(&1), None);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_slot_tracker_writes_through_shared_ref() {
        let mut tracker = SlotTracker;
        let a = item(1);
        assert_eq!(a.heap_index(), None);

        tracker.on_insert(&a, 5);
        assert_eq!(a.heap_index(), Some(5));

        tracker.on_move(&a, 5, 2);
        assert_eq!(a.heap_index(), Some(2));

        tracker.on_remove(&a, 2);
        assert_eq!(a.heap_index(), None);
    }

    #[test]
    fn test_pair_forwards_to_both() {
        let mut tracker = (KeyedTracker::<u32>::new(), SlotTracker);
        let a = Box::new(item(9));

        tracker.on_insert(&a, 4);
        assert_eq!(tracker.0.index_of(&9), Some(4));
        assert_eq!(a.heap_index(), Some(4));
    }

    #[test]
    fn test_no_tracker_is_zero_sized() {
        assert_eq!(std::mem::size_of::<NoTracker>(), 0);
    }
}
