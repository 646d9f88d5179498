//! Array-backed binary max-heap with position tracking
//!
//! [`BinaryHeap`] keeps its elements in a `Vec` laid out as an implicit complete
//! binary tree. On top of the usual `push`/`pop`/`peek` it supports removing or
//! re-prioritising an element at any index in O(log n), and it reports every
//! index change to a [`PositionTracker`] so callers can find elements by
//! identity without scanning.
//!
//! The heap is a *max*-heap with respect to its comparator. Use
//! [`Greater`](crate::compare::Greater) (or any reversed [`Compare`]) to get the
//! smallest element on top.
//!
//! # Time Complexity
//!
//! | Operation                       | Complexity |
//! |---------------------------------|------------|
//! | `push`                          | O(log n)   |
//! | `pop` / `take` / `erase`        | O(log n)   |
//! | `top` / `peek`                  | O(1)       |
//! | `update` / `increase` / `decrease` | O(log n) |
//! | `from_vec` / `set_compare`      | O(n)       |
//!
//! # Preconditions
//!
//! Positions passed to `take`, `erase`, `update`, `increase` and `decrease`
//! must be in `0..len()`. `increase` and `decrease` additionally require that
//! the new value did not move the other way (with respect to the comparator);
//! they pick the cheaper one-directional sift on that promise and do not fall
//! back to the general one. Both conditions are only checked with
//! `debug_assert!`.
//!
//! # Example
//!
//! ```rust
//! use rust_tracked_heap::binary_heap::BinaryHeap;
//!
//! let mut heap = BinaryHeap::new();
//! heap.push(5);
//! heap.push(3);
//! heap.push(8);
//! heap.push(1);
//! assert_eq!(*heap.top(), 8);
//!
//! // Lower the top below everything else
//! heap.decrease(0, 0);
//! assert_eq!(*heap.top(), 5);
//!
//! // Remove whatever sits at index 1
//! let removed = heap.take(1);
//! assert_eq!(heap.len(), 3);
//! assert!(removed <= 5);
//! ```

use crate::algorithm::{self, HeapStore};
use crate::compare::{Compare, Less};
use crate::tracker::{NoTracker, PositionTracker};
use std::mem;

/// Binary max-heap ordered by `C` and observed by `P`
#[derive(Debug, Clone)]
pub struct BinaryHeap<T, C = Less, P = NoTracker> {
    data: Vec<T>,
    compare: C,
    tracker: P,
}

/// Split borrow of a heap handed to the sift algorithms
struct Sift<'a, T, C, P> {
    data: &'a mut Vec<T>,
    compare: &'a C,
    tracker: &'a mut P,
}

impl<T, C: Compare<T>, P: PositionTracker<T>> HeapStore for Sift<'_, T, C, P> {
    type Item = T;

    #[inline]
    fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    fn less(&self, a: usize, b: usize) -> bool {
        self.compare.less(&self.data[a], &self.data[b])
    }

    #[inline]
    fn move_element(&mut self, from: usize, to: usize) {
        self.data.swap(from, to);
        self.tracker.on_move(&self.data[to], from, to);
    }

    #[inline]
    fn insert_element(&mut self, at: usize) {
        self.tracker.on_insert(&self.data[at], at);
    }

    #[inline]
    fn remove_element(&mut self, at: usize) {
        self.tracker.on_remove(&self.data[at], at);
    }

    #[inline]
    fn swap_remove(&mut self, hole: usize) -> T {
        self.data.swap_remove(hole)
    }
}

/// Restores the heap around `position` if a user closure unwinds
///
/// The element at `position` has already been reported removed when the
/// closure runs. Dropping an armed guard sifts it back into place, which also
/// reports its final index to the tracker.
struct Resift<'a, T, C: Compare<T>, P: PositionTracker<T>> {
    sift: Sift<'a, T, C, P>,
    position: usize,
    armed: bool,
}

impl<T, C: Compare<T>, P: PositionTracker<T>> Drop for Resift<'_, T, C, P> {
    fn drop(&mut self) {
        if self.armed {
            let size = self.sift.len();
            algorithm::adjust_heap(&mut self.sift, self.position, size, 0);
        }
    }
}

impl<T: Ord> BinaryHeap<T> {
    /// Creates an empty max-heap in natural order, without tracking
    pub fn new() -> Self {
        Self::with_tracker(Less, NoTracker)
    }

    /// Like [`BinaryHeap::new`], with room for `capacity` elements
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            compare: Less,
            tracker: NoTracker,
        }
    }
}

impl<T, C, P> BinaryHeap<T, C, P> {
    /// Creates an empty heap with the given comparator and tracker
    pub fn with_tracker(compare: C, tracker: P) -> Self {
        Self {
            data: Vec::new(),
            compare,
            tracker,
        }
    }

    /// Creates an empty heap with the given comparator and a default tracker
    pub fn with_compare(compare: C) -> Self
    where
        P: Default,
    {
        Self::with_tracker(compare, P::default())
    }

    /// Returns true if the heap holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of elements in the heap
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns the top (maximum) element
    ///
    /// # Panics
    /// Panics if the heap is empty. Use [`BinaryHeap::peek`] when emptiness is
    /// an expected case.
    #[inline]
    pub fn top(&self) -> &T {
        &self.data[0]
    }

    /// Returns the top element, or `None` if the heap is empty
    #[inline]
    pub fn peek(&self) -> Option<&T> {
        self.data.first()
    }

    /// Returns the element at `index` in heap layout order
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.data.get(index)
    }

    /// Iterates over the elements in heap layout order (not sorted)
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// The underlying sequence in heap layout order
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The comparator
    pub fn compare(&self) -> &C {
        &self.compare
    }

    /// The position tracker
    pub fn tracker(&self) -> &P {
        &self.tracker
    }

    /// Number of elements the heap can hold without reallocating
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Reserves room for at least `additional` more elements
    pub fn reserve(&mut self, additional: usize) {
        self.data.reserve(additional);
    }

    /// Drops excess capacity
    pub fn shrink_to_fit(&mut self) {
        self.data.shrink_to_fit();
    }

    /// Consumes the heap, returning the sequence in heap layout order
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Consumes the heap, returning the sequence, comparator and tracker
    pub fn into_parts(self) -> (Vec<T>, C, P) {
        (self.data, self.compare, self.tracker)
    }
}

impl<T, C: Compare<T>, P: PositionTracker<T>> BinaryHeap<T, C, P> {
    #[inline]
    fn sift(&mut self) -> Sift<'_, T, C, P> {
        Sift {
            data: &mut self.data,
            compare: &self.compare,
            tracker: &mut self.tracker,
        }
    }

    /// Reports `position` removed, then hands its element to `f`
    ///
    /// If `f` panics, the element is sifted back in before unwinding
    /// continues, so the heap property and the tracker stay consistent.
    fn mutate_at<F: FnOnce(&mut T)>(&mut self, position: usize, f: F) {
        debug_assert!(position < self.data.len(), "position out of range");
        self.tracker.on_remove(&self.data[position], position);
        let mut guard = Resift {
            sift: self.sift(),
            position,
            armed: true,
        };
        f(&mut guard.sift.data[position]);
        guard.armed = false;
    }

    /// Builds a heap from an arbitrary vector in O(n)
    ///
    /// Every element is first reported to the tracker at its initial index,
    /// then the heap property is established bottom-up.
    pub fn from_vec_with(data: Vec<T>, compare: C, mut tracker: P) -> Self {
        for (index, value) in data.iter().enumerate() {
            tracker.on_insert(value, index);
        }
        let mut heap = Self {
            data,
            compare,
            tracker,
        };
        algorithm::make_heap(&mut heap.sift());
        heap
    }

    /// Returns true if the heap property holds at every index
    pub fn is_heap(&self) -> bool {
        (1..self.data.len()).all(|i| {
            !self
                .compare
                .less(&self.data[algorithm::parent_index(i)], &self.data[i])
        })
    }

    /// Inserts `value`
    pub fn push(&mut self, value: T) {
        self.data.push(value);
        let hole = self.data.len() - 1;
        let mut sift = self.sift();
        let rest = algorithm::up_heap(&mut sift, hole, 0);
        sift.insert_element(rest);
    }

    /// Removes and returns the top element, or `None` if the heap is empty
    pub fn pop(&mut self) -> Option<T> {
        if self.data.is_empty() {
            return None;
        }
        Some(self.take(0))
    }

    /// Removes and returns the element at `position`
    ///
    /// The last element fills the gap and is sifted in whichever direction
    /// restores the heap property.
    pub fn take(&mut self, position: usize) -> T {
        debug_assert!(position < self.data.len(), "position out of range");
        let mut sift = self.sift();
        sift.remove_element(position);
        algorithm::fill_space(&mut sift, position)
    }

    /// Removes the element at `position`, dropping it
    pub fn erase(&mut self, position: usize) {
        drop(self.take(position));
    }

    /// Replaces the element at `position`, returning the old one
    ///
    /// The direction of change may be unknown.
    pub fn update(&mut self, position: usize, value: T) -> T {
        let mut value = value;
        self.update_with(position, |slot| mem::swap(slot, &mut value));
        value
    }

    /// Mutates the element at `position` in place, then restores the heap
    ///
    /// If `f` panics the element keeps whatever state `f` left it in and is
    /// sifted to a valid index before the panic propagates.
    pub fn update_with<F: FnOnce(&mut T)>(&mut self, position: usize, f: F) {
        self.mutate_at(position, f);
        let size = self.data.len();
        algorithm::adjust_heap(&mut self.sift(), position, size, 0);
    }

    /// Replaces the element at `position` with a value that orders no
    /// earlier than the old one, returning the old one
    ///
    /// Behaviour is unspecified if `value` orders before the old element.
    pub fn increase(&mut self, position: usize, value: T) -> T {
        debug_assert!(
            !self.compare.less(&value, &self.data[position]),
            "increase() with a smaller value"
        );
        let mut value = value;
        self.increase_with(position, |slot| mem::swap(slot, &mut value));
        value
    }

    /// In-place variant of [`BinaryHeap::increase`]
    pub fn increase_with<F: FnOnce(&mut T)>(&mut self, position: usize, f: F) {
        self.mutate_at(position, f);
        let mut sift = self.sift();
        let rest = algorithm::up_heap(&mut sift, position, 0);
        sift.insert_element(rest);
    }

    /// Replaces the element at `position` with a value that orders no later
    /// than the old one, returning the old one
    ///
    /// Behaviour is unspecified if `value` orders after the old element.
    pub fn decrease(&mut self, position: usize, value: T) -> T {
        debug_assert!(
            !self.compare.less(&self.data[position], &value),
            "decrease() with a larger value"
        );
        let mut value = value;
        self.decrease_with(position, |slot| mem::swap(slot, &mut value));
        value
    }

    /// In-place variant of [`BinaryHeap::decrease`]
    pub fn decrease_with<F: FnOnce(&mut T)>(&mut self, position: usize, f: F) {
        self.mutate_at(position, f);
        algorithm::heapify(&mut self.sift(), position);
    }

    /// Replaces the comparator and rebuilds the heap
    pub fn set_compare(&mut self, compare: C) {
        self.compare = compare;
        algorithm::make_heap(&mut self.sift());
    }

    /// Removes every element, reporting each removal to the tracker
    pub fn clear(&mut self) {
        for (index, value) in self.data.iter().enumerate() {
            self.tracker.on_remove(value, index);
        }
        self.data.clear();
    }
}

impl<T: Ord> BinaryHeap<T> {
    /// Builds a natural-order heap from an arbitrary vector in O(n)
    pub fn from_vec(data: Vec<T>) -> Self {
        Self::from_vec_with(data, Less, NoTracker)
    }
}

impl<T, C: Default, P: Default> Default for BinaryHeap<T, C, P> {
    fn default() -> Self {
        Self::with_tracker(C::default(), P::default())
    }
}

impl<T: Ord> From<Vec<T>> for BinaryHeap<T> {
    fn from(data: Vec<T>) -> Self {
        Self::from_vec(data)
    }
}

impl<T, C, P> FromIterator<T> for BinaryHeap<T, C, P>
where
    C: Compare<T> + Default,
    P: PositionTracker<T> + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec_with(iter.into_iter().collect(), C::default(), P::default())
    }
}

impl<T, C: Compare<T>, P: PositionTracker<T>> Extend<T> for BinaryHeap<T, C, P> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        if self.data.is_empty() {
            self.data.extend(iter);
            for (index, value) in self.data.iter().enumerate() {
                self.tracker.on_insert(value, index);
            }
            algorithm::make_heap(&mut self.sift());
        } else {
            let iter = iter.into_iter();
            self.data.reserve(iter.size_hint().0);
            for value in iter {
                self.push(value);
            }
        }
    }
}

impl<'a, T, C, P> IntoIterator for &'a BinaryHeap<T, C, P> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
