//! Textbook binary heap algorithms over an abstract sequence store
//!
//! The sift procedures here are stateless. They work on any [`HeapStore`],
//! which lays its elements out as an implicit complete binary tree: the
//! children of `i` are `2i + 1` and `2i + 2`, the parent of `i` is
//! `(i - 1) / 2`.
//!
//! # The hole
//!
//! Every algorithm moves a *candidate* value through the tree. Textbook
//! descriptions keep the candidate outside the array and shift other elements
//! into the vacated "hole". Here the candidate always sits in the hole slot
//! itself and a move is a swap, so no slot is ever left uninitialised. The
//! tracker still sees the textbook event stream: one `move` per displaced
//! element and a single `insert` for the candidate once it comes to rest.
//!
//! # Which sift when
//!
//! | Algorithm       | Direction of change | Comparisons per level |
//! |-----------------|---------------------|-----------------------|
//! | [`up_heap`]     | increased           | 1                     |
//! | [`adjust_heap`] | unknown             | 1 down, then 1 up     |
//! | [`heapify`]     | decreased / unknown | 2                     |

/// Capability contract the sift algorithms need from a heap
///
/// Indices are always in `0..self.len()`. Implementations are expected to
/// forward each primitive to their position tracker.
pub trait HeapStore {
    /// Element type, only used by [`fill_space`] and [`HeapStore::swap_remove`]
    type Item;

    /// Number of elements in the sequence
    fn len(&self) -> usize;

    /// Returns true if the sequence is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the element at `a` orders strictly before the one at `b`
    fn less(&self, a: usize, b: usize) -> bool;

    /// Moves the element at `from` into the hole at `to`
    ///
    /// The candidate previously in `to` ends up in `from`, which becomes the
    /// new hole. Reports a move of the displaced element.
    fn move_element(&mut self, from: usize, to: usize);

    /// Reports the candidate as having come to rest at `at`
    fn insert_element(&mut self, at: usize);

    /// Reports the element at `at` as leaving the heap layout
    fn remove_element(&mut self, at: usize);

    /// Swaps the last element into `hole` and drops the length by one,
    /// returning the element previously in `hole`
    ///
    /// No notification is issued; callers report both slots themselves.
    fn swap_remove(&mut self, hole: usize) -> Self::Item;
}

#[inline(always)]
pub fn parent_index(idx: usize) -> usize {
    (idx - 1) / 2
}

#[inline(always)]
pub fn first_child_index(idx: usize) -> usize {
    2 * idx + 1
}

#[inline(always)]
pub fn second_child_index(idx: usize) -> usize {
    2 * (idx + 1)
}

/// Index of the first leaf of a heap holding `len` elements
#[inline(always)]
pub fn first_leaf(len: usize) -> usize {
    len / 2
}

/// Moves the candidate at `hole` towards the root
///
/// Stops at `floor` or as soon as the parent no longer orders before the
/// candidate. Returns the final index of the candidate; the caller reports
/// the insert.
pub fn up_heap<S: HeapStore + ?Sized>(store: &mut S, mut hole: usize, floor: usize) -> usize {
    while hole > floor {
        let parent = parent_index(hole);
        if !store.less(parent, hole) {
            break;
        }
        store.move_element(parent, hole);
        hole = parent;
    }
    hole
}

/// Sinks the candidate at `hole` to a leaf, then floats it back up
///
/// Only the first `size` slots are considered part of the heap. On the way
/// down the larger child always takes the hole, the left one on a tie. The
/// closing [`up_heap`] (bounded by `floor`) puts the candidate where it
/// belongs, so this is correct whichever way the candidate's key changed.
pub fn adjust_heap<S: HeapStore + ?Sized>(store: &mut S, mut hole: usize, size: usize, floor: usize) {
    let mut child = second_child_index(hole);
    while child < size {
        let left = child - 1;
        if !store.less(left, child) {
            child = left;
        }
        store.move_element(child, hole);
        hole = child;
        child = second_child_index(hole);
    }
    if child == size {
        // Lone left child at the very end
        let left = child - 1;
        store.move_element(left, hole);
        hole = left;
    }

    let rest = up_heap(store, hole, floor);
    store.insert_element(rest);
}

/// Sinks the candidate at `idx` until both children order no later than it
///
/// Costs two comparisons per level but needs no assumption on the candidate
/// beyond the subtrees below `idx` being valid heaps.
pub fn heapify<S: HeapStore + ?Sized>(store: &mut S, mut idx: usize) {
    let size = store.len();

    let mut second = second_child_index(idx);
    while second < size {
        let first = second - 1;
        let max = if store.less(idx, second) {
            if store.less(second, first) {
                first
            } else {
                second
            }
        } else if store.less(idx, first) {
            first
        } else {
            idx
        };

        if max == idx {
            store.insert_element(idx);
            return;
        }

        store.move_element(max, idx);
        idx = max;
        second = second_child_index(idx);
    }
    if second == size {
        let first = second - 1;
        if store.less(idx, first) {
            store.move_element(first, idx);
            idx = first;
        }
    }
    store.insert_element(idx);
}

/// Establishes the heap property over an arbitrary sequence in O(n)
///
/// Internal nodes are processed bottom-up, so every subtree below the current
/// index is already a heap when [`heapify`] runs on it.
pub fn make_heap<S: HeapStore + ?Sized>(store: &mut S) {
    for idx in (0..first_leaf(store.len())).rev() {
        store.remove_element(idx);
        heapify(store, idx);
    }
}

/// Closes the gap at `hole` and returns the element that occupied it
///
/// The caller must already have reported the removal of `hole`. The last
/// element is reported as removed, swapped into the gap and sifted into place
/// with [`adjust_heap`].
pub fn fill_space<S: HeapStore + ?Sized>(store: &mut S, hole: usize) -> S::Item {
    let last = store.len() - 1;
    if hole < last {
        store.remove_element(last);
        let removed = store.swap_remove(hole);
        adjust_heap(store, hole, last, 0);
        removed
    } else {
        store.swap_remove(hole)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal store over a `Vec<i32>` recording every notification
    #[derive(Default)]
    struct Recording {
        data: Vec<i32>,
        events: Vec<String>,
    }

    impl HeapStore for Recording {
        type Item = i32;

        fn len(&self) -> usize {
            self.data.len()
        }

        fn less(&self, a: usize, b: usize) -> bool {
            self.data[a] < self.data[b]
        }

        fn move_element(&mut self, from: usize, to: usize) {
            self.data.swap(from, to);
            self.events.push(format!("move {} {}->{}", self.data[to], from, to));
        }

        fn insert_element(&mut self, at: usize) {
            self.events.push(format!("insert {} @{}", self.data[at], at));
        }

        fn remove_element(&mut self, at: usize) {
            self.events.push(format!("remove {} @{}", self.data[at], at));
        }

        fn swap_remove(&mut self, hole: usize) -> i32 {
            self.data.swap_remove(hole)
        }
    }

    fn is_heap(data: &[i32]) -> bool {
        (1..data.len()).all(|i| data[parent_index(i)] >= data[i])
    }

    #[test]
    fn test_index_helpers() {
        assert_eq!(first_child_index(0), 1);
        assert_eq!(second_child_index(0), 2);
        assert_eq!(first_child_index(3), 7);
        assert_eq!(second_child_index(3), 8);
        assert_eq!(parent_index(7), 3);
        assert_eq!(parent_index(8), 3);
        assert_eq!(first_leaf(7), 3);
        assert_eq!(first_leaf(8), 4);
    }

    #[test]
    fn test_up_heap_stops_at_floor() {
        let mut store = Recording {
            data: vec![1, 2, 3, 4, 5, 6, 9],
            ..Default::default()
        };
        // 9 at index 6 wants the root, but the floor is 2
        assert_eq!(up_heap(&mut store, 6, 2), 2);
        assert_eq!(store.data[2], 9);
        assert_eq!(store.events, vec!["move 3 2->6"]);
    }

    #[test]
    fn test_heapify_event_stream() {
        let mut store = Recording {
            data: vec![1, 5, 4, 3],
            ..Default::default()
        };
        heapify(&mut store, 0);
        assert_eq!(store.data, vec![5, 3, 4, 1]);
        assert_eq!(
            store.events,
            vec!["move 5 1->0", "move 3 3->1", "insert 1 @3"]
        );
    }

    #[test]
    fn test_adjust_heap_rises_after_descent() {
        // Replace the 3 at index 4 (a leaf) with 10: the descent is empty and
        // the closing up-heap must lift it to the root
        let mut store = Recording {
            data: vec![9, 8, 7, 1, 10, 2],
            ..Default::default()
        };
        adjust_heap(&mut store, 4, 6, 0);
        assert!(is_heap(&store.data));
        assert_eq!(store.data[0], 10);
    }

    #[test]
    fn test_adjust_heap_prefers_left_on_tie() {
        let mut store = Recording {
            data: vec![0, 5, 5],
            ..Default::default()
        };
        adjust_heap(&mut store, 0, 3, 0);
        assert_eq!(store.events[0], "move 5 1->0");
        assert_eq!(store.data, vec![5, 0, 5]);
    }

    #[test]
    fn test_make_heap_and_fill_space() {
        let mut store = Recording {
            data: vec![3, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5],
            ..Default::default()
        };
        make_heap(&mut store);
        assert!(is_heap(&store.data));
        assert_eq!(store.data[0], 9);

        // Remove an interior element
        store.remove_element(2);
        fill_space(&mut store, 2);
        assert_eq!(store.data.len(), 10);
        assert!(is_heap(&store.data));

        // Remove the last element: no sift needed
        let last = store.data.len() - 1;
        let expected = store.data[last];
        store.remove_element(last);
        assert_eq!(fill_space(&mut store, last), expected);
        assert!(is_heap(&store.data));
    }
}
