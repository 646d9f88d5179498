//! Comparators defining the heap order
//!
//! [`BinaryHeap`](crate::binary_heap::BinaryHeap) is a max-heap with respect to
//! its comparator: the element that is largest according to [`Compare::less`]
//! is kept at the top. Swapping the comparator turns it into a min-heap without
//! wrapping every element in `std::cmp::Reverse`.
//!
//! # Example
//!
//! ```rust
//! use rust_tracked_heap::compare::{Compare, FnCompare, Greater, Less};
//!
//! assert!(Less.less(&1, &2));
//! assert!(Greater.less(&2, &1));
//!
//! let by_len = FnCompare(|a: &&str, b: &&str| a.len() < b.len());
//! assert!(by_len.less(&"ab", &"abc"));
//! ```

/// A strict weak order over `T`
///
/// `less(a, b)` must be irreflexive and transitive, and incomparability must be
/// transitive. Ties (neither `less(a, b)` nor `less(b, a)`) are allowed.
pub trait Compare<T: ?Sized> {
    /// Returns true if `a` orders strictly before `b`
    fn less(&self, a: &T, b: &T) -> bool;
}

/// Natural order via [`Ord`]; the heap top is the maximum
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Less;

impl<T: Ord + ?Sized> Compare<T> for Less {
    #[inline]
    fn less(&self, a: &T, b: &T) -> bool {
        a < b
    }
}

/// Reversed natural order; the heap top is the minimum
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Greater;

impl<T: Ord + ?Sized> Compare<T> for Greater {
    #[inline]
    fn less(&self, a: &T, b: &T) -> bool {
        a > b
    }
}

/// Adapts a closure `Fn(&T, &T) -> bool` into a [`Compare`]
#[derive(Clone, Copy, Default)]
pub struct FnCompare<F>(pub F);

impl<T: ?Sized, F: Fn(&T, &T) -> bool> Compare<T> for FnCompare<F> {
    #[inline]
    fn less(&self, a: &T, b: &T) -> bool {
        (self.0)(a, b)
    }
}

impl<F> std::fmt::Debug for FnCompare<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnCompare(..)")
    }
}
