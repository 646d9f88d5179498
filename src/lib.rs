//! Tracked Binary Heap for Rust
//!
//! This crate provides an array-backed binary max-heap that, besides push and
//! pop, supports O(log n) removal at an arbitrary position and
//! increase/decrease-key updates, together with a pluggable hook that observes
//! every index change. With a tracker installed, elements can be found and
//! removed by identity without scanning the heap.
//!
//! # Features
//!
//! - **Binary Heap**: push/pop/take/update in O(log n), bulk build in O(n)
//! - **Position Trackers**: zero-cost no-op default, keyed side map, embedded slot, `tracing` logger
//! - **Comparators**: natural, reversed, or any closure
//! - **Timer Queue**: register/unregister/activate over the tracked heap, inline or boxed storage
//! - **Comparison Backends**: the same timer queue contract over simpler data structures
//!
//! # Example
//!
//! ```rust
//! use rust_tracked_heap::BinaryHeap;
//!
//! let mut heap = BinaryHeap::from_vec(vec![5, 3, 8, 1]);
//! assert_eq!(*heap.top(), 8);
//!
//! heap.increase(3, 10);
//! assert_eq!(heap.pop(), Some(10));
//! assert_eq!(heap.pop(), Some(8));
//! ```

pub mod algorithm;
pub mod backends;
pub mod binary_heap;
pub mod compare;
pub mod timer;
pub mod tracker;
pub mod traits;

// Re-export the main types for convenience
pub use binary_heap::BinaryHeap;
pub use timer::TimerQueue;
pub use traits::{QueueError, TimerQueueBackend};
