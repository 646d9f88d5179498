//! Alternative timer queues for comparison
//!
//! Each type here implements [`TimerQueueBackend`] on top of a different data
//! structure. None of them shares code with the tracked heap beyond that
//! trait; they exist so the same workload can be run everywhere and the
//! results (and timings) compared.
//!
//! | Backend            | Activate          | Unregister            |
//! |--------------------|-------------------|-----------------------|
//! | [`ScanHeapQueue`]  | O(log n) decrease | O(n) scan + O(log n)  |
//! | [`SortedVecQueue`] | O(n) insert       | O(n) scan             |
//! | [`StdHeapQueue`]   | O(log n) pop/push | O(n) scan + rebuild   |
//! | [`BTreeQueue`]     | O(log n)          | O(log n)              |
//!
//! [`TimerQueue`](crate::timer::TimerQueue) (O(log n) for both) is the
//! reference.

use crate::binary_heap::BinaryHeap;
use crate::timer::{EarliestDue, TimerId, TimerRecord, TimerStorage};
use crate::traits::{QueueError, TimerQueueBackend};
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::{BTreeMap, VecDeque};

/// Intervals of the long-lived timers in [`standard_workload`]
pub const PERMANENT_INTERVALS: [u64; 20] = [
    16, 33, 50, 97, 250, 1000, 1000, 1234, 3000, 10000, 17, 25, 35, 74, 500, 987, 1333, 4711,
    2000, 9999000,
];

/// Interval of the short-lived timer in [`standard_workload`]
pub const TEMPORARY_INTERVAL: u64 = 100;

/// Every this many activations the short-lived timer is replaced
pub const TEMPORARY_PERIOD: usize = 32;

/// Runs the comparison workload against `queue`
///
/// Registers [`PERMANENT_INTERVALS`], then activates `iterations` times. Every
/// [`TEMPORARY_PERIOD`] iterations the previous temporary timer is
/// unregistered and a new one is registered at the current top time. Returns
/// the top time at the end, which must agree across backends.
pub fn standard_workload<Q: TimerQueueBackend>(
    queue: &mut Q,
    iterations: usize,
) -> Result<u64, QueueError> {
    for interval in PERMANENT_INTERVALS {
        queue.register_timer(interval, 0)?;
    }

    let mut temporary = None;
    for i in 0..iterations {
        queue.activate()?;

        if i % TEMPORARY_PERIOD == 0 {
            if let Some(id) = temporary.take() {
                queue.unregister_timer(id)?;
            }
            let now = queue.current_top_time().ok_or(QueueError::Empty)?;
            temporary = Some(queue.register_timer(TEMPORARY_INTERVAL, now)?);
        }
    }

    queue.current_top_time().ok_or(QueueError::Empty)
}

// ============================================================================
// ScanHeapQueue - untracked binary heap
// ============================================================================

/// The crate's heap without a position tracker
///
/// Activation is identical to [`TimerQueue`](crate::timer::TimerQueue), but
/// finding a timer to unregister needs a linear scan.
pub struct ScanHeapQueue<S: TimerStorage = TimerRecord> {
    heap: BinaryHeap<S, EarliestDue>,
    next_id: TimerId,
}

impl<S: TimerStorage> TimerQueueBackend for ScanHeapQueue<S> {
    fn new() -> Self {
        Self {
            heap: BinaryHeap::with_compare(EarliestDue),
            next_id: 0,
        }
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn register_timer(&mut self, interval: u64, current: u64) -> Result<TimerId, QueueError> {
        if interval == 0 {
            return Err(QueueError::ZeroInterval);
        }
        let id = self.next_id;
        TimerRecord::new(id, interval, current).next_due()?;
        self.next_id += 1;
        self.heap
            .push(S::from_record(TimerRecord::new(id, interval, current)));
        Ok(id)
    }

    fn unregister_timer(&mut self, id: TimerId) -> Result<TimerRecord, QueueError> {
        let pos = self
            .heap
            .iter()
            .position(|t| t.record().id == id)
            .ok_or(QueueError::UnknownTimer(id))?;
        Ok(self.heap.take(pos).into_record())
    }

    fn activate(&mut self) -> Result<usize, QueueError> {
        let due = self.current_top_time().ok_or(QueueError::Empty)?;
        let mut fired = 0;
        loop {
            let next = self.heap.top().record().next_due()?;
            self.heap
                .decrease_with(0, |timer| timer.record_mut().due = next);
            fired += 1;
            if self.heap.top().record().due != due {
                break;
            }
        }
        Ok(fired)
    }

    fn current_top_time(&self) -> Option<u64> {
        self.heap.peek().map(|t| t.record().due)
    }
}

// ============================================================================
// SortedVecQueue - sorted list
// ============================================================================

/// Timers kept sorted by due time, earliest first
///
/// Insertion scans from the back, so a timer lands after every timer with the
/// same due time.
pub struct SortedVecQueue {
    timers: VecDeque<TimerRecord>,
    next_id: TimerId,
}

impl SortedVecQueue {
    fn insert(&mut self, timer: TimerRecord) {
        let mut index = self.timers.len();
        while index > 0 && timer.due < self.timers[index - 1].due {
            index -= 1;
        }
        self.timers.insert(index, timer);
    }
}

impl TimerQueueBackend for SortedVecQueue {
    fn new() -> Self {
        Self {
            timers: VecDeque::new(),
            next_id: 0,
        }
    }

    fn len(&self) -> usize {
        self.timers.len()
    }

    fn register_timer(&mut self, interval: u64, current: u64) -> Result<TimerId, QueueError> {
        if interval == 0 {
            return Err(QueueError::ZeroInterval);
        }
        let id = self.next_id;
        TimerRecord::new(id, interval, current).next_due()?;
        self.next_id += 1;
        self.insert(TimerRecord::new(id, interval, current));
        Ok(id)
    }

    fn unregister_timer(&mut self, id: TimerId) -> Result<TimerRecord, QueueError> {
        let pos = self
            .timers
            .iter()
            .position(|t| t.id == id)
            .ok_or(QueueError::UnknownTimer(id))?;
        self.timers.remove(pos).ok_or(QueueError::UnknownTimer(id))
    }

    fn activate(&mut self) -> Result<usize, QueueError> {
        let due = self.current_top_time().ok_or(QueueError::Empty)?;
        let mut fired = 0;
        while let Some(&front) = self.timers.front() {
            let mut timer = front;
            timer.advance()?;
            self.timers.pop_front();
            self.insert(timer);
            fired += 1;
            if self.current_top_time() != Some(due) {
                break;
            }
        }
        Ok(fired)
    }

    fn current_top_time(&self) -> Option<u64> {
        self.timers.front().map(|t| t.due)
    }
}

// ============================================================================
// StdHeapQueue - std::collections::BinaryHeap
// ============================================================================

/// Orders records by due time for the std heap, earliest on top
#[derive(Debug, Clone, Copy)]
struct ByDue(TimerRecord);

impl PartialEq for ByDue {
    fn eq(&self, other: &Self) -> bool {
        self.0.due == other.0.due
    }
}

impl Eq for ByDue {}

impl PartialOrd for ByDue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ByDue {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.due.cmp(&self.0.due)
    }
}

/// `std::collections::BinaryHeap` with pop/push activation
///
/// The std heap cannot remove an arbitrary element, so unregistering rebuilds
/// it from a vector.
pub struct StdHeapQueue {
    heap: std::collections::BinaryHeap<ByDue>,
    next_id: TimerId,
}

impl TimerQueueBackend for StdHeapQueue {
    fn new() -> Self {
        Self {
            heap: std::collections::BinaryHeap::new(),
            next_id: 0,
        }
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn register_timer(&mut self, interval: u64, current: u64) -> Result<TimerId, QueueError> {
        if interval == 0 {
            return Err(QueueError::ZeroInterval);
        }
        let id = self.next_id;
        TimerRecord::new(id, interval, current).next_due()?;
        self.next_id += 1;
        self.heap.push(ByDue(TimerRecord::new(id, interval, current)));
        Ok(id)
    }

    fn unregister_timer(&mut self, id: TimerId) -> Result<TimerRecord, QueueError> {
        let mut timers = std::mem::take(&mut self.heap).into_vec();
        let found = timers.iter().position(|t| t.0.id == id);
        let removed = found.map(|pos| timers.swap_remove(pos).0);
        self.heap = timers.into();
        removed.ok_or(QueueError::UnknownTimer(id))
    }

    fn activate(&mut self) -> Result<usize, QueueError> {
        let due = self.current_top_time().ok_or(QueueError::Empty)?;
        let mut fired = 0;
        while let Some(&ByDue(top)) = self.heap.peek() {
            let mut timer = top;
            timer.advance()?;
            self.heap.pop();
            self.heap.push(ByDue(timer));
            fired += 1;
            if self.current_top_time() != Some(due) {
                break;
            }
        }
        Ok(fired)
    }

    fn current_top_time(&self) -> Option<u64> {
        self.heap.peek().map(|t| t.0.due)
    }
}

// ============================================================================
// BTreeQueue - ordered multi-index
// ============================================================================

/// Ordered index on `(due, id)` plus a hash index on `id`
pub struct BTreeQueue {
    by_due: BTreeMap<(u64, TimerId), u64>,
    by_id: FxHashMap<TimerId, u64>,
    next_id: TimerId,
}

impl TimerQueueBackend for BTreeQueue {
    fn new() -> Self {
        Self {
            by_due: BTreeMap::new(),
            by_id: FxHashMap::default(),
            next_id: 0,
        }
    }

    fn len(&self) -> usize {
        self.by_id.len()
    }

    fn register_timer(&mut self, interval: u64, current: u64) -> Result<TimerId, QueueError> {
        if interval == 0 {
            return Err(QueueError::ZeroInterval);
        }
        let id = self.next_id;
        TimerRecord::new(id, interval, current).next_due()?;
        self.next_id += 1;
        self.by_due.insert((current, id), interval);
        self.by_id.insert(id, current);
        Ok(id)
    }

    fn unregister_timer(&mut self, id: TimerId) -> Result<TimerRecord, QueueError> {
        let due = self.by_id.remove(&id).ok_or(QueueError::UnknownTimer(id))?;
        let interval = self
            .by_due
            .remove(&(due, id))
            .ok_or(QueueError::UnknownTimer(id))?;
        Ok(TimerRecord::new(id, interval, due))
    }

    fn activate(&mut self) -> Result<usize, QueueError> {
        let due = self.current_top_time().ok_or(QueueError::Empty)?;
        let mut fired = 0;
        while let Some((&(_, id), &interval)) = self.by_due.first_key_value() {
            let mut timer = TimerRecord::new(id, interval, due);
            timer.advance()?;
            self.by_due.pop_first();
            self.by_due.insert((timer.due, id), interval);
            self.by_id.insert(id, timer.due);
            fired += 1;
            if self.current_top_time() != Some(due) {
                break;
            }
        }
        Ok(fired)
    }

    fn current_top_time(&self) -> Option<u64> {
        self.by_due.keys().next().map(|&(due, _)| due)
    }
}
