//! Timer queue built on the tracked binary heap
//!
//! Timers are ordered by due time with [`EarliestDue`], which puts the
//! earliest timer at the top of the max-heap. A [`KeyedTracker`] keeps the
//! id → heap index map, so unregistering any timer is a hash lookup followed
//! by an O(log n) [`BinaryHeap::take`].
//!
//! The queue is generic over how timers are stored inside the heap (see
//! [`TimerStorage`]): inline as [`TimerRecord`] values, or behind an owned
//! `Box<TimerRecord>`. The boxed form moves a pointer on every sift step
//! instead of the whole record, but pays an indirection on every comparison.
//!
//! # Example
//!
//! ```rust
//! use rust_tracked_heap::timer::{BoxedTimerQueue, TimerQueue};
//! use rust_tracked_heap::TimerQueueBackend;
//!
//! let mut inline: TimerQueue = TimerQueue::new();
//! let mut boxed: BoxedTimerQueue = TimerQueue::new();
//!
//! for queue_interval in [16, 33, 50] {
//!     inline.register_timer(queue_interval, 0).unwrap();
//!     boxed.register_timer(queue_interval, 0).unwrap();
//! }
//!
//! inline.activate().unwrap();
//! boxed.activate().unwrap();
//! assert_eq!(inline.current_top_time(), Some(16));
//! assert_eq!(boxed.current_top_time(), Some(16));
//! ```

use crate::binary_heap::BinaryHeap;
use crate::compare::Compare;
use crate::tracker::{Keyed, KeyedTracker};
use crate::traits::{QueueError, TimerQueueBackend};
use tracing::{debug, trace};

/// Opaque timer identity
pub type TimerId = u64;

/// A periodic timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerRecord {
    /// Identity handed out by the queue
    pub id: TimerId,
    /// Period between two firings
    pub interval: u64,
    /// Next time the timer is due
    pub due: u64,
}

impl TimerRecord {
    pub fn new(id: TimerId, interval: u64, due: u64) -> Self {
        Self { id, interval, due }
    }

    /// Due time one interval after the current one
    ///
    /// # Errors
    /// Returns [`QueueError::DueOverflow`] if that time is not representable.
    #[inline]
    pub fn next_due(&self) -> Result<u64, QueueError> {
        self.due
            .checked_add(self.interval)
            .ok_or(QueueError::DueOverflow {
                due: self.due,
                interval: self.interval,
            })
    }

    /// Moves the due time one interval forward
    ///
    /// On overflow the record is left unchanged.
    #[inline]
    pub fn advance(&mut self) -> Result<(), QueueError> {
        self.due = self.next_due()?;
        Ok(())
    }
}

impl Keyed for TimerRecord {
    type Key = TimerId;

    #[inline]
    fn key(&self) -> TimerId {
        self.id
    }
}

/// How a timer is stored inside the heap
///
/// Implemented for [`TimerRecord`] (inline) and `Box<TimerRecord>` (owned
/// indirection).
pub trait TimerStorage: Keyed<Key = TimerId> {
    fn from_record(record: TimerRecord) -> Self;

    fn record(&self) -> &TimerRecord;

    fn record_mut(&mut self) -> &mut TimerRecord;

    fn into_record(self) -> TimerRecord;
}

impl TimerStorage for TimerRecord {
    #[inline]
    fn from_record(record: TimerRecord) -> Self {
        record
    }

    #[inline]
    fn record(&self) -> &TimerRecord {
        self
    }

    #[inline]
    fn record_mut(&mut self) -> &mut TimerRecord {
        self
    }

    #[inline]
    fn into_record(self) -> TimerRecord {
        self
    }
}

impl TimerStorage for Box<TimerRecord> {
    #[inline]
    fn from_record(record: TimerRecord) -> Self {
        Box::new(record)
    }

    #[inline]
    fn record(&self) -> &TimerRecord {
        self
    }

    #[inline]
    fn record_mut(&mut self) -> &mut TimerRecord {
        self
    }

    #[inline]
    fn into_record(self) -> TimerRecord {
        *self
    }
}

/// Orders timers so the earliest due time is the heap maximum
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EarliestDue;

impl<S: TimerStorage> Compare<S> for EarliestDue {
    #[inline]
    fn less(&self, a: &S, b: &S) -> bool {
        a.record().due > b.record().due
    }
}

/// Timer queue over a tracked binary heap
pub struct TimerQueue<S: TimerStorage = TimerRecord> {
    heap: BinaryHeap<S, EarliestDue, KeyedTracker<TimerId>>,
    next_id: TimerId,
}

/// [`TimerQueue`] storing each timer behind a `Box`
pub type BoxedTimerQueue = TimerQueue<Box<TimerRecord>>;

impl<S: TimerStorage> TimerQueue<S> {
    /// Creates an empty queue with room for `capacity` timers
    pub fn with_capacity(capacity: usize) -> Self {
        let mut heap = BinaryHeap::with_tracker(EarliestDue, KeyedTracker::with_capacity(capacity));
        heap.reserve(capacity);
        Self { heap, next_id: 0 }
    }

    /// Looks up a registered timer
    pub fn get(&self, id: TimerId) -> Option<&TimerRecord> {
        let pos = self.heap.tracker().index_of(&id)?;
        self.heap.get(pos).map(TimerStorage::record)
    }

    /// Returns true if a timer with `id` is registered
    pub fn contains(&self, id: TimerId) -> bool {
        self.heap.tracker().contains(&id)
    }

    /// The earliest-due timer
    pub fn peek(&self) -> Option<&TimerRecord> {
        self.heap.peek().map(TimerStorage::record)
    }

    /// Iterates over registered timers in heap layout order
    pub fn iter(&self) -> impl Iterator<Item = &TimerRecord> + '_ {
        self.heap.iter().map(TimerStorage::record)
    }

    /// Moves a timer to a new due time
    ///
    /// An earlier due time raises the timer in the heap, a later one lowers
    /// it; either way only the cheaper one-directional sift runs.
    ///
    /// # Errors
    /// Returns [`QueueError::UnknownTimer`] if no such timer is registered.
    pub fn reschedule(&mut self, id: TimerId, due: u64) -> Result<(), QueueError> {
        let pos = self
            .heap
            .tracker()
            .index_of(&id)
            .ok_or(QueueError::UnknownTimer(id))?;
        let old = self.heap.as_slice()[pos].record().due;
        if due < old {
            self.heap.increase_with(pos, |t| t.record_mut().due = due);
        } else {
            self.heap.decrease_with(pos, |t| t.record_mut().due = due);
        }
        debug!(id, old, due, "rescheduled timer");
        Ok(())
    }

    /// Unregisters every timer; ids keep counting up
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

impl<S: TimerStorage> Default for TimerQueue<S> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<S: TimerStorage> TimerQueueBackend for TimerQueue<S> {
    fn new() -> Self {
        Self::default()
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn register_timer(&mut self, interval: u64, current: u64) -> Result<TimerId, QueueError> {
        if interval == 0 {
            return Err(QueueError::ZeroInterval);
        }
        let id = self.next_id;
        let record = TimerRecord::new(id, interval, current);
        record.next_due()?;
        self.next_id += 1;
        self.heap.push(S::from_record(record));
        debug!(id, interval, due = current, "registered timer");
        Ok(id)
    }

    fn unregister_timer(&mut self, id: TimerId) -> Result<TimerRecord, QueueError> {
        let pos = self
            .heap
            .tracker()
            .index_of(&id)
            .ok_or(QueueError::UnknownTimer(id))?;
        let record = self.heap.take(pos).into_record();
        debug!(id, due = record.due, "unregistered timer");
        Ok(record)
    }

    fn activate(&mut self) -> Result<usize, QueueError> {
        let due = self.peek().ok_or(QueueError::Empty)?.due;
        let mut fired = 0;
        loop {
            // Checked before the heap is touched, so an overflow leaves the
            // top in place and tracked
            let next = self.heap.top().record().next_due()?;
            // Advancing only ever makes the top due later
            self.heap
                .decrease_with(0, |timer| timer.record_mut().due = next);
            fired += 1;
            if self.heap.top().record().due != due {
                break;
            }
        }
        trace!(due, fired, "activated timers");
        Ok(fired)
    }

    fn current_top_time(&self) -> Option<u64> {
        self.peek().map(|t| t.due)
    }
}

impl<S: TimerStorage> std::fmt::Debug for TimerQueue<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerQueue")
            .field("len", &self.heap.len())
            .field("next_id", &self.next_id)
            .field("next_due", &self.current_top_time())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_index<S: TimerStorage>(queue: &TimerQueue<S>) {
        assert!(queue.heap.is_heap());
        assert_eq!(queue.heap.tracker().len(), queue.heap.len());
        for (i, t) in queue.iter().enumerate() {
            assert_eq!(queue.heap.tracker().index_of(&t.id), Some(i));
        }
    }

    fn test_register_and_activate<S: TimerStorage>() {
        let mut queue: TimerQueue<S> = TimerQueue::new();
        assert_eq!(queue.activate(), Err(QueueError::Empty));
        assert_eq!(queue.current_top_time(), None);

        for interval in [16, 33, 50] {
            queue.register_timer(interval, interval).unwrap();
        }
        check_index(&queue);
        assert_eq!(queue.current_top_time(), Some(16));

        // 16 fires and moves to 32, which now precedes 33
        assert_eq!(queue.activate(), Ok(1));
        assert_eq!(queue.current_top_time(), Some(32));
        check_index(&queue);

        assert_eq!(queue.activate(), Ok(1));
        assert_eq!(queue.current_top_time(), Some(33));
        check_index(&queue);
    }

    fn test_batch_fire<S: TimerStorage>() {
        let mut queue: TimerQueue<S> = TimerQueue::new();
        queue.register_timer(10, 0).unwrap();
        queue.register_timer(20, 0).unwrap();
        queue.register_timer(30, 0).unwrap();
        queue.register_timer(5, 1).unwrap();

        assert_eq!(queue.activate(), Ok(3));
        assert_eq!(queue.current_top_time(), Some(1));
        assert_eq!(queue.activate(), Ok(1));
        assert_eq!(queue.current_top_time(), Some(6));
        check_index(&queue);
    }

    fn test_unregister<S: TimerStorage>() {
        let mut queue: TimerQueue<S> = TimerQueue::new();
        let ids: Vec<_> = (1..=20)
            .map(|i| queue.register_timer(i * 7, (i * 13) % 11).unwrap())
            .collect();

        for &id in ids.iter().step_by(2) {
            let record = queue.unregister_timer(id).unwrap();
            assert_eq!(record.id, id);
            assert!(!queue.contains(id));
            check_index(&queue);
        }
        assert_eq!(queue.len(), 10);
        assert_eq!(
            queue.unregister_timer(ids[0]),
            Err(QueueError::UnknownTimer(ids[0]))
        );
        assert_eq!(queue.get(ids[1]).map(|t| t.interval), Some(14));
    }

    #[test]
    fn test_register_and_activate_inline() {
        test_register_and_activate::<TimerRecord>();
    }

    #[test]
    fn test_register_and_activate_boxed() {
        test_register_and_activate::<Box<TimerRecord>>();
    }

    #[test]
    fn test_batch_fire_inline() {
        test_batch_fire::<TimerRecord>();
    }

    #[test]
    fn test_batch_fire_boxed() {
        test_batch_fire::<Box<TimerRecord>>();
    }

    #[test]
    fn test_unregister_inline() {
        test_unregister::<TimerRecord>();
    }

    #[test]
    fn test_unregister_boxed() {
        test_unregister::<Box<TimerRecord>>();
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut queue: TimerQueue = TimerQueue::new();
        assert_eq!(queue.register_timer(0, 0), Err(QueueError::ZeroInterval));
        assert!(queue.is_empty());
        // A rejected registration does not consume an id
        assert_eq!(queue.register_timer(1, 0), Ok(0));
    }

    fn test_due_overflow<S: TimerStorage>() {
        let mut queue: TimerQueue<S> = TimerQueue::new();
        assert_eq!(
            queue.register_timer(10, u64::MAX - 5),
            Err(QueueError::DueOverflow {
                due: u64::MAX - 5,
                interval: 10
            })
        );
        assert!(queue.is_empty());

        let half = u64::MAX / 2;
        let a = queue.register_timer(half + 10, 0).unwrap();
        let b = queue.register_timer(half + 20, 0).unwrap();
        assert_eq!(queue.activate(), Ok(2));
        assert_eq!(queue.current_top_time(), Some(half + 10));

        // a would move past u64::MAX: nothing changes
        assert_eq!(
            queue.activate(),
            Err(QueueError::DueOverflow {
                due: half + 10,
                interval: half + 10
            })
        );
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.get(a).map(|t| t.due), Some(half + 10));
        assert_eq!(queue.get(b).map(|t| t.due), Some(half + 20));
        check_index(&queue);

        // Still fully usable by identity
        assert_eq!(queue.unregister_timer(a).map(|t| t.id), Ok(a));
        assert_eq!(queue.current_top_time(), Some(half + 20));
        check_index(&queue);
    }

    #[test]
    fn test_due_overflow_inline() {
        test_due_overflow::<TimerRecord>();
    }

    #[test]
    fn test_due_overflow_boxed() {
        test_due_overflow::<Box<TimerRecord>>();
    }

    #[test]
    fn test_advance_is_checked() {
        let mut record = TimerRecord::new(0, 7, 3);
        assert_eq!(record.advance(), Ok(()));
        assert_eq!(record.due, 10);

        let mut record = TimerRecord::new(1, 2, u64::MAX - 1);
        assert!(record.advance().is_err());
        assert_eq!(record.due, u64::MAX - 1);
    }

    #[test]
    fn test_reschedule_both_directions() {
        let mut queue: TimerQueue = TimerQueue::new();
        for i in 0..10 {
            queue.register_timer(100, i * 10).unwrap();
        }

        queue.reschedule(9, 1).unwrap();
        check_index(&queue);
        assert_eq!(queue.current_top_time(), Some(0));

        queue.reschedule(0, 500).unwrap();
        check_index(&queue);
        assert_eq!(queue.peek().map(|t| t.id), Some(9));

        assert_eq!(queue.reschedule(42, 0), Err(QueueError::UnknownTimer(42)));
    }

    #[test]
    fn test_clear_keeps_id_sequence() {
        let mut queue: BoxedTimerQueue = TimerQueue::new();
        queue.register_timer(1, 0).unwrap();
        queue.register_timer(2, 0).unwrap();
        queue.clear();
        assert!(queue.is_empty());
        assert!(!queue.contains(0));
        assert_eq!(queue.register_timer(3, 0), Ok(2));
        check_index(&queue);
    }
}
