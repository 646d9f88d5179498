//! Common traits for timer queues
//!
//! [`TimerQueueBackend`] is the four-operation surface every timer queue in
//! this crate exposes: register, unregister, activate, and look at the next
//! due time. The tracked-heap [`TimerQueue`](crate::timer::TimerQueue) is the
//! main implementation; the ones in [`backends`](crate::backends) exist so the
//! same workload can be run against simpler data structures and compared.

use crate::timer::{TimerId, TimerRecord};
use std::fmt;

/// Error type for timer queue operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// A timer must have a non-zero interval, otherwise activating it would
    /// never move it past the current due time
    ZeroInterval,
    /// No timer with this id is registered
    UnknownTimer(TimerId),
    /// The queue holds no timers
    Empty,
    /// Advancing a timer by its interval would overflow the time range
    DueOverflow { due: u64, interval: u64 },
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::ZeroInterval => write!(f, "timer interval must be greater than zero"),
            QueueError::UnknownTimer(id) => write!(f, "no timer registered with id {}", id),
            QueueError::Empty => write!(f, "timer queue is empty"),
            QueueError::DueOverflow { due, interval } => {
                write!(f, "due time {} plus interval {} overflows", due, interval)
            }
        }
    }
}

impl std::error::Error for QueueError {}

/// Base trait for timer queues
///
/// # Example
///
/// ```rust
/// use rust_tracked_heap::TimerQueueBackend;
/// use rust_tracked_heap::timer::TimerQueue;
///
/// let mut queue: TimerQueue = TimerQueue::new();
/// let fast = queue.register_timer(10, 0).unwrap();
/// queue.register_timer(25, 0).unwrap();
///
/// // Both are due at 0
/// assert_eq!(queue.activate(), Ok(2));
/// assert_eq!(queue.current_top_time(), Some(10));
///
/// queue.unregister_timer(fast).unwrap();
/// assert_eq!(queue.current_top_time(), Some(25));
/// ```
pub trait TimerQueueBackend {
    /// Creates an empty queue
    fn new() -> Self;

    /// Number of registered timers
    fn len(&self) -> usize;

    /// Returns true if no timer is registered
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registers a timer firing every `interval`, first due at `current`
    ///
    /// Ids are handed out sequentially starting at 0.
    ///
    /// # Errors
    /// Returns [`QueueError::ZeroInterval`] if `interval` is zero, and
    /// [`QueueError::DueOverflow`] if the timer could never fire even once
    /// without its next due time overflowing.
    fn register_timer(&mut self, interval: u64, current: u64) -> Result<TimerId, QueueError>;

    /// Removes the timer with the given id, returning its record
    ///
    /// # Errors
    /// Returns [`QueueError::UnknownTimer`] if no such timer is registered.
    fn unregister_timer(&mut self, id: TimerId) -> Result<TimerRecord, QueueError>;

    /// Fires every timer sharing the earliest due time
    ///
    /// Each fired timer is rescheduled one interval later. Returns how many
    /// timers fired.
    ///
    /// # Errors
    /// Returns [`QueueError::Empty`] if no timer is registered, and
    /// [`QueueError::DueOverflow`] if a due timer cannot be advanced. The
    /// overflowing timer is left untouched at the top; timers fired before it
    /// in the same call stay advanced.
    fn activate(&mut self) -> Result<usize, QueueError>;

    /// The earliest due time, or `None` if the queue is empty
    fn current_top_time(&self) -> Option<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            QueueError::ZeroInterval.to_string(),
            "timer interval must be greater than zero"
        );
        assert_eq!(
            QueueError::UnknownTimer(7).to_string(),
            "no timer registered with id 7"
        );
        assert_eq!(QueueError::Empty.to_string(), "timer queue is empty");
        assert_eq!(
            QueueError::DueOverflow {
                due: u64::MAX,
                interval: 1
            }
            .to_string(),
            "due time 18446744073709551615 plus interval 1 overflows"
        );
    }
}
