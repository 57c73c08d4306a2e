//! Timer queue
//!
//! Holds one-shot and repeating timers against an external time source.
//! Nothing here sleeps: the owner asks for the next deadline, wakes up when
//! it likes, and pops every timer that has come due.

use slotmap::{new_key_type, SlotMap};
use std::time::Duration;

new_key_type! {
    /// Handle to a scheduled timer
    pub struct TimerId;
}

/// A scheduled timer
#[derive(Debug)]
struct TimerEntry<T> {
    due: Duration,
    /// Re-arm interval for repeating timers
    period: Option<Duration>,
    /// Insertion order, breaks ties between timers due at the same instant
    seq: u64,
    task: T,
}

/// Queue of pending timers, each carrying a task value
#[derive(Debug)]
pub struct TimerQueue<T> {
    timers: SlotMap<TimerId, TimerEntry<T>>,
    next_seq: u64,
}

impl<T: Clone> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            next_seq: 0,
        }
    }

    /// Schedule `task` to fire once, `delay` after `now`
    pub fn schedule(&mut self, now: Duration, delay: Duration, task: T) -> TimerId {
        self.insert(now + delay, None, task)
    }

    /// Schedule `task` to fire every `period`, first at `now + period`
    pub fn schedule_repeating(&mut self, now: Duration, period: Duration, task: T) -> TimerId {
        // A zero period would re-fire forever inside a single pop loop
        let period = period.max(Duration::from_millis(1));
        self.insert(now + period, Some(period), task)
    }

    /// Cancel a timer. Returns its task if it was still pending.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        self.timers.remove(id).map(|entry| entry.task)
    }

    /// Check whether a timer is still pending
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Deadline of a pending timer
    pub fn deadline(&self, id: TimerId) -> Option<Duration> {
        self.timers.get(id).map(|entry| entry.due)
    }

    /// Earliest deadline across all pending timers
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.values().map(|entry| entry.due).min()
    }

    /// Pop the earliest timer due at or before `now`.
    ///
    /// One-shot timers are removed. Repeating timers keep their id and are
    /// re-armed at the first period boundary after `now`, so a late pump runs
    /// them once rather than once per missed period.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerId, T)> {
        let (id, _) = self
            .timers
            .iter()
            .filter(|(_, entry)| entry.due <= now)
            .min_by_key(|(_, entry)| (entry.due, entry.seq))?;

        let seq = self.bump_seq();
        let entry = self.timers.get_mut(id)?;
        match entry.period {
            Some(period) => {
                let elapsed = now.saturating_sub(entry.due).as_nanos();
                let periods = elapsed / period.as_nanos() + 1;
                let step = period.saturating_mul(u32::try_from(periods).unwrap_or(u32::MAX));
                entry.due = entry.due.saturating_add(step);
                entry.seq = seq;
                Some((id, entry.task.clone()))
            }
            None => self.timers.remove(id).map(|entry| (id, entry.task)),
        }
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    /// Number of pending timers
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Check if no timers are pending
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    fn insert(&mut self, due: Duration, period: Option<Duration>, task: T) -> TimerId {
        let seq = self.bump_seq();
        self.timers.insert(TimerEntry {
            due,
            period,
            seq,
            task,
        })
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

impl<T: Clone> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
