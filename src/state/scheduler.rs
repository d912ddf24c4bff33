//! Cancellable scheduled callbacks.
//!
//! Timers are data: a key plus a deadline. Owners poll `take_due(now)` from the
//! event loop tick and react to the keys that fired. Dropping or `clear()`ing the
//! scheduler cancels everything, so a component's timers never outlive it.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// A set of pending deadlines keyed by `K`. Scheduling an existing key replaces
/// its deadline.
#[derive(Debug, Clone)]
pub struct Scheduler<K> {
    pending: HashMap<K, Instant>,
}

impl<K> Default for Scheduler<K> {
    fn default() -> Self {
        Self {
            pending: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Copy> Scheduler<K> {
    /// Scheduler with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `key` at `now + delay`, replacing any pending deadline for it.
    pub fn schedule(&mut self, key: K, now: Instant, delay: Duration) {
        self.pending.insert(key, now + delay);
    }

    /// Cancel `key`. Returns whether it was pending.
    pub fn cancel(&mut self, key: K) -> bool {
        self.pending.remove(&key).is_some()
    }

    /// Whether `key` has a deadline.
    pub fn is_pending(&self, key: K) -> bool {
        self.pending.contains_key(&key)
    }

    /// Remove and return every key whose deadline is at or before `now`,
    /// earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<K> {
        let mut due: Vec<(K, Instant)> = self
            .pending
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|(k, at)| (*k, *at))
            .collect();
        due.sort_by_key(|(_, at)| *at);
        for (key, _) in &due {
            self.pending.remove(key);
        }
        due.into_iter().map(|(key, _)| key).collect()
    }

    /// The earliest pending deadline, used to size the event-loop poll timeout.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    /// Cancel all pending timers.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Pending timer count.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Key {
        A,
        B,
    }

    #[test]
    fn nothing_fires_before_deadline() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.schedule(Key::A, t0, Duration::from_millis(100));
        assert!(s.take_due(t0 + Duration::from_millis(99)).is_empty());
        assert_eq!(s.take_due(t0 + Duration::from_millis(100)), vec![Key::A]);
        assert!(s.is_empty());
    }

    #[test]
    fn rescheduling_replaces_deadline() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.schedule(Key::A, t0, Duration::from_millis(100));
        s.schedule(Key::A, t0 + Duration::from_millis(50), Duration::from_millis(100));
        assert!(s.take_due(t0 + Duration::from_millis(120)).is_empty());
        assert_eq!(s.take_due(t0 + Duration::from_millis(150)), vec![Key::A]);
    }

    #[test]
    fn cancel_prevents_firing() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.schedule(Key::A, t0, Duration::from_millis(10));
        assert!(s.cancel(Key::A));
        assert!(!s.cancel(Key::A));
        assert!(s.take_due(t0 + Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn due_keys_are_ordered_by_deadline() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.schedule(Key::B, t0, Duration::from_millis(20));
        s.schedule(Key::A, t0, Duration::from_millis(30));
        assert_eq!(s.next_deadline(), Some(t0 + Duration::from_millis(20)));
        assert_eq!(s.take_due(t0 + Duration::from_secs(1)), vec![Key::B, Key::A]);
    }

    #[test]
    fn clear_cancels_everything() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.schedule(Key::A, t0, Duration::ZERO);
        s.schedule(Key::B, t0, Duration::ZERO);
        s.clear();
        assert!(s.take_due(t0).is_empty());
        assert_eq!(s.next_deadline(), None);
    }
}
