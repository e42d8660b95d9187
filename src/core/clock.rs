//! Virtual Clock and Timer Scheduler
//!
//! Engines never touch wall time. All countdowns and short delayed callbacks
//! (flip-back, success pause, finish delay) go through this scheduler, which
//! is advanced explicitly by the host. Tests drive it with simulated
//! milliseconds and assert state without real waiting.

use std::collections::BTreeMap;

/// Handle for a scheduled task, usable for cancellation.
pub type TaskId = u64;

/// A virtual-time one-shot timer queue.
///
/// Tasks fire in (due time, insertion order) order, so two tasks due at the
/// same millisecond always fire in the order they were scheduled. The queue
/// never observes wall time; the owner calls [`Scheduler::pop_due`] in a loop
/// (or [`Scheduler::advance`]) to move time forward.
#[derive(Clone, Debug)]
pub struct Scheduler<T> {
    now_ms: u64,
    next_id: TaskId,
    /// Pending tasks, keyed (due, id) for deterministic firing order.
    queue: BTreeMap<(u64, TaskId), T>,
    /// Reverse index for cancellation.
    due_by_id: BTreeMap<TaskId, u64>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    /// Create an empty scheduler at t=0.
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 0,
            queue: BTreeMap::new(),
            due_by_id: BTreeMap::new(),
        }
    }

    /// Current virtual time in milliseconds.
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Number of pending tasks.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Schedule `task` to fire `delay_ms` from now. Returns its handle.
    pub fn schedule(&mut self, delay_ms: u64, task: T) -> TaskId {
        let id = self.next_id;
        self.next_id += 1;
        let due = self.now_ms.saturating_add(delay_ms);
        self.queue.insert((due, id), task);
        self.due_by_id.insert(id, due);
        id
    }

    /// Cancel a pending task. Returns false if it already fired or was
    /// cancelled before.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        if let Some(due) = self.due_by_id.remove(&id) {
            self.queue.remove(&(due, id)).is_some()
        } else {
            false
        }
    }

    /// Cancel every pending task. Called on engine unmount so no delayed
    /// callback can mutate a disposed instance.
    pub fn cancel_all(&mut self) {
        self.queue.clear();
        self.due_by_id.clear();
    }

    /// Pop the earliest task due at or before `target_ms`, advancing the
    /// clock to its due time.
    ///
    /// Returning one task at a time lets the owner process a firing (which
    /// may schedule follow-up tasks relative to the intermediate now) before
    /// later firings in the same advance window are considered. This is how
    /// a repeating 1-second countdown fires five times across a 5-second
    /// advance.
    pub fn pop_due(&mut self, target_ms: u64) -> Option<(TaskId, T)> {
        let (&(due, id), _) = self.queue.iter().next()?;
        if due > target_ms {
            return None;
        }
        let task = self.queue.remove(&(due, id))?;
        self.due_by_id.remove(&id);
        self.now_ms = due;
        Some((id, task))
    }

    /// Move the clock to `target_ms` without firing anything further.
    ///
    /// Callers use this after draining [`Scheduler::pop_due`] so the clock
    /// lands exactly on the advance target.
    pub fn settle(&mut self, target_ms: u64) {
        if target_ms > self.now_ms {
            self.now_ms = target_ms;
        }
    }

    /// Advance by `ms`, collecting every task that fires on the way.
    ///
    /// Convenience for owners that do not interleave scheduling with firing.
    pub fn advance(&mut self, ms: u64) -> Vec<(TaskId, T)> {
        let target = self.now_ms.saturating_add(ms);
        let mut fired = Vec::new();
        while let Some(entry) = self.pop_due(target) {
            fired.push(entry);
        }
        self.settle(target);
        fired
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_due_order() {
        let mut sched = Scheduler::new();
        sched.schedule(300, "c");
        sched.schedule(100, "a");
        sched.schedule(200, "b");

        let fired: Vec<&str> = sched.advance(1000).into_iter().map(|(_, t)| t).collect();
        assert_eq!(fired, vec!["a", "b", "c"]);
        assert_eq!(sched.now_ms(), 1000);
    }

    #[test]
    fn test_same_due_fires_in_schedule_order() {
        let mut sched = Scheduler::new();
        sched.schedule(100, "first");
        sched.schedule(100, "second");

        let fired: Vec<&str> = sched.advance(100).into_iter().map(|(_, t)| t).collect();
        assert_eq!(fired, vec!["first", "second"]);
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let mut sched = Scheduler::new();
        let id = sched.schedule(100, "doomed");
        sched.schedule(200, "kept");

        assert!(sched.cancel(id));
        // Double-cancel reports false
        assert!(!sched.cancel(id));

        let fired: Vec<&str> = sched.advance(500).into_iter().map(|(_, t)| t).collect();
        assert_eq!(fired, vec!["kept"]);
    }

    #[test]
    fn test_pop_due_respects_target() {
        let mut sched = Scheduler::new();
        sched.schedule(100, "early");
        sched.schedule(900, "late");

        assert!(sched.pop_due(500).is_some());
        assert!(sched.pop_due(500).is_none());
        // Clock sits at the last firing until settled
        assert_eq!(sched.now_ms(), 100);
        sched.settle(500);
        assert_eq!(sched.now_ms(), 500);
    }

    #[test]
    fn test_interleaved_rescheduling() {
        // A countdown that re-arms itself fires repeatedly within one window.
        let mut sched = Scheduler::new();
        sched.schedule(1000, ());

        let target = 3500u64;
        let mut ticks = 0;
        while let Some((_, ())) = sched.pop_due(target) {
            ticks += 1;
            sched.schedule(1000, ());
        }
        sched.settle(target);

        assert_eq!(ticks, 3);
        assert_eq!(sched.now_ms(), 3500);
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn test_randomly_inserted_tasks_fire_sorted() {
        use rand::seq::SliceRandom;

        let mut delays: Vec<u64> = (1..=50).map(|i| i * 10).collect();
        delays.shuffle(&mut rand::thread_rng());

        let mut sched = Scheduler::new();
        for d in &delays {
            sched.schedule(*d, *d);
        }

        let fired: Vec<u64> = sched.advance(1_000).into_iter().map(|(_, t)| t).collect();
        let mut sorted = fired.clone();
        sorted.sort_unstable();
        assert_eq!(fired, sorted);
        assert_eq!(fired.len(), 50);
    }

    #[test]
    fn test_cancel_all() {
        let mut sched = Scheduler::new();
        sched.schedule(10, 1);
        sched.schedule(20, 2);
        sched.cancel_all();
        assert_eq!(sched.pending(), 0);
        assert!(sched.advance(100).is_empty());
    }
}
