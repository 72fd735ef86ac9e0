#![forbid(unsafe_code)]

//! Deduplicated one-shot work scheduling.
//!
//! Expensive passes (filling the viewport, resetting scroll direction) are
//! requested far more often than they need to run: every scroll event and
//! every measured item asks for one. [`Scheduler`] coalesces those requests
//! into at most one pending entry per task and hands them back in the order
//! they were first requested. The owner drains it once per idle tick.
//!
//! # Invariants
//!
//! 1. A task value appears at most once in the pending set.
//! 2. Re-scheduling a pending task returns its original handle and keeps its
//!    original position.
//! 3. [`Scheduler::take_pending`] empties the set; tasks scheduled while the
//!    caller processes the drained batch land in the next batch.
//! 4. Handles are never reused within one scheduler.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Cancel an unknown or already-run handle | Returns `false`, no-op |
//! | Schedule after drain | New handle, new FIFO position |

use std::collections::VecDeque;

/// Opaque token for a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduleHandle(u64);

impl ScheduleHandle {
    /// Raw numeric id, for logging.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Owned FIFO of distinct pending tasks.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    pending: VecDeque<(ScheduleHandle, T)>,
    next_id: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            pending: VecDeque::new(),
            next_id: 1,
        }
    }
}

impl<T: Copy + Eq> Scheduler<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request `task`. Returns the existing handle if it is already pending.
    pub fn schedule(&mut self, task: T) -> ScheduleHandle {
        if let Some((handle, _)) = self.pending.iter().find(|(_, t)| *t == task) {
            return *handle;
        }
        let handle = ScheduleHandle(self.next_id);
        self.next_id += 1;
        self.pending.push_back((handle, task));
        handle
    }

    /// Drop a pending task. Returns whether anything was removed.
    pub fn cancel(&mut self, handle: ScheduleHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(h, _)| *h != handle);
        self.pending.len() != before
    }

    #[must_use]
    pub fn is_pending(&self, handle: ScheduleHandle) -> bool {
        self.pending.iter().any(|(h, _)| *h == handle)
    }

    #[must_use]
    pub fn is_task_pending(&self, task: T) -> bool {
        self.pending.iter().any(|(_, t)| *t == task)
    }

    /// Drain every pending task in scheduling order.
    pub fn take_pending(&mut self) -> Vec<T> {
        self.pending.drain(..).map(|(_, task)| task).collect()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
