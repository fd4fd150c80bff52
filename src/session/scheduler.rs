//! Debounce timer abstraction
//!
//! The controller never blocks: it asks a [`Scheduler`] for a one-shot timer
//! and the host calls back `SessionController::on_timer` with the id when it
//! fires. Replacing the pending timer cancels the old one.

use std::cell::{Cell, RefCell};
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u64);

pub trait Scheduler {
    /// Arrange a one-shot callback after `delay`
    fn schedule(&self, delay: Duration) -> TimerId;

    /// Best effort; a cancelled timer that still fires is ignored as stale
    fn cancel(&self, id: TimerId);
}

// =============================================================================
// TimerQueue
// =============================================================================

/// Virtual-clock scheduler for native hosts and tests.
///
/// Time only moves through [`TimerQueue::advance`], which returns the timers
/// that came due, in deadline order.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now_ms: Cell<u64>,
    next_id: Cell<u64>,
    pending: RefCell<Vec<(TimerId, u64)>>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Move the clock forward and drain every timer now due
    pub fn advance(&self, ms: u64) -> Vec<TimerId> {
        let now = self.now_ms.get() + ms;
        self.now_ms.set(now);

        let mut pending = self.pending.borrow_mut();
        let mut due: Vec<(TimerId, u64)> = Vec::new();
        pending.retain(|&(id, deadline)| {
            if deadline <= now {
                due.push((id, deadline));
                false
            } else {
                true
            }
        });
        due.sort_by_key(|&(id, deadline)| (deadline, id.0));
        due.into_iter().map(|(id, _)| id).collect()
    }
}

impl Scheduler for TimerQueue {
    fn schedule(&self, delay: Duration) -> TimerId {
        let id = TimerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let deadline = self.now_ms.get() + delay.as_millis() as u64;
        self.pending.borrow_mut().push((id, deadline));
        id
    }

    fn cancel(&self, id: TimerId) {
        self.pending.borrow_mut().retain(|&(pending, _)| pending != id);
    }
}
