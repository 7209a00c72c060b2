//! One-shot timers as explicit, cancellable handles.
//!
//! The engine never owns a clock. Callers pass "now" as a [`Duration`] since
//! mount, and a [`TimerSlot`] fires when polled at or after its deadline.
//! A slot holds at most one pending timer; arming always replaces it.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identifies one arming of a timer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// A timer that has been armed and not yet fired or cancelled.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTimer<T> {
    pub id: TimerId,
    pub due_at: Duration,
    pub payload: T,
}

/// Owner of at most one pending timer.
#[derive(Debug, Clone)]
pub struct TimerSlot<T> {
    pending: Option<PendingTimer<T>>,
    next_id: u64,
}

impl<T> Default for TimerSlot<T> {
    fn default() -> Self {
        Self {
            pending: None,
            next_id: 0,
        }
    }
}

impl<T> TimerSlot<T> {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer firing `delay` after `now`, cancelling any pending one.
    ///
    /// Returns the new timer's id and the payload of the cancelled timer, if any.
    pub fn arm(&mut self, now: Duration, delay: Duration, payload: T) -> (TimerId, Option<T>) {
        let replaced = self.cancel();
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending = Some(PendingTimer {
            id,
            due_at: now.saturating_add(delay),
            payload,
        });
        (id, replaced)
    }

    /// Cancel the pending timer, returning its payload.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|timer| timer.payload)
    }

    /// Fire the pending timer if its deadline has passed.
    pub fn poll(&mut self, now: Duration) -> Option<T> {
        match &self.pending {
            Some(timer) if now >= timer.due_at => self.cancel(),
            _ => None,
        }
    }

    /// Whether a timer is armed and has not fired.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The armed timer, if any.
    pub fn pending(&self) -> Option<&PendingTimer<T>> {
        self.pending.as_ref()
    }
}
