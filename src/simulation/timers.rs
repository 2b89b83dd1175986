//! Scheduled timers on the simulated clock
//!
//! A timer is a deadline plus what should happen when it passes. Nothing
//! blocks; the session pops due timers once per tick. Handlers re-check that
//! their target still exists before acting.

use crate::core::types::{ItemId, SimTime, TimerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Ingredient left in a divider slot for too long
    DividerExpiry { item: ItemId, slot: usize },
    /// Completed meal nobody picked up
    MealPickup { item: ItemId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTimer {
    pub id: TimerId,
    pub due: SimTime,
    pub kind: TimerKind,
}

#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    timers: Vec<ScheduledTimer>,
    next_id: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: SimTime, kind: TimerKind) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(ScheduledTimer { id, due, kind });
        id
    }

    /// Remove a pending timer. False if it already fired or never existed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Take every timer due at or before `now`, earliest first
    pub fn pop_due(&mut self, now: SimTime) -> Vec<ScheduledTimer> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.timers.drain(..).partition(|t| t.due <= now);
        self.timers = pending;
        due.sort_by_key(|t| (t.due, t.id));
        due
    }

    pub fn remaining(&self, id: TimerId, now: SimTime) -> Option<SimTime> {
        self.timers
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.due.saturating_sub(now))
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }
}
