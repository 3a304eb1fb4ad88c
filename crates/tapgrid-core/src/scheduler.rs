//! Virtual-time action queue driving the round timer, spawns and expiries.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::target::TargetId;

/// Work the engine performs when a scheduled time is reached.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScheduledAction {
    /// One second of the round timer elapsed.
    RoundTick,
    /// Spawn cadence fired.
    Spawn,
    /// A target's lifetime ended.
    Expire(TargetId),
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Entry {
    fire_at: u64,
    seq: u64,
    action: ScheduledAction,
}

/// Min-heap of `{fire_at, action}` entries.
///
/// Entries with the same fire time come out in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `action` to fire at `fire_at` (engine clock, ms).
    pub fn schedule(&mut self, fire_at: u64, action: ScheduledAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Entry {
            fire_at,
            seq,
            action,
        }));
    }

    /// Pops the earliest action due at or before `now`.
    pub fn pop_due(&mut self, now: u64) -> Option<(u64, ScheduledAction)> {
        let Reverse(head) = self.queue.peek()?;
        if head.fire_at > now {
            return None;
        }
        self.queue.pop().map(|Reverse(entry)| (entry.fire_at, entry.action))
    }

    /// Drops every queued action.
    pub fn cancel_all(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
