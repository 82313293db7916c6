//! Window timers.
//!
//! Time is driven from outside through `Window::advance`, so timers only
//! fire from there and tests can step the clock deterministically.

use std::collections::BTreeMap;

use crate::tree::WidgetId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy)]
struct TimerEntry {
    owner: WidgetId,
    interval: u64,
    next: u64,
}

/// Periodic timers keyed by id, each owned by a widget.
#[derive(Debug, Default)]
pub struct Timers {
    entries: BTreeMap<TimerId, TimerEntry>,
    next_id: u64,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a periodic timer firing every `interval_ms` from `now`.
    pub fn add(&mut self, owner: WidgetId, interval_ms: u64, now: u64) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let interval = interval_ms.max(1);
        self.entries.insert(
            id,
            TimerEntry {
                owner,
                interval,
                next: now + interval,
            },
        );
        log::trace!("timer {:?} armed every {}ms for {:?}", id, interval, owner);
        id
    }

    pub fn remove(&mut self, id: TimerId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn owner(&self, id: TimerId) -> Option<WidgetId> {
        self.entries.get(&id).map(|e| e.owner)
    }

    pub fn remove_owned_by(&mut self, owner: WidgetId) {
        self.entries.retain(|_, e| e.owner != owner);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.values().map(|e| e.next).min()
    }

    /// Timers due at `now`, oldest deadline first. Each is re-armed one
    /// interval after `now`, so a long gap fires a timer once, not once per
    /// missed period.
    pub fn due(&mut self, now: u64) -> Vec<(TimerId, WidgetId)> {
        let mut due: Vec<(u64, TimerId, WidgetId)> = self
            .entries
            .iter()
            .filter(|(_, e)| e.next <= now)
            .map(|(&id, e)| (e.next, id, e.owner))
            .collect();
        due.sort_by_key(|&(next, id, _)| (next, id));
        for (_, id, _) in &due {
            if let Some(entry) = self.entries.get_mut(id) {
                entry.next = now + entry.interval;
            }
        }
        due.into_iter().map(|(_, id, owner)| (id, owner)).collect()
    }
}
