use std::collections::BTreeMap;

use crate::{
    foundation::core::Millis,
    runtime::host::{EventHost, EventKind, ListenerId, TimerHost, TimerId, TimerTarget},
};

#[derive(Clone, Copy, Debug)]
struct PendingTimer {
    due: Millis,
    period: Option<Millis>,
}

/// Deterministic, manually advanced timer and event host.
///
/// Time only moves when the caller advances it. Timers due at the same instant fire in the order
/// they were scheduled.
#[derive(Debug, Default)]
pub struct VirtualHost {
    now: Millis,
    next_id: u64,
    timers: BTreeMap<TimerId, PendingTimer>,
    listeners: BTreeMap<ListenerId, EventKind>,
}

impl VirtualHost {
    /// Clock at zero, nothing scheduled.
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Earliest pending deadline, if any.
    pub fn next_due(&self) -> Option<Millis> {
        self.timers.values().map(|t| t.due).min()
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to its deadline.
    ///
    /// Intervals are re-armed one period later; one-shot timers are removed.
    pub fn pop_due(&mut self, until: Millis) -> Option<TimerId> {
        let (id, timer) = self
            .timers
            .iter()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(id, t)| (t.due, **id))
            .map(|(id, t)| (*id, *t))?;

        self.now = self.now.max(timer.due);
        match timer.period {
            Some(period) => {
                if let Some(t) = self.timers.get_mut(&id) {
                    t.due = timer.due.saturating_add(period);
                }
            }
            None => {
                self.timers.remove(&id);
            }
        }
        Some(id)
    }

    /// Deliver every timer due up to `until` to `target`, then leave the clock at `until`.
    ///
    /// Timers scheduled by the target while handling a callback fire in the same pass if they
    /// fall inside the window.
    pub fn run_until(&mut self, until: Millis, target: &mut dyn TimerTarget) -> usize {
        let mut fired = 0usize;
        while let Some(id) = self.pop_due(until) {
            target.on_timer(id, self);
            fired += 1;
        }
        self.advance_to(until);
        fired
    }

    /// Move the clock forward without firing anything. Never moves backwards.
    pub fn advance_to(&mut self, t: Millis) {
        self.now = self.now.max(t);
    }

    /// Timers not yet fired or cleared; intervals count once.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Live listeners of every kind.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Whether anything listens to `kind`.
    pub fn is_listening(&self, kind: EventKind) -> bool {
        self.listeners.values().any(|k| *k == kind)
    }
}

impl TimerHost for VirtualHost {
    fn now(&self) -> Millis {
        self.now
    }

    fn set_timeout(&mut self, delay: Millis) -> TimerId {
        let id = TimerId(self.alloc_id());
        self.timers.insert(
            id,
            PendingTimer {
                due: self.now.saturating_add(delay),
                period: None,
            },
        );
        id
    }

    fn set_interval(&mut self, period: Millis) -> TimerId {
        let period = period.max(Millis(1));
        let id = TimerId(self.alloc_id());
        self.timers.insert(
            id,
            PendingTimer {
                due: self.now.saturating_add(period),
                period: Some(period),
            },
        );
        id
    }

    fn clear_timer(&mut self, id: TimerId) {
        self.timers.remove(&id);
    }
}

impl EventHost for VirtualHost {
    fn listen(&mut self, kind: EventKind) -> ListenerId {
        let id = ListenerId(self.alloc_id());
        self.listeners.insert(id, kind);
        id
    }

    fn unlisten(&mut self, id: ListenerId) {
        self.listeners.remove(&id);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/virtual_host.rs"]
mod tests;
