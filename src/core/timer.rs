/// Single-slot timers driven by host time.
///
/// Scheduling replaces whatever the slot held, so a superseded or cancelled
/// timer can never fire.

use crate::core::bridge::Millis;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pending<T> {
    deadline: Millis,
    payload: T,
}

#[derive(Debug, Clone)]
pub struct TimerSlot<T> {
    pending: Option<Pending<T>>,
}

impl<T> Default for TimerSlot<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> TimerSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the slot, superseding any pending timer.
    pub fn schedule(&mut self, now: Millis, delay: Millis, payload: T) {
        self.pending = Some(Pending {
            deadline: now.saturating_add(delay),
            payload,
        });
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Millis> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    pub fn payload(&self) -> Option<&T> {
        self.pending.as_ref().map(|p| &p.payload)
    }

    /// Take the payload if the deadline has passed.
    pub fn fire_due(&mut self, now: Millis) -> Option<T> {
        if self.pending.as_ref().is_some_and(|p| p.deadline <= now) {
            self.pending.take().map(|p| p.payload)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_at_deadline() {
        let mut slot = TimerSlot::new();
        slot.schedule(100, 140, "x");
        assert_eq!(slot.fire_due(239), None);
        assert_eq!(slot.fire_due(240), Some("x"));
        assert_eq!(slot.fire_due(500), None);
    }

    #[test]
    fn reschedule_supersedes() {
        let mut slot = TimerSlot::new();
        slot.schedule(0, 140, "a");
        slot.schedule(50, 140, "b");
        assert_eq!(slot.payload(), Some(&"b"));
        assert_eq!(slot.fire_due(140), None);
        assert_eq!(slot.fire_due(190), Some("b"));
    }

    #[test]
    fn cancel_prevents_firing() {
        let mut slot = TimerSlot::new();
        slot.schedule(0, 10, ());
        slot.cancel();
        assert!(!slot.is_pending());
        assert_eq!(slot.fire_due(1_000), None);
    }
}
