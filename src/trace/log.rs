use crate::trace::event::Event;

/// Append-only, lockable event sequence for one trace.
///
/// Once locked, appends are silently dropped until [`EventLog::clear`].
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<Event>,
    locked: bool,
}

impl EventLog {
    /// Empty, unlocked log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `event` unless the log is locked. Returns whether the event was stored.
    pub fn append(&mut self, event: Event) -> bool {
        if self.locked {
            tracing::trace!(topic = event.topic.name(), "EventLog::append: log is locked");
            return false;
        }
        debug_assert!(
            self.events
                .last()
                .is_none_or(|last| last.timestamp <= event.timestamp),
            "events must arrive in timestamp order"
        );
        self.events.push(event);
        true
    }

    /// Lock the log. Idempotent and irreversible short of [`EventLog::clear`].
    pub fn lock(&mut self) {
        if !self.locked {
            tracing::debug!(events = self.events.len(), "EventLog::lock");
        }
        self.locked = true;
    }

    /// Whether appends are currently dropped.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Drop every event and unlock. Callers pair this with a baseline reset.
    pub fn clear(&mut self) {
        self.events.clear();
        self.locked = false;
    }

    /// Recorded events in arrival order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/trace/log.rs"]
mod tests;
