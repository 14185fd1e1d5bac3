use super::*;
use crate::trace::event::{EventId, Link, Params, Topic};

fn event(id: u64, timestamp: f64) -> Event {
    Event {
        id: EventId(id),
        topic: Topic::Render,
        timestamp,
        params: Params::new(),
        link: Link::Event(EventId(id)),
        location: None,
    }
}

#[test]
fn appends_until_locked() {
    let mut log = EventLog::new();
    assert!(log.append(event(0, 0.0)));
    assert!(log.append(event(1, 0.1)));
    log.lock();
    assert!(!log.append(event(2, 0.2)));
    assert_eq!(log.len(), 2);
    assert!(log.is_locked());
}

#[test]
fn lock_is_idempotent() {
    let mut log = EventLog::new();
    log.append(event(0, 0.0));
    log.lock();
    log.lock();
    assert!(log.is_locked());
    assert_eq!(log.len(), 1);
}

#[test]
fn clear_empties_and_unlocks() {
    let mut log = EventLog::new();
    log.append(event(0, 0.0));
    log.lock();
    log.clear();
    assert!(log.is_empty());
    assert!(!log.is_locked());
    assert!(log.append(event(0, 0.0)));
    assert_eq!(log.events()[0].id, EventId(0));
}
