use std::sync::Arc;

use super::*;
use crate::foundation::core::SourceLocation;
use crate::trace::event::{LinkKey, Node, NodeKind, Token, TokenKind};
use crate::trace::guard::Budget;

fn unlimited_guard() -> ResourceGuard {
    ResourceGuard::new(Budget::UNLIMITED, Box::new(|| 0_i64))
}

#[test]
fn subject_topics_link_their_entity() {
    let mut bus = EventBus::new();
    let token = Arc::new(Token::new(TokenKind::Tag).named("div").at(SourceLocation::new(1)));
    let event = bus
        .enrich(PhaseEvent::new(Topic::Token).token(&token), 0.0)
        .unwrap();
    assert!(matches!(&event.link, Link::Token(t) if Arc::ptr_eq(t, &token)));
    assert_eq!(event.location, Some(SourceLocation::new(1)));
}

#[test]
fn subject_topic_without_entity_links_itself() {
    let mut bus = EventBus::new();
    let event = bus.enrich(PhaseEvent::new(Topic::Node), 0.0).unwrap();
    assert_eq!(event.link.key(), LinkKey::Event(event.id.0));
    assert_eq!(event.location, None);
}

#[test]
fn pipeline_level_topics_link_themselves_even_with_subject() {
    let mut bus = EventBus::new();
    let node = Arc::new(Node::new(NodeKind::Document));
    let event = bus
        .enrich(PhaseEvent::new(Topic::Compile).node(&node), 0.0)
        .unwrap();
    assert!(matches!(event.link, Link::Event(id) if id == event.id));
}

#[test]
fn html_links_the_current_render() {
    let mut bus = EventBus::new();
    let render = bus.enrich(PhaseEvent::new(Topic::Render), 0.0).unwrap();
    bus.enrich(PhaseEvent::new(Topic::Lex), 0.1).unwrap();
    let html = bus.enrich(PhaseEvent::new(Topic::Html), 0.2).unwrap();
    assert_eq!(html.link.key(), LinkKey::Event(render.id.0));
    assert_eq!(html.id, EventId(2));
}

#[test]
fn listener_can_extend_or_veto() {
    let mut bus = EventBus::new();
    bus.on(
        Topic::Token,
        Box::new(|event| {
            event
                .params
                .insert("seen".to_string(), serde_json::json!(true));
            Verdict::Record
        }),
    );
    bus.mute(Topic::StateEnter);

    let token = bus.enrich(PhaseEvent::new(Topic::Token), 0.0).unwrap();
    assert_eq!(token.params.get("seen"), Some(&serde_json::json!(true)));
    assert!(bus.enrich(PhaseEvent::new(Topic::StateEnter), 0.0).is_none());

    bus.clear_listener(Topic::StateEnter);
    assert!(bus.enrich(PhaseEvent::new(Topic::StateEnter), 0.0).is_some());
}

#[test]
fn dispatch_records_through_guard() {
    let mut bus = EventBus::new();
    let mut log = EventLog::new();
    let guard = unlimited_guard();
    bus.dispatch(PhaseEvent::new(Topic::Render), &mut log, &guard)
        .unwrap();
    bus.dispatch(PhaseEvent::new(Topic::Lex), &mut log, &guard)
        .unwrap();
    assert_eq!(log.len(), 2);
    assert!(log.events()[0].timestamp <= log.events()[1].timestamp);
}

#[test]
fn dispatch_short_circuits_on_locked_log() {
    let mut bus = EventBus::new();
    let seen = std::rc::Rc::new(std::cell::Cell::new(0));
    let counter = std::rc::Rc::clone(&seen);
    bus.on(
        Topic::Lex,
        Box::new(move |_| {
            counter.set(counter.get() + 1);
            Verdict::Record
        }),
    );
    let mut log = EventLog::new();
    log.lock();
    let guard = unlimited_guard();
    bus.dispatch(PhaseEvent::new(Topic::Lex), &mut log, &guard)
        .unwrap();
    assert_eq!(seen.get(), 0);
    assert!(log.is_empty());
}

#[test]
fn budget_violation_does_not_record_the_trigger() {
    let mut bus = EventBus::new();
    let mut log = EventLog::new();
    let guard = ResourceGuard::new(
        Budget {
            max_duration_ms: 0,
            max_memory_bytes: -1,
        },
        Box::new(|| 0_i64),
    );
    std::thread::sleep(std::time::Duration::from_millis(2));
    let err = bus
        .dispatch(PhaseEvent::new(Topic::Render), &mut log, &guard)
        .unwrap_err();
    assert!(err.is_budget_exceeded());
    assert!(log.is_locked());
    assert!(log.is_empty());

    bus.dispatch(PhaseEvent::new(Topic::Html), &mut log, &guard)
        .unwrap();
    assert!(log.is_empty());
}

#[test]
fn reset_restarts_ids() {
    let mut bus = EventBus::new();
    bus.enrich(PhaseEvent::new(Topic::Render), 0.0);
    bus.enrich(PhaseEvent::new(Topic::Lex), 0.0);
    bus.reset();
    let event = bus.enrich(PhaseEvent::new(Topic::Html), 0.0).unwrap();
    assert_eq!(event.id, EventId(0));
    assert_eq!(event.link.key(), LinkKey::Event(0));
}
