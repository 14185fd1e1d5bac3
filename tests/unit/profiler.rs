use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::foundation::core::SourceLocation;
use crate::trace::event::{Link, Node, NodeKind};

fn profiler() -> Profiler {
    Profiler::new(Budget::UNLIMITED, ProfilerOptions::default())
}

#[test]
fn options_defaults() {
    let options = ProfilerOptions::default();
    assert_eq!(options.time_precision, 3);
    assert_eq!(options.line_height, 30);
    assert!(options.display);
    assert_eq!(options.log, None);
    assert!(options.muted.is_empty());

    let parsed: ProfilerOptions =
        serde_json::from_str(r#"{"line_height": 12, "muted": ["state_enter"]}"#).unwrap();
    assert_eq!(parsed.line_height, 12);
    assert_eq!(parsed.muted, [Topic::StateEnter]);
    assert_eq!(parsed.time_precision, 3);
}

#[test]
fn firing_a_marker_records_a_display_event() {
    let mut profiler = profiler();
    let node = Arc::new(
        Node::new(NodeKind::Element)
            .named("div")
            .at(SourceLocation::new(4)),
    );
    let id = profiler.registry_mut().register(Arc::clone(&node));
    profiler.fire(id).unwrap();

    let event = &profiler.events()[0];
    assert_eq!(event.topic, Topic::Display);
    assert_eq!(event.params.get("debug_id"), Some(&serde_json::json!(id.0)));
    assert!(matches!(&event.link, Link::Node(n) if Arc::ptr_eq(n, &node)));
    assert_eq!(event.location, Some(SourceLocation::new(4)));
    assert_eq!(profiler.registry().firings(id), 1);
}

#[test]
fn firing_an_unknown_id_records_nothing() {
    let mut profiler = profiler();
    profiler.fire(DebugId(1234)).unwrap();
    assert!(profiler.events().is_empty());
}

#[test]
fn kill_is_idempotent_and_stops_recording() {
    let mut profiler = profiler();
    profiler.emit(PhaseEvent::new(Topic::Render)).unwrap();
    profiler.kill();
    profiler.kill();
    assert!(profiler.is_locked());
    profiler.emit(PhaseEvent::new(Topic::Lex)).unwrap();
    assert_eq!(profiler.events().len(), 1);
}

#[test]
fn reset_starts_a_fresh_trace() {
    let mut profiler = profiler();
    profiler.emit(PhaseEvent::new(Topic::Render)).unwrap();
    std::thread::sleep(Duration::from_millis(30));
    profiler.kill();

    profiler.reset();
    assert!(!profiler.is_locked());
    assert!(profiler.events().is_empty());
    profiler.emit(PhaseEvent::new(Topic::Render)).unwrap();
    let first = &profiler.events()[0];
    assert_eq!(first.id.0, 0);
    assert!(first.timestamp < 0.03);
}

#[test]
fn budget_violation_locks_the_trace() {
    let mut profiler = profiler();
    profiler.emit(PhaseEvent::new(Topic::Render)).unwrap();
    profiler.set_budget(Budget {
        max_duration_ms: 1,
        max_memory_bytes: -1,
    });
    std::thread::sleep(Duration::from_millis(5));

    let err = profiler.emit(PhaseEvent::new(Topic::Lex)).unwrap_err();
    assert_eq!(err.to_string(), "execution_max_time of 1ms exceeded.");
    assert!(profiler.is_locked());
    assert_eq!(profiler.events().len(), 1);

    assert!(profiler.emit(PhaseEvent::new(Topic::Html)).is_ok());
    assert_eq!(profiler.events().len(), 1);
}

#[test]
fn memory_budget_uses_the_probe() {
    let memory = Rc::new(Cell::new(0_i64));
    let reading = Rc::clone(&memory);
    let mut profiler = Profiler::new(
        Budget {
            max_duration_ms: -1,
            max_memory_bytes: 64,
        },
        ProfilerOptions::default(),
    )
    .with_memory_probe(move || reading.get());

    profiler.emit(PhaseEvent::new(Topic::Render)).unwrap();
    memory.set(65);
    let err = profiler.emit(PhaseEvent::new(Topic::Lex)).unwrap_err();
    assert_eq!(err.to_string(), "memory_limit of 64B exceeded.");
}

#[test]
fn muted_topics_are_dropped_and_can_be_unmuted() {
    let mut profiler = Profiler::new(
        Budget::UNLIMITED,
        ProfilerOptions {
            muted: vec![Topic::StateEnter],
            ..ProfilerOptions::default()
        },
    );
    profiler.emit(PhaseEvent::new(Topic::StateEnter)).unwrap();
    assert!(profiler.events().is_empty());

    profiler.set_options(ProfilerOptions::default());
    profiler.emit(PhaseEvent::new(Topic::StateEnter)).unwrap();
    assert_eq!(profiler.events().len(), 1);
}

#[test]
fn profile_kills_the_trace() {
    let mut profiler = profiler();
    profiler.emit(PhaseEvent::new(Topic::Render)).unwrap();
    profiler.emit(PhaseEvent::new(Topic::Html)).unwrap();
    let profile = profiler.profile();
    assert!(profiler.is_locked());
    assert_eq!(profile.processes.len(), 1);
    assert_eq!(profile.processes[0].label, "rendering");
}

#[test]
fn publish_prepends_report_when_displayed() {
    let mut profiler = profiler();
    profiler.emit(PhaseEvent::new(Topic::Render)).unwrap();
    let out = profiler.publish("<p>hi</p>".to_string());
    assert!(out.starts_with("<div class=\"renderscope-profile\""));
    assert!(out.ends_with("<p>hi</p>"));
}

#[test]
fn publish_writes_log_file_without_display() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("profile.html");
    let mut profiler = Profiler::new(
        Budget::UNLIMITED,
        ProfilerOptions {
            display: false,
            log: Some(log.clone()),
            ..ProfilerOptions::default()
        },
    );
    profiler.emit(PhaseEvent::new(Topic::Render)).unwrap();
    let out = profiler.publish("<p>hi</p>".to_string());
    assert_eq!(out, "<p>hi</p>");
    let written = std::fs::read_to_string(&log).unwrap();
    assert!(written.contains("renderscope-process"));
}

#[test]
fn unwritable_log_file_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut profiler = Profiler::new(
        Budget::UNLIMITED,
        ProfilerOptions {
            log: Some(dir.path().join("missing").join("profile.html")),
            ..ProfilerOptions::default()
        },
    );
    profiler.emit(PhaseEvent::new(Topic::Render)).unwrap();
    let out = profiler.publish(String::new());
    assert!(out.contains("renderscope-profile"));
}

#[test]
fn custom_dump_shows_in_report() {
    let mut profiler = profiler();
    profiler.set_dump_event(|event| format!("custom-{}", event.topic.name()));
    profiler.emit(PhaseEvent::new(Topic::Render)).unwrap();
    let html = profiler.render_report();
    assert!(html.contains("custom-renderer.render"));
}
