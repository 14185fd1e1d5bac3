use super::*;
use crate::trace::event::NodeKind;

fn located(name: &str, line: usize) -> Arc<Node> {
    Arc::new(
        Node::new(NodeKind::Element)
            .named(name)
            .at(SourceLocation::new(line).with_offset(1)),
    )
}

#[test]
fn markers_round_trip_inside_generated_lines() {
    let marker = debug_marker(DebugId(42));
    assert_eq!(marker, "/*@debug:42*/");
    assert_eq!(parse_marker(&format!("echo 1; {marker} echo 2;")), Some(DebugId(42)));
    assert_eq!(
        parse_marker("/*@debug:1*/ a /*@debug:2*/ b"),
        Some(DebugId(2))
    );
    assert_eq!(parse_marker("no marker here"), None);
    assert_eq!(parse_marker("/*@debug:oops*/"), None);
}

#[test]
fn register_and_fire_counts_per_id() {
    let mut registry = DebugRegistry::new();
    let a = registry.register(located("div", 1));
    let b = registry.register(located("p", 2));
    assert_ne!(a, b);

    for _ in 0..3 {
        registry.mark_fired(a);
    }
    let fired = registry.mark_fired(b).unwrap();
    assert_eq!(fired.name.as_deref(), Some("p"));
    assert_eq!(registry.firings(a), 3);
    assert_eq!(registry.firings(b), 1);
    assert_eq!(registry.last_fired(), Some(b));
    assert!(registry.mark_fired(DebugId(99)).is_none());
    assert_eq!(registry.last_fired(), Some(b));
}

#[test]
fn resolves_generated_lines_to_nearest_marker_above() {
    let mut registry = DebugRegistry::new();
    let div = registry.register(located("div", 1));
    let p = registry.register(located("p", 3));
    let generated = format!(
        "{}\nopen div\n{}\nvalue = 12 / 0\nclose",
        debug_marker(div),
        debug_marker(p)
    );
    assert_eq!(
        registry.resolve_generated_line(&generated, 2),
        Some(SourceLocation::new(1).with_offset(1))
    );
    assert_eq!(
        registry.resolve_generated_line(&generated, 4),
        Some(SourceLocation::new(3).with_offset(1))
    );
    assert_eq!(registry.resolve_generated_line("plain\ncode", 2), None);
}

#[test]
fn collect_drops_entries_but_keeps_ids_unique() {
    let mut registry = DebugRegistry::new();
    let first = registry.register(located("div", 1));
    registry.mark_fired(first);
    registry.collect();
    assert!(registry.is_empty());
    assert_eq!(registry.last_fired(), None);
    assert_eq!(registry.location(first), None);

    let second = registry.register(located("div", 1));
    assert_ne!(first, second);
    assert_eq!(registry.len(), 1);
}

#[test]
fn noop_hook_accepts_everything() {
    let mut hook = NoopHook;
    assert!(hook.fire(DebugId(0)).is_ok());
}
