use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{
    foundation::core::SourceLocation, foundation::error::ScopeResult, trace::event::Node,
};

/// Synthetic id correlating a generated-code marker to its template node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct DebugId(pub u64);

const MARKER_OPEN: &str = "/*@debug:";
const MARKER_CLOSE: &str = "*/";

/// Inert comment embedding `id` into generated output.
pub fn debug_marker(id: DebugId) -> String {
    format!("{MARKER_OPEN}{}{MARKER_CLOSE}", id.0)
}

/// Last debug marker found on `line`, if any.
pub fn parse_marker(line: &str) -> Option<DebugId> {
    let start = line.rfind(MARKER_OPEN)? + MARKER_OPEN.len();
    let rest = &line[start..];
    let end = rest.find(MARKER_CLOSE)?;
    rest[..end].trim().parse().ok().map(DebugId)
}

/// Capability handed to the executor; generated output calls it when a marker fires.
pub trait InstrumentationHook {
    /// Marker `id` fired. May fail with a budget violation.
    fn fire(&mut self, id: DebugId) -> ScopeResult<()>;
}

/// Hook that ignores every firing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHook;

impl InstrumentationHook for NoopHook {
    fn fire(&mut self, _id: DebugId) -> ScopeResult<()> {
        Ok(())
    }
}

#[derive(Debug)]
struct DebugEntry {
    node: Arc<Node>,
    firings: u32,
}

/// Debug ids handed out for one profiler, mapped back to their originating nodes.
///
/// A node may fire zero, one or many times at runtime (loops, reused fragments); firings are
/// counted per id and the most recent one is remembered for failure attribution.
#[derive(Debug, Default)]
pub struct DebugRegistry {
    entries: BTreeMap<DebugId, DebugEntry>,
    next_id: u64,
    last_fired: Option<DebugId>,
}

impl DebugRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id for `node`.
    pub fn register(&mut self, node: Arc<Node>) -> DebugId {
        let id = DebugId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, DebugEntry { node, firings: 0 });
        id
    }

    /// Node registered under `id`.
    pub fn node(&self, id: DebugId) -> Option<&Arc<Node>> {
        self.entries.get(&id).map(|e| &e.node)
    }

    /// Record a runtime firing of `id`. Unknown ids are ignored.
    pub fn mark_fired(&mut self, id: DebugId) -> Option<Arc<Node>> {
        let entry = self.entries.get_mut(&id)?;
        entry.firings = entry.firings.saturating_add(1);
        self.last_fired = Some(id);
        Some(Arc::clone(&entry.node))
    }

    /// How many times `id` fired since registration.
    pub fn firings(&self, id: DebugId) -> u32 {
        self.entries.get(&id).map_or(0, |e| e.firings)
    }

    /// Most recent firing still registered.
    pub fn last_fired(&self) -> Option<DebugId> {
        self.last_fired.filter(|id| self.entries.contains_key(id))
    }

    /// Location of the node registered under `id`.
    pub fn location(&self, id: DebugId) -> Option<&SourceLocation> {
        self.node(id).and_then(|n| n.location.as_ref())
    }

    /// Map a 1-based line of `generated` output back to a template location.
    ///
    /// Walks up from `line` to the nearest embedded marker whose node has a location.
    pub fn resolve_generated_line(&self, generated: &str, line: usize) -> Option<SourceLocation> {
        generated
            .lines()
            .take(line)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .filter_map(parse_marker)
            .find_map(|id| self.location(id).cloned())
    }

    /// Drop every entry once the owning trace completed.
    pub fn collect(&mut self) {
        if !self.entries.is_empty() {
            tracing::debug!(entries = self.entries.len(), "DebugRegistry::collect");
        }
        self.entries.clear();
        self.last_fired = None;
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no ids are live.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/trace/debug.rs"]
mod tests;
