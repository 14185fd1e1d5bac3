use std::path::PathBuf;

use tracing::{debug, warn};

use crate::{
    foundation::alloc_track::{ALLOC_TRACKING, AllocProbe, MemoryProbe},
    foundation::error::ScopeResult,
    timeline::builder::{EventDump, Profile, TimelineBuilder},
    timeline::report::render_report,
    trace::bus::EventBus,
    trace::debug::{DebugId, DebugRegistry, InstrumentationHook},
    trace::event::{Event, PhaseEvent, Topic},
    trace::guard::{Budget, ResourceGuard},
    trace::log::EventLog,
};

/// Timeline report settings.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ProfilerOptions {
    /// Significant digits of duration labels.
    pub time_precision: usize,
    /// Height of one lane in the HTML report, in pixels.
    pub line_height: usize,
    /// Prepend the report to the render output.
    pub display: bool,
    /// Also write the report to this file.
    pub log: Option<PathBuf>,
    /// Topics the bus drops.
    pub muted: Vec<Topic>,
}

impl Default for ProfilerOptions {
    fn default() -> Self {
        Self {
            time_precision: 3,
            line_height: 30,
            display: true,
            log: None,
            muted: Vec::new(),
        }
    }
}

/// Owns one trace: the event log, its resource guard, the bus feeding it and the debug registry.
///
/// A trace spans one render pass. [`Profiler::reset`] starts the next one.
pub struct Profiler {
    log: EventLog,
    guard: ResourceGuard,
    bus: EventBus,
    registry: DebugRegistry,
    options: ProfilerOptions,
    dump_event: Option<Box<EventDump>>,
}

impl Profiler {
    /// Profiler measuring memory with [`AllocProbe`].
    pub fn new(budget: Budget, options: ProfilerOptions) -> Self {
        if budget.memory_limit().is_some() && !ALLOC_TRACKING {
            debug!(
                limit = budget.max_memory_bytes,
                "Profiler: allocation tracking is off; memory budget reads zero"
            );
        }
        let mut bus = EventBus::new();
        for &topic in &options.muted {
            bus.mute(topic);
        }
        Self {
            log: EventLog::new(),
            guard: ResourceGuard::new(budget, Box::new(AllocProbe::new())),
            bus,
            registry: DebugRegistry::new(),
            options,
            dump_event: None,
        }
    }

    /// Replace the memory probe.
    pub fn with_memory_probe(mut self, probe: impl MemoryProbe + 'static) -> Self {
        self.set_memory_probe(Box::new(probe));
        self
    }

    /// Replace the memory probe; the memory baseline is re-read from it.
    pub fn set_memory_probe(&mut self, probe: Box<dyn MemoryProbe>) {
        self.guard.set_probe(probe);
    }

    /// Report settings.
    pub fn options(&self) -> &ProfilerOptions {
        &self.options
    }

    /// Replace the report settings, re-applying topic mutes.
    pub fn set_options(&mut self, options: ProfilerOptions) {
        for &topic in &self.options.muted {
            self.bus.clear_listener(topic);
        }
        for &topic in &options.muted {
            self.bus.mute(topic);
        }
        self.options = options;
    }

    /// Active budget.
    pub fn budget(&self) -> Budget {
        self.guard.budget()
    }

    /// Replace the budget. The baseline is kept.
    pub fn set_budget(&mut self, budget: Budget) {
        self.guard.set_budget(budget);
    }

    /// Replace how events are dumped in report tooltips.
    pub fn set_dump_event(&mut self, dump: impl Fn(&Event) -> String + 'static) {
        self.dump_event = Some(Box::new(dump));
    }

    /// Bus, for installing topic listeners.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Debug ids of the current trace.
    pub fn registry(&self) -> &DebugRegistry {
        &self.registry
    }

    /// Debug ids of the current trace, mutably.
    pub fn registry_mut(&mut self) -> &mut DebugRegistry {
        &mut self.registry
    }

    /// Record a phase event. Fails once a budget is exceeded; later events are dropped silently.
    pub fn emit(&mut self, event: PhaseEvent) -> ScopeResult<()> {
        self.bus.dispatch(event, &mut self.log, &self.guard)
    }

    /// Trace log.
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Recorded events of the current trace.
    pub fn events(&self) -> &[Event] {
        self.log.events()
    }

    /// Whether the trace stopped recording.
    pub fn is_locked(&self) -> bool {
        self.log.is_locked()
    }

    /// Stop recording. Idempotent.
    pub fn kill(&mut self) {
        self.log.lock();
    }

    /// Start a fresh trace: empty unlocked log, new baseline, new event ids.
    pub fn reset(&mut self) {
        self.log.clear();
        self.guard.rebase();
        self.bus.reset();
        debug!("Profiler::reset");
    }

    /// Drop debug ids once the trace they belong to is finished.
    pub fn collect_debug_ids(&mut self) {
        self.registry.collect();
    }

    /// Stop recording and reduce the trace to a timeline.
    pub fn profile(&mut self) -> Profile {
        self.kill();
        let mut builder = TimelineBuilder::new(self.options.time_precision);
        if let Some(dump) = &self.dump_event {
            builder = builder.with_dump(dump.as_ref());
        }
        builder.build(&self.log, self.guard.elapsed())
    }

    /// Stop recording and render the timeline as HTML.
    pub fn render_report(&mut self) -> String {
        let profile = self.profile();
        render_report(&profile, self.options.line_height)
    }

    /// Render the report and route it: written to the log file and/or prepended to `output`.
    ///
    /// A log file that cannot be written is reported through `tracing` and otherwise ignored.
    pub fn publish(&mut self, output: String) -> String {
        let report = self.render_report();
        if let Some(path) = &self.options.log {
            if let Err(err) = std::fs::write(path, &report) {
                warn!(path = %path.display(), error = %err, "Profiler: cannot write report log");
            }
        }
        if self.options.display {
            format!("{report}{output}")
        } else {
            output
        }
    }
}

impl InstrumentationHook for Profiler {
    /// Records a `Display` event linked to the node behind `id`.
    fn fire(&mut self, id: DebugId) -> ScopeResult<()> {
        let Some(node) = self.registry.mark_fired(id) else {
            debug!(id = id.0, "Profiler::fire: unknown debug id");
            return Ok(());
        };
        self.emit(
            PhaseEvent::new(Topic::Display)
                .node(&node)
                .with_param("debug_id", id.0),
        )
    }
}

impl std::fmt::Debug for Profiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profiler")
            .field("events", &self.log.len())
            .field("locked", &self.log.is_locked())
            .field("guard", &self.guard)
            .field("registry", &self.registry.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../tests/unit/profiler.rs"]
mod tests;
