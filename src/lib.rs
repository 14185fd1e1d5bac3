//! Renderscope is the instrumentation and diagnostics core of a template-render pipeline.
//!
//! A [`Renderer`] drives a [`TemplateCompiler`] and an [`OutputAdapter`] through traced render
//! passes:
//!
//! - every phase event goes through the [`EventBus`] and the [`ResourceGuard`] into the
//!   [`EventLog`], under time and memory [`Budget`]s that abort a runaway render
//! - [`TimelineBuilder`] reduces a finished trace into lane-packed [`Process`] segments and
//!   an HTML report
//! - [`DiagnosticFormatter`] maps runtime failures back to template lines through debug
//!   markers and renders them as plain text, ANSI or HTML
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;

pub(crate) mod diagnostic;
pub(crate) mod profiler;
/// Render entry point and the collaborator traits it drives.
pub mod renderer;
pub(crate) mod timeline;
pub(crate) mod trace;

pub use crate::foundation::alloc_track::{ALLOC_TRACKING, AllocProbe, MemoryProbe};
pub use crate::foundation::core::{SourceLocation, format_duration};
pub use crate::foundation::error::{RuntimeFailure, ScopeError, ScopeResult};

pub use crate::diagnostic::color::{ColorSignals, supports_color};
pub use crate::diagnostic::context::{
    ContextLine, ContextWindow, OffsetSplit, context_window, split_at_offset, text_until_offset,
};
pub use crate::diagnostic::formatter::{Diagnostic, DiagnosticFormatter, LocationResolver};
pub use crate::diagnostic::highlight::{
    GUTTER_WIDTH, RenderMode, caret_row, gutter, highlight_line, marked_index, render_excerpt,
};
pub use crate::diagnostic::page::{ErrorPage, PageSink, StdoutExit};
pub use crate::profiler::{Profiler, ProfilerOptions};
pub use crate::renderer::options::{DEBUG_MAX_TIME_MS, DEBUG_MEMORY_LIMIT, RendererOptions};
pub use crate::renderer::pipeline::{CompileContext, OutputAdapter, TemplateCompiler};
pub use crate::renderer::{ErrorHandler, Renderer};
pub use crate::timeline::builder::{
    EventDump, MIN_WIDTH_FRACTION, Process, Profile, TimelineBuilder,
};
pub use crate::timeline::lanes::{LanePacker, Span};
pub use crate::timeline::phase::{NEUTRAL_COLOR, Phase, classify, link_name};
pub use crate::timeline::report::render_report;
pub use crate::trace::bus::{EventBus, Listener, Verdict};
pub use crate::trace::debug::{
    DebugId, DebugRegistry, InstrumentationHook, NoopHook, debug_marker, parse_marker,
};
pub use crate::trace::event::{
    Event, EventId, Link, LinkKey, Node, NodeKind, Params, PhaseEvent, Stage, Subject, Token,
    TokenKind, Topic,
};
pub use crate::trace::guard::{Budget, DISABLED, ResourceBaseline, ResourceGuard};
pub use crate::trace::log::EventLog;
