use std::path::Path;
use std::sync::Arc;

use crate::{
    foundation::core::SourceLocation,
    foundation::error::{RuntimeFailure, ScopeResult},
    profiler::Profiler,
    trace::debug::{DebugRegistry, InstrumentationHook, debug_marker},
    trace::event::{Node, Params, PhaseEvent},
};

/// Turns template source into generated output, reporting its phases as it goes.
pub trait TemplateCompiler {
    /// Compile `source` (read from `path` when given).
    ///
    /// Implementations emit lexer, parser, compiler and formatter events through `ctx` and embed
    /// [`CompileContext::debug_marker`] comments where runtime failures should be attributable.
    fn compile(
        &mut self,
        source: &str,
        path: Option<&Path>,
        ctx: &mut CompileContext<'_>,
    ) -> ScopeResult<String>;

    /// Map a failure in `compiled` back to the template.
    ///
    /// The default walks up from the failing generated line to the nearest debug marker, then
    /// falls back to the most recently fired one.
    fn locate(
        &self,
        failure: &RuntimeFailure,
        compiled: &str,
        registry: &DebugRegistry,
    ) -> Option<SourceLocation> {
        failure
            .generated_line
            .and_then(|line| registry.resolve_generated_line(compiled, line))
            .or_else(|| {
                registry
                    .last_fired()
                    .and_then(|id| registry.location(id).cloned())
            })
    }
}

/// Executes generated output.
pub trait OutputAdapter {
    /// Run `compiled` with `params`, calling `hook` for every debug marker reached.
    ///
    /// Failures inside the generated code come back as [`crate::ScopeError::Runtime`]; a hook
    /// error must be returned as is.
    fn execute(
        &mut self,
        compiled: &str,
        params: &Params,
        hook: &mut dyn InstrumentationHook,
    ) -> ScopeResult<String>;
}

/// What a [`TemplateCompiler`] can reach during one compilation.
pub struct CompileContext<'p> {
    profiler: &'p mut Profiler,
    debug: bool,
}

impl<'p> CompileContext<'p> {
    pub(crate) fn new(profiler: &'p mut Profiler, debug: bool) -> Self {
        Self { profiler, debug }
    }

    /// Record a phase event.
    pub fn emit(&mut self, event: PhaseEvent) -> ScopeResult<()> {
        self.profiler.emit(event)
    }

    /// Register `node` and return the marker comment to embed, or `None` outside debug mode.
    pub fn debug_marker(&mut self, node: &Arc<Node>) -> Option<String> {
        if !self.debug {
            return None;
        }
        let id = self.profiler.registry_mut().register(Arc::clone(node));
        Some(debug_marker(id))
    }

    /// Whether debug markers are being embedded.
    pub fn is_debug(&self) -> bool {
        self.debug
    }
}

#[cfg(test)]
#[path = "../../tests/unit/renderer/pipeline.rs"]
mod tests;
