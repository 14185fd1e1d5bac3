pub(crate) mod options;
pub(crate) mod pipeline;

use std::io::Write;
use std::path::Path;

use anyhow::Context as _;
use tracing::{debug, warn};

use crate::{
    diagnostic::color::{ColorSignals, supports_color},
    diagnostic::formatter::DiagnosticFormatter,
    diagnostic::highlight::RenderMode,
    diagnostic::page::{PageSink, StdoutExit},
    foundation::alloc_track::MemoryProbe,
    foundation::error::{RuntimeFailure, ScopeError, ScopeResult},
    profiler::Profiler,
    renderer::options::RendererOptions,
    renderer::pipeline::{CompileContext, OutputAdapter, TemplateCompiler},
    trace::event::{Params, PhaseEvent, Topic},
};

/// Caller-supplied disposition of render failures. `Ok` swallows the failure.
pub type ErrorHandler = Box<dyn FnMut(ScopeError) -> ScopeResult<()>>;

/// Failure of one pass, with the generated output if compilation got that far.
struct PassFailure {
    error: ScopeError,
    compiled: Option<String>,
}

impl From<ScopeError> for PassFailure {
    fn from(error: ScopeError) -> Self {
        Self {
            error,
            compiled: None,
        }
    }
}

/// Render entry point: drives compiler and adapter through one traced pass per call.
///
/// Every pass starts a fresh trace under the configured budgets. Failures are enriched with
/// template context in debug mode and handed to the error handler when one is set.
pub struct Renderer {
    options: RendererOptions,
    compiler: Box<dyn TemplateCompiler>,
    adapter: Box<dyn OutputAdapter>,
    profiler: Profiler,
    error_handler: Option<ErrorHandler>,
    page_sink: Box<dyn PageSink>,
    color_signals: Option<ColorSignals>,
}

impl Renderer {
    /// Renderer over `compiler` and `adapter`.
    pub fn new(
        options: RendererOptions,
        compiler: impl TemplateCompiler + 'static,
        adapter: impl OutputAdapter + 'static,
    ) -> Self {
        warn_untracked_memory_limit(&options);
        let profiler = Profiler::new(options.budget(), options.profiler.clone());
        Self {
            options,
            compiler: Box::new(compiler),
            adapter: Box::new(adapter),
            profiler,
            error_handler: None,
            page_sink: Box::new(StdoutExit),
            color_signals: None,
        }
    }

    /// Install an error handler.
    pub fn with_error_handler(
        mut self,
        handler: impl FnMut(ScopeError) -> ScopeResult<()> + 'static,
    ) -> Self {
        self.set_error_handler(handler);
        self
    }

    /// Install or replace the error handler.
    pub fn set_error_handler(
        &mut self,
        handler: impl FnMut(ScopeError) -> ScopeResult<()> + 'static,
    ) {
        self.error_handler = Some(Box::new(handler));
    }

    /// Remove the error handler; failures are returned to the caller again.
    pub fn clear_error_handler(&mut self) {
        self.error_handler = None;
    }

    /// Where HTML error pages go when there is no error handler.
    pub fn with_page_sink(mut self, sink: impl PageSink + 'static) -> Self {
        self.page_sink = Box::new(sink);
        self
    }

    /// Replace the memory probe of the trace.
    pub fn with_memory_probe(mut self, probe: impl MemoryProbe + 'static) -> Self {
        self.profiler.set_memory_probe(Box::new(probe));
        self
    }

    /// Decide ANSI support from `signals` instead of the process environment.
    pub fn with_color_signals(mut self, signals: ColorSignals) -> Self {
        self.color_signals = Some(signals);
        self
    }

    /// Current options.
    pub fn options(&self) -> &RendererOptions {
        &self.options
    }

    /// Replace the options; budgets and report settings apply from the next pass.
    pub fn configure(&mut self, options: RendererOptions) {
        warn_untracked_memory_limit(&options);
        self.profiler.set_budget(options.budget());
        self.profiler.set_options(options.profiler.clone());
        self.options = options;
    }

    /// The trace of the last pass.
    pub fn profiler(&self) -> &Profiler {
        &self.profiler
    }

    /// The trace of the last pass, mutably.
    pub fn profiler_mut(&mut self) -> &mut Profiler {
        &mut self.profiler
    }

    /// Share one variable with every render.
    pub fn share(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.options.shared_variables.insert(key.into(), value.into());
    }

    /// Share every entry of `variables` with every render.
    pub fn share_all(&mut self, variables: Params) {
        self.options.shared_variables.extend(variables);
    }

    /// Forget all shared variables.
    pub fn reset_shared_variables(&mut self) {
        self.options.shared_variables.clear();
    }

    /// Variables merged under every render call.
    pub fn shared_variables(&self) -> &Params {
        &self.options.shared_variables
    }

    /// Compile `source` without executing it, under a fresh trace.
    #[tracing::instrument(skip(self, source), fields(len = source.len()))]
    pub fn compile_string(&mut self, source: &str, path: Option<&Path>) -> ScopeResult<String> {
        self.begin_pass();
        let mut ctx = CompileContext::new(&mut self.profiler, self.options.debug);
        self.compiler.compile(source, path, &mut ctx)
    }

    /// Render `source` with `params`.
    #[tracing::instrument(skip(self, source, params), fields(len = source.len()))]
    pub fn render_string(&mut self, source: &str, params: &Params) -> ScopeResult<String> {
        self.render_pass(source, None, params)
    }

    /// Render the template at `path` with `params`.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn render_file(&mut self, path: impl AsRef<Path>, params: &Params) -> ScopeResult<String> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("read template {}", path.display()))?;
        self.render_pass(&source, Some(path), params)
    }

    /// Render `source` and write the result to `out`.
    pub fn display_string(
        &mut self,
        source: &str,
        params: &Params,
        out: &mut dyn Write,
    ) -> ScopeResult<()> {
        let html = self.render_string(source, params)?;
        out.write_all(html.as_bytes()).context("write rendered output")?;
        Ok(())
    }

    /// Render the template at `path` and write the result to `out`.
    pub fn display_file(
        &mut self,
        path: impl AsRef<Path>,
        params: &Params,
        out: &mut dyn Write,
    ) -> ScopeResult<()> {
        let html = self.render_file(path, params)?;
        out.write_all(html.as_bytes()).context("write rendered output")?;
        Ok(())
    }

    fn render_pass(
        &mut self,
        source: &str,
        path: Option<&Path>,
        params: &Params,
    ) -> ScopeResult<String> {
        let mut merged = self.options.shared_variables.clone();
        merged.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));

        self.begin_pass();
        let outcome = match self.run(source, path, &merged) {
            Ok(output) => Ok(output),
            Err(failure) => self.handle_error(failure, source, path, &merged),
        };
        self.profiler.collect_debug_ids();
        outcome
    }

    /// Fresh trace. Debug ids left by a compile-only pass are dropped here.
    fn begin_pass(&mut self) {
        self.profiler.collect_debug_ids();
        self.profiler.reset();
    }

    fn run(
        &mut self,
        source: &str,
        path: Option<&Path>,
        params: &Params,
    ) -> Result<String, PassFailure> {
        let mut render = PhaseEvent::new(Topic::Render);
        if let Some(path) = path {
            render = render.with_param("path", path.display().to_string());
        }
        self.profiler.emit(render)?;

        let compiled = {
            let mut ctx = CompileContext::new(&mut self.profiler, self.options.debug);
            self.compiler.compile(source, path, &mut ctx)?
        };

        let output = match self.adapter.execute(&compiled, params, &mut self.profiler) {
            Ok(output) => output,
            Err(error) => {
                return Err(PassFailure {
                    error,
                    compiled: Some(compiled),
                });
            }
        };

        self.profiler
            .emit(PhaseEvent::new(Topic::Html).with_param("length", output.len()))?;

        if self.options.enable_profiler {
            return Ok(self.profiler.publish(output));
        }
        Ok(output)
    }

    fn render_mode(&self) -> RenderMode {
        if self.options.html_error {
            return RenderMode::Html;
        }
        let mut signals = self
            .color_signals
            .clone()
            .unwrap_or_else(ColorSignals::from_process);
        if let Some(forced) = self.options.color_support {
            signals.forced = Some(forced);
        }
        if supports_color(&signals) {
            RenderMode::Ansi
        } else {
            RenderMode::Plain
        }
    }

    fn handle_error(
        &mut self,
        failure: PassFailure,
        source: &str,
        path: Option<&Path>,
        params: &Params,
    ) -> ScopeResult<String> {
        let PassFailure { error, compiled } = failure;
        let error = if self.options.debug {
            self.enrich(error, compiled.as_deref(), source, path, params)
        } else {
            error
        };

        match self.error_handler.as_mut() {
            Some(handler) => {
                debug!(kind = error.kind_name(), "Renderer: delegating failure to error handler");
                handler(error)?;
                Ok(String::new())
            }
            None => Err(error),
        }
    }

    fn enrich(
        &mut self,
        error: ScopeError,
        compiled: Option<&str>,
        source: &str,
        path: Option<&Path>,
        params: &Params,
    ) -> ScopeError {
        let mode = self.render_mode();
        let mut formatter = DiagnosticFormatter::new(self.options.error_context_lines, mode);
        if let Some(path) = path {
            formatter = formatter.with_default_path(path);
        }

        let diagnostic = {
            let compiler = &self.compiler;
            let registry = self.profiler.registry();
            let compiled = compiled.unwrap_or_default();
            let resolver = |failure: &RuntimeFailure| compiler.locate(failure, compiled, registry);
            formatter.diagnose(&error, Some(source), &resolver)
        };
        let Some(diagnostic) = diagnostic else {
            return error;
        };

        if mode == RenderMode::Html && self.error_handler.is_none() {
            let page = diagnostic.page(&error, Some(params)).render();
            self.page_sink.emit_and_exit(&page);
        }
        diagnostic.into_error(error)
    }
}

fn warn_untracked_memory_limit(options: &RendererOptions) {
    if let Some(limit) = options.untracked_memory_limit() {
        warn!(
            limit,
            "Renderer: memory_limit set but allocation tracking is off; it will never trip"
        );
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("options", &self.options)
            .field("profiler", &self.profiler)
            .field("error_handler", &self.error_handler.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/renderer/renderer.rs"]
mod tests;
