use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    diagnostic::context::{context_window, text_until_offset},
    diagnostic::highlight::{RenderMode, render_excerpt},
    diagnostic::page::ErrorPage,
    foundation::core::SourceLocation,
    foundation::error::{RuntimeFailure, ScopeError},
    trace::event::Params,
};

/// Maps a failure without a template location back to one, usually through debug markers.
pub type LocationResolver<'a> = dyn Fn(&RuntimeFailure) -> Option<SourceLocation> + 'a;

/// Source-mapped description of one failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Where the failure points.
    pub location: SourceLocation,
    /// `Kind in path:\nmessage on line L, offset O\n\n`.
    pub header: String,
    /// Highlighted excerpt.
    pub code: String,
    /// First excerpt line.
    pub start: Option<usize>,
    /// Target line text up to the offset.
    pub until_offset: String,
}

impl Diagnostic {
    /// Header followed by the excerpt.
    pub fn text(&self) -> String {
        format!("{}{}", self.header, self.code)
    }

    /// Wrap `original` into a [`ScopeError::Diagnostic`] carrying this text.
    pub fn into_error(self, original: ScopeError) -> ScopeError {
        ScopeError::Diagnostic {
            message: self.text(),
            source: Box::new(original),
        }
    }

    /// Error page for `original`, rendered with `parameters` when there are any.
    pub fn page(&self, original: &ScopeError, parameters: Option<&Params>) -> ErrorPage {
        let path = self
            .location
            .path()
            .map_or_else(|| "template".to_string(), |p| p.display().to_string());
        let mut trace = format!("## {path}({})\n", self.location.line);
        trace.push_str(&original.trace().join("\n"));

        ErrorPage {
            title: original.bare_message(),
            trace,
            start: self.start,
            until_offset: self.until_offset.clone(),
            line: self.location.line,
            offset: self.location.offset,
            message: self.header.trim().to_string(),
            code: self.code.clone(),
            parameters: parameters
                .filter(|p| !p.is_empty())
                .and_then(|p| serde_json::to_string_pretty(p).ok())
                .unwrap_or_default(),
        }
    }
}

/// Turns failures into template-context diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticFormatter {
    context_lines: usize,
    mode: RenderMode,
    default_path: Option<PathBuf>,
}

impl DiagnosticFormatter {
    /// Formatter showing `context_lines` lines around the failing one.
    pub fn new(context_lines: usize, mode: RenderMode) -> Self {
        Self {
            context_lines,
            mode,
            default_path: None,
        }
    }

    /// Template path assumed for locations that do not name one.
    pub fn with_default_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_path = Some(path.into());
        self
    }

    /// Output flavor.
    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Template location of `error`.
    ///
    /// Errors that carry a location use it. Runtime failures without one go through `resolver`.
    /// Budget violations without a location stay unlocated.
    pub fn resolve(
        &self,
        error: &ScopeError,
        resolver: &LocationResolver<'_>,
    ) -> Option<SourceLocation> {
        let location = match error {
            ScopeError::Runtime(failure) => {
                failure.location.clone().or_else(|| resolver(failure))
            }
            ScopeError::Diagnostic { .. } => None,
            other => other.location().cloned(),
        }?;
        match &self.default_path {
            Some(path) if location.path.is_none() => Some(location.with_path(path.clone())),
            _ => Some(location),
        }
    }

    /// Build the diagnostic for `error` at `location` against `source`.
    pub fn describe(
        &self,
        error: &ScopeError,
        location: SourceLocation,
        source: &str,
    ) -> Diagnostic {
        let mut header = error.kind_name().to_string();
        if let Some(path) = location.path() {
            header.push_str(&format!(" in {}", path.display()));
        }
        header.push_str(&format!(":\n{} on line {}", error.bare_message(), location.line));
        if let Some(offset) = location.offset {
            header.push_str(&format!(", offset {offset}"));
        }
        header.push_str("\n\n");

        let window = context_window(source, location.line, self.context_lines);
        let code = render_excerpt(&window, location.offset, self.mode);

        Diagnostic {
            until_offset: text_until_offset(source, location.line, location.offset),
            start: window.start,
            header,
            code,
            location,
        }
    }

    /// Resolve and describe `error`, or `None` when it cannot be attributed to the template.
    ///
    /// The source comes from the location's path when it has one, else from `fallback_source`.
    pub fn diagnose(
        &self,
        error: &ScopeError,
        fallback_source: Option<&str>,
        resolver: &LocationResolver<'_>,
    ) -> Option<Diagnostic> {
        let Some(location) = self.resolve(error, resolver) else {
            debug!(kind = error.kind_name(), "DiagnosticFormatter: no template location");
            return None;
        };
        let source = match location.path() {
            Some(path) => read_source(path).or_else(|| fallback_source.map(str::to_string)),
            None => fallback_source.map(str::to_string),
        }
        .unwrap_or_default();
        Some(self.describe(error, location, &source))
    }

    /// [`Self::diagnose`] and wrap; unattributable errors come back unchanged.
    #[tracing::instrument(skip_all, fields(kind = error.kind_name(), mode = ?self.mode))]
    pub fn enrich(
        &self,
        error: ScopeError,
        fallback_source: Option<&str>,
        resolver: &LocationResolver<'_>,
    ) -> ScopeError {
        match self.diagnose(&error, fallback_source, resolver) {
            Some(diagnostic) => diagnostic.into_error(error),
            None => error,
        }
    }
}

fn read_source(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(source) => Some(source),
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "DiagnosticFormatter: cannot read template"
            );
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/diagnostic/formatter.rs"]
mod tests;
