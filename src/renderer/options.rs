use std::path::Path;

use anyhow::Context as _;

use crate::{
    foundation::alloc_track::ALLOC_TRACKING,
    foundation::error::{ScopeError, ScopeResult},
    profiler::ProfilerOptions,
    trace::event::Params,
    trace::guard::{Budget, DISABLED},
};

/// Default duration budget of debug renders, in milliseconds.
pub const DEBUG_MAX_TIME_MS: i64 = 30_000;
/// Default memory budget of debug renders, in bytes.
pub const DEBUG_MEMORY_LIMIT: i64 = 50 * 1024 * 1024;

/// Renderer configuration. Every field has a default, so partial JSON documents load.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RendererOptions {
    /// Enrich failures with template context and embed debug markers.
    pub debug: bool,
    /// Render failures as HTML.
    pub html_error: bool,
    /// Lines shown on each side of a failing line.
    pub error_context_lines: usize,
    /// Force ANSI colors on or off instead of detecting support.
    pub color_support: Option<bool>,
    /// Produce the timeline report after each render.
    pub enable_profiler: bool,
    /// Timeline report settings.
    pub profiler: ProfilerOptions,
    /// Duration budget in milliseconds; negative disables it.
    pub execution_max_time: Option<i64>,
    /// Memory budget in bytes; negative disables it.
    pub memory_limit: Option<i64>,
    /// Parameters merged under every render call.
    pub shared_variables: Params,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            debug: true,
            html_error: false,
            error_context_lines: 7,
            color_support: None,
            enable_profiler: false,
            profiler: ProfilerOptions::default(),
            execution_max_time: None,
            memory_limit: None,
            shared_variables: Params::new(),
        }
    }
}

impl RendererOptions {
    /// Parse options from a JSON document.
    pub fn from_json_str(json: &str) -> ScopeResult<Self> {
        serde_json::from_str(json).map_err(|e| ScopeError::config(format!("invalid options: {e}")))
    }

    /// Read and parse a JSON options file.
    pub fn from_json_file(path: impl AsRef<Path>) -> ScopeResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read renderer options {}", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Effective budget. Unset limits default to generous ceilings in debug mode, off otherwise.
    pub fn budget(&self) -> Budget {
        let fallback = |debug_default: i64| if self.debug { debug_default } else { DISABLED };
        Budget {
            max_duration_ms: self
                .execution_max_time
                .unwrap_or_else(|| fallback(DEBUG_MAX_TIME_MS)),
            max_memory_bytes: self
                .memory_limit
                .unwrap_or_else(|| fallback(DEBUG_MEMORY_LIMIT)),
        }
    }

    /// Explicitly configured memory limit that cannot trip because allocations are not tracked.
    ///
    /// The debug-mode default is not reported.
    pub fn untracked_memory_limit(&self) -> Option<i64> {
        self.memory_limit.filter(|&limit| limit >= 0 && !ALLOC_TRACKING)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/renderer/options.rs"]
mod tests;
