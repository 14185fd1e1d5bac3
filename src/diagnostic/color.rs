use std::collections::BTreeMap;
use std::io::IsTerminal;

/// Environment facts ANSI color support is decided from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColorSignals {
    /// Explicit override; wins over everything else.
    pub forced: Option<bool>,
    /// Running on Windows.
    pub windows: bool,
    /// Relevant environment variables.
    pub vars: BTreeMap<String, String>,
    /// Whether standard output is an interactive terminal.
    pub stdout_is_terminal: bool,
}

const VARS: &[&str] = &[
    "NO_COLOR",
    "FORCE_COLOR",
    "CLICOLOR_FORCE",
    "TERM",
    "ANSICON",
    "ConEmuANSI",
    "BABUN_HOME",
    "WT_SESSION",
];

impl ColorSignals {
    /// Read the signals of the running process.
    pub fn from_process() -> Self {
        Self {
            forced: None,
            windows: cfg!(windows),
            vars: VARS
                .iter()
                .filter_map(|&name| std::env::var(name).ok().map(|v| (name.to_string(), v)))
                .collect(),
            stdout_is_terminal: std::io::stdout().is_terminal(),
        }
    }

    /// Set an explicit override.
    pub fn forced(mut self, forced: Option<bool>) -> Self {
        self.forced = forced;
        self
    }

    /// Add an environment variable.
    pub fn var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    fn has(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    fn is(&self, name: &str, value: &str) -> bool {
        self.vars.get(name).is_some_and(|v| v == value)
    }
}

/// Decide whether diagnostics should use ANSI colors.
///
/// Order: override, `NO_COLOR`, `FORCE_COLOR`/`CLICOLOR_FORCE`, `TERM=dumb`, then the platform
/// terminal markers (Windows) or an interactive stdout.
pub fn supports_color(signals: &ColorSignals) -> bool {
    if let Some(forced) = signals.forced {
        return forced;
    }
    if signals.has("NO_COLOR") {
        return false;
    }
    if ["FORCE_COLOR", "CLICOLOR_FORCE"]
        .iter()
        .any(|name| signals.vars.get(*name).is_some_and(|v| v != "0"))
    {
        return true;
    }
    if signals.is("TERM", "dumb") {
        return false;
    }
    if signals.windows {
        return signals.has("ANSICON")
            || signals.is("ConEmuANSI", "ON")
            || signals.has("BABUN_HOME")
            || signals.has("WT_SESSION");
    }
    signals.has("BABUN_HOME") || signals.stdout_is_terminal
}

#[cfg(test)]
#[path = "../../tests/unit/diagnostic/color.rs"]
mod tests;
