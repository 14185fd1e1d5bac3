use std::fmt;
use std::path::{Path, PathBuf};

/// Position of an entity inside the authoring template.
///
/// `line` is 1-based. `offset` is the character offset inside that line as reported by the
/// producer, when it knows one.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SourceLocation {
    /// 1-based template line.
    pub line: usize,
    /// Character offset inside the line.
    pub offset: Option<usize>,
    /// Template file the location points into, if it came from a file.
    pub path: Option<PathBuf>,
}

impl SourceLocation {
    /// Location on `line` with no offset or path.
    pub fn new(line: usize) -> Self {
        Self {
            line,
            offset: None,
            path: None,
        }
    }

    /// Attach a character offset.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Attach the originating template path.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Originating path, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.line)?;
        if let Some(offset) = self.offset {
            write!(f, ", offset {offset}")?;
        }
        if let Some(path) = &self.path {
            write!(f, " in {}", path.display())?;
        }
        Ok(())
    }
}

/// Format a duration in seconds with `precision` significant digits, picking `s`, `ms` or `µs`.
///
/// `0.0000123` with precision 3 gives `12.3µs`.
pub fn format_duration(secs: f64, precision: usize) -> String {
    let secs = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
    let (value, unit) = if secs >= 1.0 {
        (secs, "s")
    } else if secs >= 0.001 {
        (secs * 1_000.0, "ms")
    } else {
        (secs * 1_000_000.0, "µs")
    };

    let int_digits = if value >= 1.0 {
        (value.log10().floor() as usize) + 1
    } else {
        1
    };
    let decimals = precision.max(1).saturating_sub(int_digits);
    let text = format!("{value:.decimals$}");
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    };
    format!("{text}{unit}")
}

/// Escape text for inclusion in HTML element content or attribute values.
pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
