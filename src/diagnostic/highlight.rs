use crate::{
    diagnostic::context::{ContextWindow, split_at_offset},
    foundation::core::escape_html,
};

/// Output flavor of a diagnostic excerpt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Numbered lines with a caret row.
    Plain,
    /// Numbered lines, target line on a colored background, caret row.
    Ansi,
    /// Escaped lines, target line wrapped in marker spans.
    Html,
}

/// Minimum width of the `>NNNN | ` line prefix in text modes. Line numbers past 9999 widen it.
pub const GUTTER_WIDTH: usize = 8;

const ANSI_LINE: &str = "\x1b[43;30m";
const ANSI_MARK: &str = "\x1b[43;31m";
const ANSI_RESET: &str = "\x1b[0m";

/// Line prefix: `>` on the target line, number right-aligned on at least 4 columns.
pub fn gutter(number: usize, is_target: bool) -> String {
    format!("{}{number:>4} | ", if is_target { '>' } else { ' ' })
}

/// Index of the character an offset designates: the one just before it, so offset 7 of
/// `div: p=12/0` is the `=`. Offset 0 marks the first character.
pub fn marked_index(offset: usize) -> usize {
    offset.saturating_sub(1)
}

/// Highlight the failing line `text`, written after `prefix` (the gutter, empty in HTML mode).
///
/// Every mode marks the same character, the one at [`marked_index`].
pub fn highlight_line(
    prefix: &str,
    text: &str,
    offset: Option<usize>,
    mode: RenderMode,
) -> String {
    match (mode, offset) {
        (RenderMode::Plain, _) => format!("{prefix}{text}\n"),
        (RenderMode::Ansi, None) => format!("{ANSI_LINE}{prefix}{text}{ANSI_RESET}\n"),
        (RenderMode::Ansi, Some(offset)) => {
            let split = split_at_offset(text, marked_index(offset));
            format!(
                "{ANSI_LINE}{prefix}{}{ANSI_MARK}{}{ANSI_LINE}{}{ANSI_RESET}\n",
                split.before, split.marked, split.after
            )
        }
        (RenderMode::Html, None) => format!(
            "<span class=\"error-line\">{}{}</span>\n",
            escape_html(prefix),
            escape_html(text)
        ),
        (RenderMode::Html, Some(offset)) => {
            let split = split_at_offset(text, marked_index(offset));
            format!(
                "<span class=\"error-line\">{}{}<span class=\"error-offset\">{}</span>{}</span>\n",
                escape_html(prefix),
                escape_html(split.before),
                escape_html(split.marked),
                escape_html(split.after)
            )
        }
    }
}

/// `-----^` row under a line whose prefix is `prefix_width` characters wide.
pub fn caret_row(prefix_width: usize, offset: usize) -> String {
    format!("{}^\n", "-".repeat(prefix_width + marked_index(offset)))
}

/// Render a whole context window, one output line per source line.
pub fn render_excerpt(window: &ContextWindow, offset: Option<usize>, mode: RenderMode) -> String {
    let mut code = String::new();
    for line in &window.lines {
        let prefix = match mode {
            RenderMode::Html => String::new(),
            RenderMode::Plain | RenderMode::Ansi => gutter(line.number, line.is_target),
        };

        if !line.is_target {
            if mode == RenderMode::Html {
                code.push_str(&escape_html(&line.text));
            } else {
                code.push_str(&prefix);
                code.push_str(&line.text);
            }
            code.push('\n');
            continue;
        }

        code.push_str(&highlight_line(&prefix, &line.text, offset, mode));
        if let (Some(offset), RenderMode::Plain | RenderMode::Ansi) = (offset, mode) {
            code.push_str(&caret_row(prefix.chars().count(), offset));
        }
    }
    code
}

#[cfg(test)]
#[path = "../../tests/unit/diagnostic/highlight.rs"]
mod tests;
