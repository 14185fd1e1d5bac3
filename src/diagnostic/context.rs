/// One line of a context window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextLine {
    /// 1-based line number.
    pub number: usize,
    /// Line text without its terminator.
    pub text: String,
    /// True for the failing line.
    pub is_target: bool,
}

/// Lines of a template surrounding a failure.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContextWindow {
    /// Number of the first included line, `None` when nothing was in range.
    pub start: Option<usize>,
    /// Included lines in document order.
    pub lines: Vec<ContextLine>,
}

/// Every line of `source` within `radius` lines of `line` (1-based), inclusive.
///
/// Trailing whitespace of the whole source is ignored, so a final newline never adds a line.
pub fn context_window(source: &str, line: usize, radius: usize) -> ContextWindow {
    let lines: Vec<ContextLine> = source
        .trim_end()
        .split('\n')
        .enumerate()
        .map(|(index, text)| (index + 1, text))
        .filter(|(number, _)| number.abs_diff(line) <= radius)
        .map(|(number, text)| ContextLine {
            number,
            text: text.trim_end_matches('\r').to_string(),
            is_target: number == line,
        })
        .collect();

    ContextWindow {
        start: lines.first().map(|l| l.number),
        lines,
    }
}

/// A line cut around a single marked character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OffsetSplit<'a> {
    /// Characters before the mark.
    pub before: &'a str,
    /// The marked character; empty when the offset is past the end.
    pub marked: &'a str,
    /// Characters after the mark.
    pub after: &'a str,
}

/// Split `text` at character index `offset`: `[0, offset)`, `[offset]`, `(offset, ..]`.
pub fn split_at_offset(text: &str, offset: usize) -> OffsetSplit<'_> {
    let byte_at = |n: usize| text.char_indices().nth(n).map_or(text.len(), |(i, _)| i);
    let start = byte_at(offset);
    let end = byte_at(offset + 1);
    OffsetSplit {
        before: &text[..start],
        marked: &text[start..end],
        after: &text[end..],
    }
}

/// The first `offset` characters of line `line` (1-based) of `source`.
pub fn text_until_offset(source: &str, line: usize, offset: Option<usize>) -> String {
    let Some(text) = line.checked_sub(1).and_then(|i| source.split('\n').nth(i)) else {
        return String::new();
    };
    text.chars().take(offset.unwrap_or(0)).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/diagnostic/context.rs"]
mod tests;
