use super::*;
use crate::diagnostic::context::context_window;

#[test]
fn gutter_is_fixed_width_up_to_four_digits() {
    assert_eq!(gutter(6, true), ">   6 | ");
    assert_eq!(gutter(12, false), "   12 | ");
    assert_eq!(gutter(1, false).chars().count(), GUTTER_WIDTH);
    assert_eq!(gutter(12345, true), ">12345 | ");
}

#[test]
fn offset_marks_the_character_before_it() {
    assert_eq!(marked_index(7), 6);
    assert_eq!(marked_index(1), 0);
    assert_eq!(marked_index(0), 0);
}

#[test]
fn ansi_marks_the_character_above_the_caret() {
    let prefix = gutter(1, true);
    let highlighted = highlight_line(&prefix, "div: p=12/0", Some(7), RenderMode::Ansi);
    assert_eq!(
        highlighted,
        "\x1b[43;30m>   1 | div: p\x1b[43;31m=\x1b[43;30m12/0\x1b[0m\n"
    );
    let caret = caret_row(GUTTER_WIDTH, 7);
    assert_eq!(caret, "--------------^\n");
    let line = format!("{prefix}div: p=12/0");
    assert_eq!(line.chars().nth(caret.len() - 2), Some('='));
}

#[test]
fn ansi_without_offset_colors_the_whole_line() {
    assert_eq!(
        highlight_line("", "x", None, RenderMode::Ansi),
        "\x1b[43;30mx\x1b[0m\n"
    );
}

#[test]
fn plain_mode_leaves_the_line_untouched() {
    assert_eq!(
        highlight_line(">   1 | ", "a", Some(0), RenderMode::Plain),
        ">   1 | a\n"
    );
}

#[test]
fn html_marks_the_same_character_as_text_modes() {
    assert_eq!(
        highlight_line("", "div: p=12/0", Some(7), RenderMode::Html),
        "<span class=\"error-line\">div: p<span class=\"error-offset\">=</span>12/0</span>\n"
    );
    assert_eq!(
        highlight_line("", "<a>", Some(0), RenderMode::Html),
        "<span class=\"error-line\"><span class=\"error-offset\">&lt;</span>a&gt;</span>\n"
    );
    assert_eq!(
        highlight_line("", "<a>", None, RenderMode::Html),
        "<span class=\"error-line\">&lt;a&gt;</span>\n"
    );
}

#[test]
fn plain_excerpt_has_numbers_marker_and_caret() {
    let window = context_window("p first\ndiv: p=12/0\np last", 2, 1);
    let code = render_excerpt(&window, Some(7), RenderMode::Plain);
    assert_eq!(
        code,
        "    1 | p first\n>   2 | div: p=12/0\n--------------^\n    3 | p last\n"
    );
}

#[test]
fn caret_follows_a_wider_gutter() {
    let source = format!("{}div: p=12/0", "x\n".repeat(9_999));
    let window = context_window(&source, 10_000, 0);
    let code = render_excerpt(&window, Some(7), RenderMode::Ansi);
    assert_eq!(
        code,
        "\x1b[43;30m>10000 | div: p\x1b[43;31m=\x1b[43;30m12/0\x1b[0m\n---------------^\n"
    );
}

#[test]
fn excerpt_without_offset_has_no_caret() {
    let window = context_window("a\nb", 2, 1);
    let code = render_excerpt(&window, None, RenderMode::Plain);
    assert_eq!(code, "    1 | a\n>   2 | b\n");
}

#[test]
fn html_excerpt_has_no_gutter() {
    let window = context_window("<p>\ndiv: p=12/0", 2, 1);
    let code = render_excerpt(&window, Some(7), RenderMode::Html);
    assert_eq!(
        code,
        "&lt;p&gt;\n<span class=\"error-line\">div: p<span class=\"error-offset\">=</span>12/0</span>\n"
    );
}
