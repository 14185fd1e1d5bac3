use super::*;

#[test]
fn location_display_includes_known_parts() {
    assert_eq!(SourceLocation::new(3).to_string(), "line 3");
    assert_eq!(
        SourceLocation::new(3)
            .with_offset(7)
            .with_path("views/index.pug")
            .to_string(),
        "line 3, offset 7 in views/index.pug"
    );
}

#[test]
fn location_path_accessor() {
    let loc = SourceLocation::new(1).with_path("a.pug");
    assert_eq!(loc.path(), Some(Path::new("a.pug")));
    assert_eq!(SourceLocation::new(1).path(), None);
}

#[test]
fn format_duration_picks_unit_and_precision() {
    assert_eq!(format_duration(0.000_012_3, 3), "12.3µs");
    assert_eq!(format_duration(0.0025, 3), "2.5ms");
    assert_eq!(format_duration(1.5, 3), "1.5s");
    assert_eq!(format_duration(123.456, 3), "123s");
    assert_eq!(format_duration(0.012_345, 2), "12ms");
}

#[test]
fn format_duration_handles_degenerate_input() {
    assert_eq!(format_duration(0.0, 3), "0µs");
    assert_eq!(format_duration(-1.0, 3), "0µs");
    assert_eq!(format_duration(f64::NAN, 3), "0µs");
}

#[test]
fn escape_html_escapes_markup() {
    assert_eq!(
        escape_html(r#"<a href="x">'&'</a>"#),
        "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
    );
    assert_eq!(escape_html("plain"), "plain");
}
