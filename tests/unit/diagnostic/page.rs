use super::*;

fn page() -> ErrorPage {
    ErrorPage {
        title: "Division by zero".to_string(),
        trace: "## views/index.pug(2)\n#0 render()".to_string(),
        start: Some(1),
        until_offset: "div: p=".to_string(),
        line: 2,
        offset: Some(7),
        message: "DivisionByZeroError in views/index.pug:\nDivision by zero on line 2, offset 7"
            .to_string(),
        code: "<span class=\"error-line\">x</span>\n".to_string(),
        parameters: String::new(),
    }
}

#[test]
fn page_shows_title_position_and_raw_code() {
    let html = page().render();
    assert!(html.contains("<title>Division by zero</title>"));
    assert!(html.contains("line 2, offset 7"));
    assert!(html.contains("<span class=\"error-line\">x</span>"));
    assert!(html.contains("## views/index.pug(2)\n#0 render()"));
}

#[test]
fn page_escapes_text_fields() {
    let mut page = page();
    page.title = "<script>".to_string();
    page.until_offset = "a<b".to_string();
    let html = page.render();
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
    assert!(html.contains("a&lt;b"));
}

#[test]
fn parameters_section_only_when_present() {
    assert!(!page().render().contains("error-parameters"));

    let mut page = page();
    page.parameters = "{\n  \"user\": \"ann\"\n}".to_string();
    let html = page.render();
    assert!(html.contains("error-parameters"));
    assert!(html.contains("&quot;user&quot;"));
}

#[test]
fn offset_is_omitted_when_unknown() {
    let mut page = page();
    page.offset = None;
    page.until_offset.clear();
    let html = page.render();
    assert!(html.contains("line 2</p>"));
}
