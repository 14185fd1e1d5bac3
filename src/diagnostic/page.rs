use std::io::Write;

use handlebars::Handlebars;
use tracing::warn;

use crate::foundation::core::escape_html;

const PAGE_TEMPLATE: &str = include_str!("templates/error_page.hbs");

/// Everything the standalone HTML error page shows.
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct ErrorPage {
    /// Error message without context, used as page title.
    pub title: String,
    /// `## path(line)` header followed by the execution trace.
    pub trace: String,
    /// First line number of the excerpt.
    pub start: Option<usize>,
    /// Target line text up to the offset.
    pub until_offset: String,
    /// Failing line.
    pub line: usize,
    /// Offset inside the failing line.
    pub offset: Option<usize>,
    /// Diagnostic header.
    pub message: String,
    /// HTML excerpt; inserted unescaped.
    pub code: String,
    /// Pretty-printed render parameters, empty when none were passed.
    pub parameters: String,
}

#[derive(serde::Serialize)]
struct PageView<'a> {
    #[serde(flatten)]
    page: &'a ErrorPage,
    has_offset: bool,
}

impl ErrorPage {
    /// Render the page. Falls back to a `<pre>` dump if the template engine fails.
    pub fn render(&self) -> String {
        let view = PageView {
            page: self,
            has_offset: self.offset.is_some(),
        };
        match Handlebars::new().render_template(PAGE_TEMPLATE, &view) {
            Ok(html) => html,
            Err(err) => {
                warn!(
                    error = %err,
                    "ErrorPage::render: template failed, falling back to plain dump"
                );
                format!(
                    "<pre>{}\n\n{}</pre>",
                    escape_html(&self.title),
                    escape_html(&self.trace)
                )
            }
        }
    }
}

/// Receives a finished error page and ends the process.
///
/// Output may already have been streamed when the page is produced, so control never returns.
pub trait PageSink {
    /// Emit `page` and terminate.
    fn emit_and_exit(&mut self, page: &str) -> !;
}

/// Writes the page to stdout, then exits with status 1.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdoutExit;

impl PageSink for StdoutExit {
    fn emit_and_exit(&mut self, page: &str) -> ! {
        let mut out = std::io::stdout().lock();
        if let Err(err) = out.write_all(page.as_bytes()).and_then(|()| out.flush()) {
            warn!(error = %err, "StdoutExit: failed to write error page");
        }
        std::process::exit(1)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/diagnostic/page.rs"]
mod tests;
