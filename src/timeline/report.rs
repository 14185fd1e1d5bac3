use handlebars::Handlebars;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{foundation::core::escape_html, timeline::builder::Profile};

const REPORT_TEMPLATE: &str = include_str!("templates/report.hbs");

#[derive(Serialize)]
struct ProcessView<'a> {
    title: String,
    left: String,
    width: String,
    bottom: usize,
    color: &'a str,
    symbol: Option<&'a str>,
    label: &'a str,
    duration_text: &'a str,
}

#[derive(Serialize)]
struct ReportView<'a> {
    duration_text: &'a str,
    height: usize,
    line_height: usize,
    processes: Vec<ProcessView<'a>>,
}

fn percent(fraction: f64) -> String {
    format!("{:.4}", fraction * 100.0)
}

/// Render `profile` as an HTML fragment, one absolutely positioned box per process.
///
/// Lanes stack upward in rows of `line_height` pixels. Never fails: if the template engine
/// errors, a preformatted dump of the profile is returned instead.
pub fn render_report(profile: &Profile, line_height: usize) -> String {
    let view = ReportView {
        duration_text: &profile.duration_text,
        height: (profile.lanes.max(1) + 1) * line_height,
        line_height,
        processes: profile
            .processes
            .iter()
            .map(|p| ProcessView {
                title: format!("{}: {}", p.label, p.dump),
                left: percent(p.start),
                width: percent(p.width),
                bottom: p.lane * line_height,
                color: p.color,
                symbol: p.symbol,
                label: &p.label,
                duration_text: &p.duration_text,
            })
            .collect(),
    };

    debug!(processes = view.processes.len(), lanes = profile.lanes, "render_report");
    match Handlebars::new().render_template(REPORT_TEMPLATE, &view) {
        Ok(html) => html,
        Err(err) => {
            warn!(error = %err, "render_report: template failed, falling back to plain dump");
            fallback_dump(profile)
        }
    }
}

fn fallback_dump(profile: &Profile) -> String {
    let mut out = format!("<pre>total {}\n", escape_html(&profile.duration_text));
    for p in &profile.processes {
        out.push_str(&format!(
            "[{}] {} {}\n",
            p.lane,
            escape_html(&p.label),
            escape_html(&p.duration_text)
        ));
    }
    out.push_str("</pre>");
    out
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/report.rs"]
mod tests;
