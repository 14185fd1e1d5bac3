use std::collections::HashMap;

use smallvec::SmallVec;

use crate::{
    foundation::core::format_duration,
    timeline::lanes::{LanePacker, Span},
    timeline::phase::{NEUTRAL_COLOR, Phase, classify, link_name},
    trace::event::{Event, Link, LinkKey},
    trace::log::EventLog,
};

/// Every segment is at least this fraction of the trace wide.
pub const MIN_WIDTH_FRACTION: f64 = 1.0 / 20.0;

/// Replaces the default JSON dump of events in the report.
pub type EventDump = dyn Fn(&Event) -> String;

#[derive(Clone, Debug, serde::Serialize)]
/// One horizontal segment of the timeline.
pub struct Process {
    /// Display label, e.g. `div parsing`.
    pub label: String,
    /// Symbol of a structural token marker.
    pub symbol: Option<&'static str>,
    /// Classified phase, if any rule matched.
    pub phase: Option<Phase>,
    /// Display color.
    pub color: &'static str,
    /// Start as a fraction of the trace duration.
    pub start: f64,
    /// Width as a fraction of the trace duration, floored at [`MIN_WIDTH_FRACTION`].
    pub width: f64,
    /// Row the segment's link was packed into.
    pub lane: usize,
    /// Real duration in seconds.
    pub duration: f64,
    /// Human-readable duration.
    pub duration_text: String,
    /// Dump of the event pair the segment spans.
    pub dump: String,
}

#[derive(Clone, Debug, serde::Serialize)]
/// Timeline of one trace.
pub struct Profile {
    /// Total trace duration in seconds.
    pub duration: f64,
    /// Human-readable total duration.
    pub duration_text: String,
    /// Number of lanes used.
    pub lanes: usize,
    /// Segments, grouped by link in order of first appearance.
    pub processes: Vec<Process>,
}

struct Group<'e> {
    link: &'e Link,
    events: SmallVec<[&'e Event; 8]>,
}

/// Reduces a locked [`EventLog`] into a lane-packed [`Profile`].
pub struct TimelineBuilder<'d> {
    time_precision: usize,
    dump: Option<&'d EventDump>,
}

impl<'d> TimelineBuilder<'d> {
    /// Builder labelling durations with `time_precision` significant digits.
    pub fn new(time_precision: usize) -> Self {
        Self {
            time_precision,
            dump: None,
        }
    }

    /// Use `dump` instead of the JSON event dump.
    pub fn with_dump(mut self, dump: &'d EventDump) -> Self {
        self.dump = Some(dump);
        self
    }

    /// Build the timeline. `duration` is the trace length; the last event extends it if later.
    #[tracing::instrument(skip_all, fields(events = log.len()))]
    pub fn build(&self, log: &EventLog, duration: f64) -> Profile {
        let events = log.events();
        let total = events
            .iter()
            .map(|e| e.timestamp)
            .fold(duration.max(0.0), f64::max);
        let scale = if total > 0.0 { total } else { 1.0 };

        let groups = group_by_link(events);
        let mut packer = LanePacker::new();
        let mut processes = Vec::with_capacity(events.len());

        for group in &groups {
            let (min, max) = group
                .events
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), e| {
                    (lo.min(e.timestamp), hi.max(e.timestamp))
                });
            let lane = packer.place(Span::new(min, max));

            if let (Link::Token(token), [only]) = (group.link, group.events.as_slice()) {
                if let Some((symbol, name)) = token.kind.marker() {
                    processes.push(Process {
                        label: name.to_string(),
                        symbol: Some(symbol),
                        phase: None,
                        color: NEUTRAL_COLOR,
                        start: min / scale,
                        width: MIN_WIDTH_FRACTION,
                        lane,
                        duration: 0.0,
                        duration_text: format_duration(0.0, self.time_precision),
                        dump: self.dump_pair(only, only),
                    });
                    continue;
                }
            }

            let base = link_name(group.link);
            let pairs: SmallVec<[(&Event, &Event); 8]> = match group.events.as_slice() {
                [only] => smallvec::smallvec![(*only, *only)],
                many => many.windows(2).map(|w| (w[0], w[1])).collect(),
            };
            let last = pairs.len().saturating_sub(1);

            for (i, (previous, current)) in pairs.into_iter().enumerate() {
                let from = previous.timestamp;
                let to = if i == last { max } else { current.timestamp };
                let (label, phase) = classify(previous, current, base.as_deref());
                let seconds = (to - from).max(0.0);
                processes.push(Process {
                    label,
                    symbol: None,
                    phase,
                    color: phase.map_or(NEUTRAL_COLOR, Phase::color),
                    start: from / scale,
                    width: (seconds / scale).max(MIN_WIDTH_FRACTION),
                    lane,
                    duration: seconds,
                    duration_text: format_duration(seconds, self.time_precision),
                    dump: self.dump_pair(previous, current),
                });
            }
        }

        Profile {
            duration: total,
            duration_text: format_duration(total, self.time_precision),
            lanes: packer.lane_count(),
            processes,
        }
    }

    fn dump_pair(&self, previous: &Event, current: &Event) -> String {
        match self.dump {
            Some(dump) if previous.id == current.id => dump(previous),
            Some(dump) => format!("{}\n{}", dump(previous), dump(current)),
            None => serde_json::json!({
                "previous": previous.dump(),
                "current": current.dump(),
            })
            .to_string(),
        }
    }
}

fn group_by_link(events: &[Event]) -> Vec<Group<'_>> {
    let mut index: HashMap<LinkKey, usize> = HashMap::new();
    let mut groups: Vec<Group<'_>> = Vec::new();
    for event in events {
        let slot = *index.entry(event.link.key()).or_insert_with(|| {
            groups.push(Group {
                link: &event.link,
                events: SmallVec::new(),
            });
            groups.len() - 1
        });
        groups[slot].events.push(event);
    }
    groups
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/builder.rs"]
mod tests;
