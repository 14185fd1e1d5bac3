use std::collections::HashMap;

use crate::{
    foundation::error::ScopeResult,
    trace::event::{Event, EventId, Link, PhaseEvent, Subject, Topic},
    trace::guard::ResourceGuard,
    trace::log::EventLog,
};

/// Listener decision after enrichment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Hand the event to the guard and the log.
    Record,
    /// Drop the event.
    Skip,
}

/// Topic listener. May append parameters to the enriched event or veto it.
pub type Listener = Box<dyn FnMut(&mut Event) -> Verdict>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LinkRule {
    /// Link the token or node the producer attached; fall back to the event itself.
    Subject,
    /// Link the event itself.
    OwnEvent,
    /// Link the `Render` event of the pass in progress.
    CurrentRender,
}

struct Handler {
    rule: LinkRule,
    listener: Option<Listener>,
}

fn default_rule(topic: Topic) -> LinkRule {
    match topic {
        Topic::Lex | Topic::Parse | Topic::Compile | Topic::Output | Topic::Render => {
            LinkRule::OwnEvent
        }
        Topic::Html => LinkRule::CurrentRender,
        Topic::Token
        | Topic::Document
        | Topic::StateEnter
        | Topic::StateLeave
        | Topic::StateStore
        | Topic::Node
        | Topic::Element
        | Topic::DependencyStorage
        | Topic::Format
        | Topic::Display => LinkRule::Subject,
    }
}

/// Routes phase events from producers to the trace.
///
/// Each topic has exactly one handler. The handler attaches the most specific correlatable
/// entity as the event's link, derives its location, then runs the topic listener (if any),
/// which may veto recording.
pub struct EventBus {
    handlers: HashMap<Topic, Handler>,
    next_id: u64,
    current_render: Option<EventId>,
}

impl EventBus {
    /// Bus with the default handler for every topic.
    pub fn new() -> Self {
        let handlers = Topic::ALL
            .iter()
            .map(|&topic| {
                (
                    topic,
                    Handler {
                        rule: default_rule(topic),
                        listener: None,
                    },
                )
            })
            .collect();
        Self {
            handlers,
            next_id: 0,
            current_render: None,
        }
    }

    /// Install the listener for `topic`, replacing any previous one.
    pub fn on(&mut self, topic: Topic, listener: Listener) {
        if let Some(handler) = self.handlers.get_mut(&topic) {
            handler.listener = Some(listener);
        }
    }

    /// Veto every event on `topic`.
    pub fn mute(&mut self, topic: Topic) {
        self.on(topic, Box::new(|_| Verdict::Skip));
    }

    /// Remove the listener for `topic`; events are recorded as enriched.
    pub fn clear_listener(&mut self, topic: Topic) {
        if let Some(handler) = self.handlers.get_mut(&topic) {
            handler.listener = None;
        }
    }

    /// Forget per-pass state (id counter, current render).
    pub fn reset(&mut self) {
        self.next_id = 0;
        self.current_render = None;
    }

    /// Attach link and location, then ask the topic listener. `None` means vetoed.
    pub fn enrich(&mut self, raw: PhaseEvent, timestamp: f64) -> Option<Event> {
        let id = EventId(self.next_id);
        self.next_id += 1;

        let handler = self.handlers.get_mut(&raw.topic)?;
        let link = match (handler.rule, raw.subject) {
            (LinkRule::Subject, Subject::Token(token)) => Link::Token(token),
            (LinkRule::Subject, Subject::Node(node)) => Link::Node(node),
            (LinkRule::CurrentRender, _) => Link::Event(self.current_render.unwrap_or(id)),
            _ => Link::Event(id),
        };
        let location = link.location().cloned();

        let mut event = Event {
            id,
            topic: raw.topic,
            timestamp,
            params: raw.params,
            link,
            location,
        };

        if let Some(listener) = handler.listener.as_mut() {
            if listener(&mut event) == Verdict::Skip {
                tracing::trace!(topic = raw.topic.name(), "EventBus: vetoed");
                return None;
            }
        }

        if raw.topic == Topic::Render {
            self.current_render = Some(id);
        }
        Some(event)
    }

    /// Enrich `raw` and record it through `guard` into `log`.
    ///
    /// Returns immediately once the log is locked, so a dead trace never re-checks budgets.
    pub fn dispatch(
        &mut self,
        raw: PhaseEvent,
        log: &mut EventLog,
        guard: &ResourceGuard,
    ) -> ScopeResult<()> {
        if log.is_locked() {
            return Ok(());
        }
        let timestamp = guard.elapsed();
        let Some(event) = self.enrich(raw, timestamp) else {
            return Ok(());
        };
        guard.check(log, event.location.as_ref())?;
        log.append(event);
        Ok(())
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/trace/bus.rs"]
mod tests;
