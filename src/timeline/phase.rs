use crate::trace::event::{Event, Link, NodeKind, Stage, TokenKind, Topic};

/// Semantic phase a timeline segment belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Tokenizing.
    Lexing,
    /// Building the AST.
    Parsing,
    /// Compiling nodes.
    Compiling,
    /// Producing generated code.
    Formatting,
    /// Executing generated code.
    Rendering,
}

impl Phase {
    /// Suffix shown after the link name.
    pub fn label(self) -> &'static str {
        match self {
            Phase::Lexing => "lexing",
            Phase::Parsing => "parsing",
            Phase::Compiling => "compiling",
            Phase::Formatting => "formatting",
            Phase::Rendering => "rendering",
        }
    }

    /// Display color of the phase.
    pub fn color(self) -> &'static str {
        match self {
            Phase::Lexing => "#7ec8e3",
            Phase::Parsing => "#a5d6a7",
            Phase::Compiling => "#ffcc80",
            Phase::Formatting => "#ce93d8",
            Phase::Rendering => "#ef9a9a",
        }
    }
}

/// Color of segments no rule classified, and of structural markers.
pub const NEUTRAL_COLOR: &str = "#d0d0d0";

#[derive(Clone, Copy, Debug)]
enum Matcher {
    Any,
    Topic(Topic),
    Stage(Stage),
}

impl Matcher {
    fn matches(self, event: &Event) -> bool {
        match self {
            Matcher::Any => true,
            Matcher::Topic(topic) => event.topic == topic,
            Matcher::Stage(stage) => event.topic.stage() == stage,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Naming {
    /// Phase label alone.
    Fixed,
    /// Link name followed by the phase label.
    Suffixed,
}

struct PhaseRule {
    previous: Matcher,
    current: Matcher,
    phase: Phase,
    naming: Naming,
}

/// (previous, current) → phase rules, first match wins.
const PHASE_RULES: &[PhaseRule] = &[
    PhaseRule {
        previous: Matcher::Topic(Topic::Lex),
        current: Matcher::Any,
        phase: Phase::Lexing,
        naming: Naming::Fixed,
    },
    PhaseRule {
        previous: Matcher::Any,
        current: Matcher::Topic(Topic::Html),
        phase: Phase::Rendering,
        naming: Naming::Fixed,
    },
    PhaseRule {
        previous: Matcher::Stage(Stage::Compiler),
        current: Matcher::Any,
        phase: Phase::Compiling,
        naming: Naming::Suffixed,
    },
    PhaseRule {
        previous: Matcher::Stage(Stage::Parser),
        current: Matcher::Any,
        phase: Phase::Parsing,
        naming: Naming::Suffixed,
    },
    PhaseRule {
        previous: Matcher::Stage(Stage::Formatter),
        current: Matcher::Any,
        phase: Phase::Formatting,
        naming: Naming::Suffixed,
    },
    PhaseRule {
        previous: Matcher::Stage(Stage::Lexer),
        current: Matcher::Any,
        phase: Phase::Lexing,
        naming: Naming::Suffixed,
    },
    PhaseRule {
        previous: Matcher::Stage(Stage::Renderer),
        current: Matcher::Any,
        phase: Phase::Rendering,
        naming: Naming::Suffixed,
    },
];

/// Base name of a link: declared name, `text` for text entities, mixin-prefixed for mixins.
pub fn link_name(link: &Link) -> Option<String> {
    match link {
        Link::Token(token) => match token.kind {
            TokenKind::Text => Some("text".to_string()),
            _ => token.name.clone(),
        },
        Link::Node(node) => match node.kind {
            NodeKind::Text => Some("text".to_string()),
            NodeKind::MixinCall => node.name.as_ref().map(|n| format!("+{n}")),
            NodeKind::Mixin => node.name.as_ref().map(|n| format!("mixin {n}")),
            _ => node.name.clone(),
        },
        Link::Event(_) => None,
    }
}

/// Label and phase of the segment spanning `previous` → `current` of a link named `base`.
pub fn classify(previous: &Event, current: &Event, base: Option<&str>) -> (String, Option<Phase>) {
    let rule = PHASE_RULES
        .iter()
        .find(|rule| rule.previous.matches(previous) && rule.current.matches(current));

    match (rule, base) {
        (Some(rule), Some(base)) if matches!(rule.naming, Naming::Suffixed) => {
            (format!("{base} {}", rule.phase.label()), Some(rule.phase))
        }
        (Some(rule), _) => (rule.phase.label().to_string(), Some(rule.phase)),
        (None, Some(base)) => (base.to_string(), None),
        (None, None) => (previous.topic.name().to_string(), None),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/phase.rs"]
mod tests;
