use std::sync::Arc;

use crate::foundation::core::SourceLocation;

/// Ordered parameter map carried by every event.
pub type Params = serde_json::Map<String, serde_json::Value>;

/// Pipeline stage that produced an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Tokenizer.
    Lexer,
    /// AST builder.
    Parser,
    /// AST to element tree.
    Compiler,
    /// Element tree to generated code.
    Formatter,
    /// Execution of generated code.
    Renderer,
}

/// Phase topic. Every topic has exactly one handler on the [`EventBus`](crate::EventBus).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    /// Lexing of a whole input started.
    Lex,
    /// A token was produced.
    Token,
    /// Parsing of a whole input started.
    Parse,
    /// The document root node was created.
    Document,
    /// Parser entered a node state.
    StateEnter,
    /// Parser left a node state.
    StateLeave,
    /// Parser stored a node.
    StateStore,
    /// Compilation of a whole document started.
    Compile,
    /// A node was compiled.
    Node,
    /// An element was produced by the compiler.
    Element,
    /// Compiler produced its final output.
    Output,
    /// Formatter dependency storage was touched.
    DependencyStorage,
    /// An element was formatted into generated code.
    Format,
    /// A render pass started.
    Render,
    /// A debug marker fired while executing generated output.
    Display,
    /// Output was produced by a render pass.
    Html,
}

impl Topic {
    /// Every topic, in pipeline order.
    pub const ALL: [Topic; 16] = [
        Topic::Lex,
        Topic::Token,
        Topic::Parse,
        Topic::Document,
        Topic::StateEnter,
        Topic::StateLeave,
        Topic::StateStore,
        Topic::Compile,
        Topic::Node,
        Topic::Element,
        Topic::Output,
        Topic::DependencyStorage,
        Topic::Format,
        Topic::Render,
        Topic::Display,
        Topic::Html,
    ];

    /// Stage that emits this topic.
    pub fn stage(self) -> Stage {
        match self {
            Topic::Lex | Topic::Token => Stage::Lexer,
            Topic::Parse
            | Topic::Document
            | Topic::StateEnter
            | Topic::StateLeave
            | Topic::StateStore => Stage::Parser,
            Topic::Compile | Topic::Node | Topic::Element | Topic::Output => Stage::Compiler,
            Topic::DependencyStorage | Topic::Format => Stage::Formatter,
            Topic::Render | Topic::Display | Topic::Html => Stage::Renderer,
        }
    }

    /// Stable topic name, e.g. `lexer.token`.
    pub fn name(self) -> &'static str {
        match self {
            Topic::Lex => "lexer.lex",
            Topic::Token => "lexer.token",
            Topic::Parse => "parser.parse",
            Topic::Document => "parser.document",
            Topic::StateEnter => "parser.state_enter",
            Topic::StateLeave => "parser.state_leave",
            Topic::StateStore => "parser.state_store",
            Topic::Compile => "compiler.compile",
            Topic::Node => "compiler.node",
            Topic::Element => "compiler.element",
            Topic::Output => "compiler.output",
            Topic::DependencyStorage => "formatter.dependency_storage",
            Topic::Format => "formatter.format",
            Topic::Render => "renderer.render",
            Topic::Display => "renderer.display",
            Topic::Html => "renderer.html",
        }
    }
}

/// Lexer token categories the timeline cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Line break.
    NewLine,
    /// Indentation increase.
    Indent,
    /// Indentation decrease.
    Outdent,
    /// Opening of an attribute list.
    AttributeStart,
    /// Closing of an attribute list.
    AttributeEnd,
    /// Raw text.
    Text,
    /// Element tag.
    Tag,
    /// Anything else.
    Other,
}

impl TokenKind {
    /// Symbol and display name for structural tokens that render as point markers.
    pub fn marker(self) -> Option<(&'static str, &'static str)> {
        match self {
            TokenKind::NewLine => Some(("↩", "new line")),
            TokenKind::Indent => Some(("→", "indent")),
            TokenKind::Outdent => Some(("←", "outdent")),
            TokenKind::AttributeStart => Some(("(", "attributes start")),
            TokenKind::AttributeEnd => Some((")", "attributes end")),
            _ => None,
        }
    }
}

/// A lexer token as seen by the profiler.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Token {
    /// Token category.
    pub kind: TokenKind,
    /// Declared name (tag name, keyword), if any.
    pub name: Option<String>,
    /// Where the token starts.
    pub location: Option<SourceLocation>,
}

impl Token {
    /// Token of `kind` without name or location.
    pub fn new(kind: TokenKind) -> Self {
        Self {
            kind,
            name: None,
            location: None,
        }
    }

    /// Attach a declared name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach a source location.
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

/// AST node categories the timeline cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Root node.
    Document,
    /// Element node.
    Element,
    /// Text node.
    Text,
    /// Code node.
    Code,
    /// Mixin definition.
    Mixin,
    /// Mixin invocation.
    MixinCall,
    /// Anything else.
    Other,
}

/// An AST node as seen by the profiler.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Node {
    /// Node category.
    pub kind: NodeKind,
    /// Declared name (element or mixin name), if any.
    pub name: Option<String>,
    /// Where the node starts.
    pub location: Option<SourceLocation>,
}

impl Node {
    /// Node of `kind` without name or location.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            name: None,
            location: None,
        }
    }

    /// Attach a declared name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach a source location.
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

/// Entity a producer attaches to a phase event.
#[derive(Clone, Debug, Default)]
pub enum Subject {
    #[default]
    /// No entity.
    None,
    /// A lexer token.
    Token(Arc<Token>),
    /// An AST node.
    Node(Arc<Node>),
}

/// Sequential id assigned to every enriched event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct EventId(pub u64);

/// Entity an event correlates to on the timeline.
#[derive(Clone, Debug)]
pub enum Link {
    /// A lexer token.
    Token(Arc<Token>),
    /// An AST node.
    Node(Arc<Node>),
    /// The event itself, or the event it belongs to (an `Html` event links to its `Render`).
    Event(EventId),
}

/// Identity of a [`Link`]: two links are the same timeline row iff their keys are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LinkKey {
    /// Token allocation address.
    Token(usize),
    /// Node allocation address.
    Node(usize),
    /// Event id.
    Event(u64),
}

impl Link {
    /// Identity key. Token and node links compare by allocation, never by value.
    pub fn key(&self) -> LinkKey {
        match self {
            Link::Token(t) => LinkKey::Token(Arc::as_ptr(t) as usize),
            Link::Node(n) => LinkKey::Node(Arc::as_ptr(n) as usize),
            Link::Event(id) => LinkKey::Event(id.0),
        }
    }

    /// Location of the linked entity.
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Link::Token(t) => t.location.as_ref(),
            Link::Node(n) => n.location.as_ref(),
            Link::Event(_) => None,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Link::Token(t) => serde_json::json!({ "token": t.as_ref() }),
            Link::Node(n) => serde_json::json!({ "node": n.as_ref() }),
            Link::Event(id) => serde_json::json!({ "event": id.0 }),
        }
    }
}

/// Raw event handed to the bus by a pipeline stage.
#[derive(Clone, Debug)]
pub struct PhaseEvent {
    /// Topic the event is published on.
    pub topic: Topic,
    /// Producer parameters.
    pub params: Params,
    /// Entity the event concerns.
    pub subject: Subject,
}

impl PhaseEvent {
    /// Event on `topic` with no parameters or subject.
    pub fn new(topic: Topic) -> Self {
        Self {
            topic,
            params: Params::new(),
            subject: Subject::None,
        }
    }

    /// Append a parameter.
    pub fn with_param(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Attach a token subject.
    pub fn token(mut self, token: &Arc<Token>) -> Self {
        self.subject = Subject::Token(Arc::clone(token));
        self
    }

    /// Attach a node subject.
    pub fn node(mut self, node: &Arc<Node>) -> Self {
        self.subject = Subject::Node(Arc::clone(node));
        self
    }
}

/// Recorded event. Immutable once appended to an [`EventLog`](crate::EventLog).
#[derive(Clone, Debug)]
pub struct Event {
    /// Sequential id within the trace.
    pub id: EventId,
    /// Topic the event was published on.
    pub topic: Topic,
    /// Seconds since the trace baseline.
    pub timestamp: f64,
    /// Producer parameters plus listener additions.
    pub params: Params,
    /// Correlated entity.
    pub link: Link,
    /// Template location derived from the link.
    pub location: Option<SourceLocation>,
}

impl Event {
    /// Machine-readable dump used by the timeline report.
    pub fn dump(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id.0,
            "topic": self.topic.name(),
            "time": self.timestamp,
            "params": self.params,
            "link": self.link.to_json(),
            "location": self.location,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/trace/event.rs"]
mod tests;
