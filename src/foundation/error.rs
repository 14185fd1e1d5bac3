use crate::foundation::core::SourceLocation;

/// Convenience result type used across renderscope.
pub type ScopeResult<T> = Result<T, ScopeError>;

/// Failure raised while executing generated template output.
///
/// Adapters fill in what they know: the error type name, its message and the line of generated
/// output that failed. `location` is only set when the failure already points into the template.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
#[error("{message}")]
pub struct RuntimeFailure {
    /// Error type name, e.g. `DivisionByZeroError`.
    pub kind: String,
    /// Human-readable message.
    pub message: String,
    /// 1-based line of generated output that was executing.
    pub generated_line: Option<usize>,
    /// Template location, when the failure is already resolved.
    pub location: Option<SourceLocation>,
    /// Execution trace, innermost frame first.
    pub trace: Vec<String>,
    /// Output bytes captured before the failure.
    pub output: String,
}

impl RuntimeFailure {
    /// Build a failure with a type name and message.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            generated_line: None,
            location: None,
            trace: Vec::new(),
            output: String::new(),
        }
    }

    /// Set the generated-output line that failed.
    pub fn at_generated_line(mut self, line: usize) -> Self {
        self.generated_line = Some(line);
        self
    }

    /// Mark the failure as already located in the template.
    pub fn located(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Attach the execution trace.
    pub fn with_trace(mut self, trace: Vec<String>) -> Self {
        self.trace = trace;
        self
    }

    /// Attach captured output.
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }
}

/// Top-level error taxonomy.
#[derive(thiserror::Error, Debug)]
pub enum ScopeError {
    /// A time or memory budget was exceeded; fatal to the current render.
    #[error("{message}")]
    BudgetExceeded {
        /// Violation message, e.g. `execution_max_time of 3ms exceeded.`
        message: String,
        /// Location of the event that tripped the budget, when it carried one.
        location: Option<SourceLocation>,
    },

    /// Failure while executing generated output.
    #[error(transparent)]
    Runtime(#[from] RuntimeFailure),

    /// A failure enriched with template context.
    #[error("{message}")]
    Diagnostic {
        /// Full diagnostic text (header and code excerpt).
        message: String,
        /// The failure that was enriched.
        #[source]
        source: Box<ScopeError>,
    },

    /// Failure while producing a report or diagnostic.
    #[error("formatting error: {0}")]
    Formatting(String),

    /// Invalid renderer or profiler configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Wrapped lower-level error from collaborators or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScopeError {
    /// Build a [`ScopeError::BudgetExceeded`] value.
    pub fn budget(message: impl Into<String>, location: Option<SourceLocation>) -> Self {
        Self::BudgetExceeded {
            message: message.into(),
            location,
        }
    }

    /// Build a [`ScopeError::Formatting`] value.
    pub fn formatting(msg: impl Into<String>) -> Self {
        Self::Formatting(msg.into())
    }

    /// Build a [`ScopeError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Template location carried by the error itself, if any.
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::BudgetExceeded { location, .. } => location.as_ref(),
            Self::Runtime(failure) => failure.location.as_ref(),
            Self::Diagnostic { source, .. } => source.location(),
            _ => None,
        }
    }

    /// Name shown in diagnostic headers.
    pub fn kind_name(&self) -> &str {
        match self {
            Self::BudgetExceeded { .. } => "BudgetExceeded",
            Self::Runtime(failure) => &failure.kind,
            Self::Diagnostic { .. } => "Diagnostic",
            Self::Formatting(_) => "FormattingFailure",
            Self::Config(_) => "ConfigError",
            Self::Other(_) => "Error",
        }
    }

    /// Bare message without the variant prefix.
    pub fn bare_message(&self) -> String {
        match self {
            Self::BudgetExceeded { message, .. } | Self::Diagnostic { message, .. } => {
                message.clone()
            }
            Self::Runtime(failure) => failure.message.clone(),
            Self::Formatting(msg) | Self::Config(msg) => msg.clone(),
            Self::Other(err) => err.to_string(),
        }
    }

    /// Execution trace lines, when the error came from generated output.
    pub fn trace(&self) -> &[String] {
        match self {
            Self::Runtime(failure) => &failure.trace,
            Self::Diagnostic { source, .. } => source.trace(),
            _ => &[],
        }
    }

    /// True for [`ScopeError::BudgetExceeded`], including when wrapped in a diagnostic.
    pub fn is_budget_exceeded(&self) -> bool {
        match self {
            Self::BudgetExceeded { .. } => true,
            Self::Diagnostic { source, .. } => source.is_budget_exceeded(),
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
