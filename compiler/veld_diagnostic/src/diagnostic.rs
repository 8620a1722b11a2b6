use std::fmt;

use veld_ir::Span;

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(formatter, "error"),
            Severity::Warning => write!(formatter, "warning"),
            Severity::Note => write!(formatter, "note"),
        }
    }
}

/// A labeled source region attached to a diagnostic.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

/// A structured diagnostic record.
///
/// Built with the fluent constructors:
///
/// ```
/// use veld_diagnostic::{Diagnostic, ErrorCode};
/// use veld_ir::Span;
///
/// let diag = Diagnostic::error(ErrorCode::E2101)
///     .with_message("enum base type must be an integral type")
///     .with_label(Span::new(10, 14), "declared here");
/// assert!(diag.is_error());
/// assert_eq!(diag.primary_span(), Some(Span::new(10, 14)));
/// ```
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    fn new(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: code.description().to_owned(),
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Create an error diagnostic.
    pub fn error(code: ErrorCode) -> Self {
        Self::new(code, Severity::Error)
    }

    /// Create a warning diagnostic.
    pub fn warning(code: ErrorCode) -> Self {
        Self::new(code, Severity::Warning)
    }

    /// Create a note diagnostic.
    pub fn note(code: ErrorCode) -> Self {
        Self::new(code, Severity::Note)
    }

    /// Replace the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach a labeled source region.
    #[must_use]
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label {
            span,
            message: message.into(),
        });
        self
    }

    /// Attach a free-standing note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// The first label's span, if any.
    pub fn primary_span(&self) -> Option<Span> {
        self.labels.first().map(|label| label.span)
    }

    /// Whether this diagnostic is an error.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
