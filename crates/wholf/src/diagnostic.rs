//! User-facing diagnostics
//!
//! Every error that reaches [`crate::execute`] is flattened into a
//! [`Diagnostic`] so front ends can print or serialize it uniformly.

use std::fmt;

use serde::Serialize;

use crate::error::{RuntimeError, SyntaxError};

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Execution did not complete
    Error,
}

/// Which stage produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    /// Lexical error
    Lex,
    /// Grammar error
    Parse,
    /// Evaluation error
    Runtime,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Lex => write!(f, "lex error"),
            DiagnosticKind::Parse => write!(f, "parse error"),
            DiagnosticKind::Runtime => write!(f, "runtime error"),
        }
    }
}

/// A positioned error message.
///
/// `line` and `column` are 0 when the position is unknown (an interrupt,
/// for instance).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Always [`Severity::Error`] for now
    pub severity: Severity,
    /// Producing stage
    pub kind: DiagnosticKind,
    /// Rendered error message
    pub message: String,
    /// 1-indexed line
    pub line: usize,
    /// 1-indexed column
    pub column: usize,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(kind: DiagnosticKind, message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            message: message.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}: {}", self.kind, self.message)
        } else {
            write!(
                f,
                "[line {}, column {}] {}: {}",
                self.line, self.column, self.kind, self.message
            )
        }
    }
}

impl From<&SyntaxError> for Diagnostic {
    fn from(err: &SyntaxError) -> Self {
        let span = err.span();
        let kind = match err {
            SyntaxError::Lex { .. } => DiagnosticKind::Lex,
            SyntaxError::Parse(_) => DiagnosticKind::Parse,
        };
        Diagnostic::error(kind, err.to_string(), span.line, span.column)
    }
}

impl From<SyntaxError> for Diagnostic {
    fn from(err: SyntaxError) -> Self {
        Diagnostic::from(&err)
    }
}

impl From<&RuntimeError> for Diagnostic {
    fn from(err: &RuntimeError) -> Self {
        let (line, column) = err.span().map(|s| (s.line, s.column)).unwrap_or((0, 0));
        Diagnostic::error(DiagnosticKind::Runtime, err.to_string(), line, column)
    }
}

impl From<RuntimeError> for Diagnostic {
    fn from(err: RuntimeError) -> Self {
        Diagnostic::from(&err)
    }
}
