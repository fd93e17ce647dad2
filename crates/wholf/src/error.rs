//! Error types for lexing, parsing and evaluation
//!
//! The three kinds are kept apart: [`LexError`] travels inside error tokens,
//! [`ParseError`] is collected per declaration, and [`RuntimeError`] aborts
//! the running statement.

use thiserror::Error;

use crate::eval::ControlFlow;
use crate::host::HostError;
use crate::lexer::{Span, Token};
use crate::value::Value;

// ═══════════════════════════════════════════════════════════════════════
// Lexing and Parsing
// ═══════════════════════════════════════════════════════════════════════

/// A lexical error, carried by a [`crate::lexer::TokenKind::Error`] token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// String literal without a closing quote
    #[error("unterminated string")]
    UnterminatedString,

    /// Block comment without a closing `*/`
    #[error("unterminated block comment")]
    UnterminatedComment,

    /// A character that starts no token
    #[error("unexpected character `{0}`")]
    UnexpectedCharacter(char),
}

/// A grammar error: the offending token and what was expected instead.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}, found {}", token.describe())]
pub struct ParseError {
    /// Description of the expected construct
    pub message: String,

    /// The token where parsing failed
    pub token: Token,
}

impl ParseError {
    /// Create a parse error at `token`.
    pub fn new(token: Token, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            token,
        }
    }

    /// Position of the offending token.
    pub fn span(&self) -> Span {
        self.token.span()
    }
}

/// Any error reported by [`crate::parser::parse`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    /// Surfaced from a lexer error token
    #[error("{error}")]
    Lex {
        /// What went wrong
        error: LexError,
        /// Where the bad construct starts
        span: Span,
    },

    /// Grammar error
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl SyntaxError {
    /// Source position of the error.
    pub fn span(&self) -> Span {
        match self {
            SyntaxError::Lex { span, .. } => *span,
            SyntaxError::Parse(err) => err.span(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Environment Errors
// ═══════════════════════════════════════════════════════════════════════

/// Errors raised by [`crate::Environment`] operations.
///
/// These carry no position; the evaluator attaches one when converting to
/// [`RuntimeError`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    /// Name not bound in any enclosing scope
    #[error("undefined variable `{name}`")]
    UndefinedVariable {
        /// The unresolved name
        name: String,
    },

    /// Assignment to a `const` binding
    #[error("cannot assign to constant `{name}`")]
    ImmutableBinding {
        /// The constant's name
        name: String,
    },

    /// Too many nested calls
    #[error("stack overflow: call depth {depth} exceeds limit {max}")]
    StackOverflow {
        /// Depth reached
        depth: usize,
        /// Configured maximum
        max: usize,
    },
}

// ═══════════════════════════════════════════════════════════════════════
// Runtime Errors
// ═══════════════════════════════════════════════════════════════════════

/// Errors raised while evaluating a program.
///
/// [`RuntimeError::ControlFlow`] is the unwinding channel for
/// `return`/`break`/`continue`; it is absorbed at function and loop
/// boundaries and never escapes [`crate::run`].
#[derive(Error, Debug, Clone)]
pub enum RuntimeError {
    /// Reference to a name that is not bound
    #[error("undefined variable `{name}`")]
    UndefinedVariable {
        /// The unresolved name
        name: String,
        /// Where it was referenced
        span: Option<Span>,
    },

    /// Assignment to a `const` binding
    #[error("cannot assign to constant `{name}`")]
    ImmutableBinding {
        /// The constant's name
        name: String,
        /// Where the assignment happened
        span: Option<Span>,
    },

    /// Generic type mismatch
    #[error("type error: {message}")]
    TypeError {
        /// Description of the mismatch
        message: String,
        /// Where it happened
        span: Option<Span>,
    },

    /// Operator applied to unsupported operand kinds
    #[error("cannot apply `{op}` to `{left_type}` and `{right_type}`")]
    InvalidBinaryOperands {
        /// The operator
        op: String,
        /// Kind of the left operand
        left_type: String,
        /// Kind of the right operand
        right_type: String,
        /// Where it happened
        span: Option<Span>,
    },

    /// Prefix operator applied to an unsupported operand kind
    #[error("cannot apply `{op}` to `{operand_type}`")]
    InvalidUnaryOperand {
        /// The operator
        op: String,
        /// Kind of the operand
        operand_type: String,
        /// Where it happened
        span: Option<Span>,
    },

    /// Call with the wrong number of arguments
    #[error("`{name}` expects {expected} argument(s), got {got}")]
    ArityMismatch {
        /// Parameter count
        expected: usize,
        /// Argument count
        got: usize,
        /// Called function
        name: String,
        /// Where the call happened
        span: Option<Span>,
    },

    /// Integer arithmetic overflowed `i64`
    #[error("integer overflow")]
    IntegerOverflow {
        /// Where it happened
        span: Option<Span>,
    },

    /// Division or remainder by zero
    #[error("division by zero")]
    DivisionByZero {
        /// Where it happened
        span: Option<Span>,
    },

    /// Missing property on an object or instance
    #[error("`{type_name}` has no property `{field}`")]
    UndefinedField {
        /// Property name
        field: String,
        /// Kind (or class name) of the accessed value
        type_name: String,
        /// Where it happened
        span: Option<Span>,
    },

    /// Array or string index outside its bounds
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// Requested index
        index: i64,
        /// Container length
        len: usize,
        /// Where it happened
        span: Option<Span>,
    },

    /// `break` reached a function boundary or top level
    #[error("`break` outside of a loop")]
    BreakOutsideLoop {
        /// Where the `break` was
        span: Option<Span>,
    },

    /// `continue` reached a function boundary or top level
    #[error("`continue` outside of a loop")]
    ContinueOutsideLoop {
        /// Where the `continue` was
        span: Option<Span>,
    },

    /// Call depth limit exceeded
    #[error("stack overflow: call depth {depth} exceeds limit {max}")]
    StackOverflow {
        /// Depth reached
        depth: usize,
        /// Configured maximum
        max: usize,
        /// Where the failing call happened
        span: Option<Span>,
    },

    /// Evaluation was interrupted through [`crate::EvalContext::interrupt`]
    #[error("evaluation interrupted")]
    Interrupted {
        /// Statement or expression about to run
        span: Option<Span>,
    },

    /// Host file or console service failed
    #[error("host I/O failure: {message}")]
    HostIo {
        /// Underlying error message
        message: String,
        /// Where the built-in was called
        span: Option<Span>,
    },

    /// A built-in function rejected its arguments
    #[error("{name}: {message}")]
    BuiltinError {
        /// Built-in name
        name: String,
        /// What went wrong
        message: String,
        /// Where it was called
        span: Option<Span>,
    },

    /// Control-flow signal (not a real error)
    #[error("unexpected control flow")]
    ControlFlow(ControlFlow),
}

impl RuntimeError {
    /// The source position of the error, if known.
    pub fn span(&self) -> Option<Span> {
        match self {
            RuntimeError::UndefinedVariable { span, .. }
            | RuntimeError::ImmutableBinding { span, .. }
            | RuntimeError::TypeError { span, .. }
            | RuntimeError::InvalidBinaryOperands { span, .. }
            | RuntimeError::InvalidUnaryOperand { span, .. }
            | RuntimeError::ArityMismatch { span, .. }
            | RuntimeError::IntegerOverflow { span }
            | RuntimeError::DivisionByZero { span }
            | RuntimeError::UndefinedField { span, .. }
            | RuntimeError::IndexOutOfBounds { span, .. }
            | RuntimeError::BreakOutsideLoop { span }
            | RuntimeError::ContinueOutsideLoop { span }
            | RuntimeError::StackOverflow { span, .. }
            | RuntimeError::HostIo { span, .. }
            | RuntimeError::Interrupted { span }
            | RuntimeError::BuiltinError { span, .. } => *span,
            RuntimeError::ControlFlow(_) => None,
        }
    }

    /// Attach `at` as the position if the error has none yet.
    pub fn with_span(mut self, at: Span) -> Self {
        match &mut self {
            RuntimeError::UndefinedVariable { span, .. }
            | RuntimeError::ImmutableBinding { span, .. }
            | RuntimeError::TypeError { span, .. }
            | RuntimeError::InvalidBinaryOperands { span, .. }
            | RuntimeError::InvalidUnaryOperand { span, .. }
            | RuntimeError::ArityMismatch { span, .. }
            | RuntimeError::IntegerOverflow { span }
            | RuntimeError::DivisionByZero { span }
            | RuntimeError::UndefinedField { span, .. }
            | RuntimeError::IndexOutOfBounds { span, .. }
            | RuntimeError::BreakOutsideLoop { span }
            | RuntimeError::ContinueOutsideLoop { span }
            | RuntimeError::StackOverflow { span, .. }
            | RuntimeError::HostIo { span, .. }
            | RuntimeError::Interrupted { span }
            | RuntimeError::BuiltinError { span, .. } => {
                if span.is_none() {
                    *span = Some(at);
                }
            }
            RuntimeError::ControlFlow(_) => {}
        }
        self
    }
}

impl From<EnvironmentError> for RuntimeError {
    fn from(err: EnvironmentError) -> Self {
        match err {
            EnvironmentError::UndefinedVariable { name } => {
                RuntimeError::UndefinedVariable { name, span: None }
            }
            EnvironmentError::ImmutableBinding { name } => {
                RuntimeError::ImmutableBinding { name, span: None }
            }
            EnvironmentError::StackOverflow { depth, max } => RuntimeError::StackOverflow {
                depth,
                max,
                span: None,
            },
        }
    }
}

/// Failure returned by a built-in function body.
///
/// The caller turns it into a positioned [`RuntimeError`].
#[derive(Error, Debug)]
pub enum NativeError {
    /// A host service failed
    #[error(transparent)]
    Host(#[from] HostError),

    /// The arguments were unusable
    #[error("{0}")]
    Message(String),
}

impl NativeError {
    /// Convert into a runtime error attributed to built-in `name`.
    pub fn into_runtime(self, name: &str, span: Option<Span>) -> RuntimeError {
        match self {
            NativeError::Host(err) => RuntimeError::HostIo {
                message: err.to_string(),
                span,
            },
            NativeError::Message(message) => RuntimeError::BuiltinError {
                name: name.to_string(),
                message,
                span,
            },
        }
    }
}

/// Get the language-level kind name of a value, for error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Undefined => "undefined",
        Value::Null => "null",
        Value::Boolean(_) => "boolean",
        Value::Integer(_) => "integer",
        Value::Float(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
        Value::Function(_) | Value::BuiltinFn(_) => "function",
        Value::Class(_) => "class",
        Value::Instance(_) => "instance",
    }
}

/// Result type alias for evaluation.
pub type Result<T> = std::result::Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_span_fills_missing_position() {
        let err = RuntimeError::DivisionByZero { span: None }.with_span(Span::new(2, 4));
        assert_eq!(err.span(), Some(Span::new(2, 4)));
    }

    #[test]
    fn test_with_span_keeps_existing_position() {
        let err = RuntimeError::DivisionByZero {
            span: Some(Span::new(1, 1)),
        }
        .with_span(Span::new(9, 9));
        assert_eq!(err.span(), Some(Span::new(1, 1)));
    }

    #[test]
    fn test_environment_error_conversion() {
        let err: RuntimeError = EnvironmentError::UndefinedVariable {
            name: "x".to_string(),
        }
        .into();
        assert!(matches!(err, RuntimeError::UndefinedVariable { ref name, span: None } if name == "x"));
    }

    #[test]
    fn test_parse_error_display_names_found_token() {
        let token = Token::new(crate::lexer::TokenKind::Eof, "", 1, 4);
        let err = ParseError::new(token, "expected expression");
        assert_eq!(err.to_string(), "expected expression, found end of input");
    }

    #[test]
    fn test_type_name() {
        assert_eq!(type_name(&Value::Integer(1)), "integer");
        assert_eq!(type_name(&Value::string("a")), "string");
        assert_eq!(type_name(&Value::Undefined), "undefined");
    }
}
