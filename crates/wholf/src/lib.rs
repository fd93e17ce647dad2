//! # Wholf
//!
//! A lexer, parser and tree-walking interpreter for Wholf, a small
//! dynamically typed scripting language with JavaScript-like syntax.
//!
//! ## Architecture
//!
//! - **Lexer** ([`lexer`]): source text to positioned tokens; lexical
//!   errors travel as error tokens
//! - **Parser** ([`parser`]): precedence climbing for expressions, recursive
//!   descent for statements, with error recovery
//! - **Evaluator** ([`eval`]): walks the [`ast`] against an [`Environment`]
//!   of nested lexical scopes
//! - **Host services** ([`host`]): console output and file storage behind a
//!   trait object
//!
//! ## Example
//!
//! ```
//! use wholf::{execute, Value};
//!
//! let source = r#"
//!     function fact(n) { if (n <= 1) return 1; return n * fact(n - 1); }
//!     fact(10);
//! "#;
//! assert_eq!(execute(source).unwrap(), Value::Integer(3628800));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod context;
pub mod diagnostic;
pub mod environment;
pub mod error;
pub mod eval;
pub mod host;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod stack;
pub mod value;

// Re-export main types
pub use context::{EvalContext, DEFAULT_MAX_CALL_DEPTH};
pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use environment::{Binding, BindingMode, Environment, ScopeGuard};
pub use error::{EnvironmentError, LexError, ParseError, Result, RuntimeError, SyntaxError};
pub use eval::{eval_block, eval_expr, ControlFlow, Evaluate};
pub use host::{BufferHost, Host, HostError, StdHost};
pub use interpreter::{execute, execute_with, run, Interpreter};
pub use lexer::{scan, Span, Token, TokenKind};
pub use parser::{parse, parse_source};
pub use value::{BuiltinFn, BuiltinFnPtr, ClassValue, FunctionValue, InstanceValue, Value};

/// Wholf version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}
