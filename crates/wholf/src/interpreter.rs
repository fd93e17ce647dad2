//! Pipeline entry points: source text in, value or diagnostics out
//!
//! [`execute`] and [`execute_with`] run a snippet in a fresh environment.
//! [`Interpreter`] keeps one global environment across calls, the way a
//! REPL session does.

use tracing::debug;

use crate::ast::Program;
use crate::diagnostic::Diagnostic;
use crate::error::RuntimeError;
use crate::eval::{control, eval_stmts};
use crate::lexer::scan;
use crate::parser::parse;
use crate::{Environment, EvalContext, Value};

/// Evaluate a parsed program against `env`.
///
/// Yields the value of the last top-level statement, the value of a
/// top-level `return`, or `undefined` for an empty program. The call depth
/// limit is taken from `ctx`.
pub fn run(program: &Program, env: &mut Environment, ctx: &EvalContext) -> Result<Value, RuntimeError> {
    env.set_max_call_depth(ctx.max_call_depth);
    let result = eval_stmts(&program.statements, env, ctx);
    control::program_result(result)
}

/// Lex, parse and run `source` in a fresh environment with the standard
/// built-ins and a default context.
///
/// # Example
///
/// ```
/// use wholf::{execute, Value};
///
/// assert_eq!(execute("1 + 2 * 3;").unwrap(), Value::Integer(7));
/// assert!(execute("1 +").is_err());
/// ```
pub fn execute(source: &str) -> Result<Value, Vec<Diagnostic>> {
    execute_with(source, &EvalContext::default())
}

/// Like [`execute`], with a caller-supplied context (host, limits).
pub fn execute_with(source: &str, ctx: &EvalContext) -> Result<Value, Vec<Diagnostic>> {
    let mut env = Environment::with_prelude();
    run_source(source, &mut env, ctx)
}

fn run_source(source: &str, env: &mut Environment, ctx: &EvalContext) -> Result<Value, Vec<Diagnostic>> {
    let tokens = scan(source);
    debug!(tokens = tokens.len(), "scanned");

    let program = parse(tokens).map_err(|errors| {
        debug!(diagnostics = errors.len(), "parse failed");
        errors.iter().map(Diagnostic::from).collect::<Vec<_>>()
    })?;
    debug!(statements = program.statements.len(), "parsed");

    run(&program, env, ctx).map_err(|error| {
        debug!(%error, "evaluation failed");
        vec![Diagnostic::from(error)]
    })
}

// ═══════════════════════════════════════════════════════════════════════
// Interpreter Session
// ═══════════════════════════════════════════════════════════════════════

/// An interpreter session with a persistent global environment.
///
/// Bindings made by one [`Interpreter::execute`] call are visible to the
/// next. A failed call keeps whatever bindings it made before failing.
///
/// # Example
///
/// ```
/// use wholf::{Interpreter, Value};
///
/// let mut interp = Interpreter::new();
/// interp.execute("let x = 20;").unwrap();
/// assert_eq!(interp.execute("x + 1;").unwrap(), Value::Integer(21));
/// ```
#[derive(Debug)]
pub struct Interpreter {
    env: Environment,
    ctx: EvalContext,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Create a session with the standard built-ins and a default context.
    pub fn new() -> Self {
        Self::with_context(EvalContext::default())
    }

    /// Create a session with a caller-supplied context.
    pub fn with_context(ctx: EvalContext) -> Self {
        Self {
            env: Environment::with_prelude(),
            ctx,
        }
    }

    /// Run `source` against the session's environment.
    pub fn execute(&mut self, source: &str) -> Result<Value, Vec<Diagnostic>> {
        // A previous interrupt must not poison the next input
        self.ctx.reset_interrupt();
        run_source(source, &mut self.env, &self.ctx)
    }

    /// The session's environment.
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Mutable access to the session's environment, e.g. to define extra
    /// built-ins.
    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// The session's evaluation context.
    pub fn context(&self) -> &EvalContext {
        &self.ctx
    }

    /// Drop every binding and reload the built-ins.
    pub fn reset(&mut self) {
        self.env.clear();
        self.env.load_prelude();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticKind;

    #[test]
    fn test_execute_reports_parse_errors() {
        let diagnostics = execute("1 +").unwrap_err();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::Parse);
        assert_eq!(diagnostics[0].line, 1);
    }

    #[test]
    fn test_execute_reports_runtime_error() {
        let diagnostics = execute("let a = 1;\nnope;").unwrap_err();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::Runtime);
        assert_eq!((diagnostics[0].line, diagnostics[0].column), (2, 1));
    }

    #[test]
    fn test_execute_is_idempotent() {
        let source = "let a = [1, 2]; a[0] = a[0] + 1; a;";
        assert_eq!(execute(source).unwrap(), execute(source).unwrap());
    }

    #[test]
    fn test_session_keeps_bindings() {
        let mut interp = Interpreter::new();
        interp.execute("function twice(x) { return x * 2; }").unwrap();
        assert_eq!(interp.execute("twice(4);").unwrap(), Value::Integer(8));
    }

    #[test]
    fn test_session_survives_errors() {
        let mut interp = Interpreter::new();
        assert!(interp.execute("let ok = 1; 1 / 0;").is_err());
        assert_eq!(interp.execute("ok;").unwrap(), Value::Integer(1));
        assert!(interp.environment().is_global_scope());
    }

    #[test]
    fn test_reset_clears_user_bindings() {
        let mut interp = Interpreter::new();
        interp.execute("let gone = 1;").unwrap();
        interp.reset();
        assert!(!interp.environment().contains("gone"));
        assert!(interp.environment().contains("print"));
    }

    #[test]
    fn test_interrupt_diagnostic_has_position() {
        let ctx = EvalContext::new();
        ctx.interrupt();
        let diagnostics = execute_with("\n  while (true) {}", &ctx).unwrap_err();
        assert_eq!(diagnostics[0].message, "evaluation interrupted");
        assert_eq!((diagnostics[0].line, diagnostics[0].column), (2, 3));
    }

    #[test]
    fn test_deeply_nested_statements_run() {
        let depth = 3000;
        let blocks = format!("{}7;{}", "{ ".repeat(depth), " }".repeat(depth));
        assert_eq!(execute(&blocks).unwrap(), Value::Integer(7));

        let chain = format!("{}7;", "if (1) ".repeat(20_000));
        assert_eq!(execute(&chain).unwrap(), Value::Integer(7));
    }

    #[test]
    fn test_session_context_limits_depth() {
        let mut interp = Interpreter::with_context(EvalContext::with_max_call_depth(5));
        let diagnostics = interp
            .execute("function f(n) { return f(n + 1); } f(0);")
            .unwrap_err();
        assert!(diagnostics[0].message.contains("stack overflow"));
    }
}
