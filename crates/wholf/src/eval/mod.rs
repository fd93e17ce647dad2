//! Expression and statement evaluation
//!
//! A direct tree walk: every node evaluates its children in source order
//! against the current [`Environment`]. Each node kind lives in its own
//! module; this module holds the [`Evaluate`] trait and the expression
//! dispatcher.

pub mod assign;
pub mod binary;
pub mod call;
pub mod control;
pub mod field;
pub mod function;
pub mod index;
pub mod item;
pub mod literal;
pub mod local;
pub mod loops;
pub mod stmt;
pub mod unary;

use crate::ast::{Expr, ExprKind};
use crate::error::RuntimeError;
use crate::stack::ensure_sufficient_stack;
use crate::{Environment, EvalContext, Value};

/// Trait for evaluating AST nodes to values.
///
/// This is the core abstraction for the tree-walking interpreter.
/// Expressions and statements both implement it.
pub trait Evaluate {
    /// Evaluate this AST node in the given environment.
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, RuntimeError>;
}

// ═══════════════════════════════════════════════════════════════════════
// Main Expression Dispatcher
// ═══════════════════════════════════════════════════════════════════════

impl Evaluate for Expr {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, RuntimeError> {
        // Deeply nested source means deep native recursion
        check_interrupt(ctx)
            .and_then(|()| ensure_sufficient_stack(|| eval_kind(self, env, ctx)))
            .map_err(|e| e.with_span(self.span))
    }
}

fn eval_kind(expr: &Expr, env: &mut Environment, ctx: &EvalContext) -> Result<Value, RuntimeError> {
    match &expr.kind {
        // Literals
        ExprKind::Number(n) => Ok(literal::number(*n)),
        ExprKind::String(s) => Ok(Value::string(s)),
        ExprKind::Boolean(b) => Ok(Value::Boolean(*b)),
        ExprKind::Null => Ok(Value::Null),
        ExprKind::Undefined => Ok(Value::Undefined),
        ExprKind::Array(items) => literal::eval_array(items, env, ctx),
        ExprKind::Object(entries) => literal::eval_object(entries, env, ctx),

        ExprKind::Identifier(name) => env
            .get(name)
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: name.clone(),
                span: Some(expr.span),
            }),

        // Operators
        ExprKind::Unary { op, operand } => unary::eval_unary(*op, operand, env, ctx),
        ExprKind::Binary { op, left, right } => binary::eval_binary(*op, left, right, env, ctx),
        ExprKind::Logical { op, left, right } => binary::eval_logical(*op, left, right, env, ctx),
        ExprKind::Assign { target, value } => assign::eval_assign(target, value, env, ctx),

        // Calls and access
        ExprKind::Call { callee, args } => call::eval_call(callee, args, expr.span, env, ctx),
        ExprKind::Member { object, name } => field::eval_member(object, name, expr.span, env, ctx),
        ExprKind::Index { object, index } => index::eval_index(object, index, expr.span, env, ctx),

        ExprKind::Lambda(decl) => Ok(function::make_function(decl, env)),

        // Parenthesized expressions - just unwrap
        ExprKind::Grouping(inner) => inner.eval(env, ctx),
    }
}

/// Fail with [`RuntimeError::Interrupted`] once the context's flag is set.
pub(crate) fn check_interrupt(ctx: &EvalContext) -> Result<(), RuntimeError> {
    if ctx.is_interrupted() {
        return Err(RuntimeError::Interrupted { span: None });
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// Convenience Functions
// ═══════════════════════════════════════════════════════════════════════

/// Evaluate an expression (convenience wrapper).
pub fn eval_expr(expr: &Expr, env: &mut Environment, ctx: &EvalContext) -> Result<Value, RuntimeError> {
    expr.eval(env, ctx)
}

// Re-export for use by other modules
pub use call::call_value;
pub use control::ControlFlow;
pub use stmt::{eval_block, eval_stmts};


#[cfg(test)]
mod tests {
    use super::test_support::eval;
    use super::*;
    use crate::lexer::Span;

    #[test]
    fn test_literals() {
        assert_eq!(eval("42;").unwrap(), Value::Integer(42));
        assert_eq!(eval("2.5;").unwrap(), Value::Float(2.5));
        assert_eq!(eval("\"hi\";").unwrap(), Value::string("hi"));
        assert_eq!(eval("null;").unwrap(), Value::Null);
        assert_eq!(eval("undefined;").unwrap(), Value::Undefined);
        assert_eq!(eval("true;").unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_undefined_variable_has_position() {
        let err = eval("let a = 1;\nmissing;").unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::UndefinedVariable { ref name, span: Some(Span { line: 2, column: 1 }) }
                if name == "missing"
        ));
    }

    #[test]
    fn test_grouping() {
        assert_eq!(eval("(1 + 2) * 3;").unwrap(), Value::Integer(9));
    }

    #[test]
    fn test_interrupted_context_stops_evaluation() {
        let ctx = EvalContext::new();
        ctx.interrupt();
        let mut env = Environment::new();
        let expr = Expr::new(ExprKind::Null, Span::new(4, 2));
        assert!(matches!(
            expr.eval(&mut env, &ctx),
            Err(RuntimeError::Interrupted { span: Some(Span { line: 4, column: 2 }) })
        ));
    }
}
