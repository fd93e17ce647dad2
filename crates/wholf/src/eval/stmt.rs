//! Statement evaluation

use tracing::trace;

use super::control::ControlFlow;
use super::{check_interrupt, function, item, local, loops, Evaluate};
use crate::ast::{Stmt, StmtKind};
use crate::error::RuntimeError;
use crate::stack::ensure_sufficient_stack;
use crate::{Environment, EvalContext, Value};

impl Evaluate for Stmt {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, RuntimeError> {
        if ctx.trace {
            trace!(
                kind = self.kind.name(),
                line = self.span.line,
                column = self.span.column,
                "statement"
            );
        }

        // Nested blocks and `if` chains recurse once per level
        check_interrupt(ctx)
            .and_then(|()| ensure_sufficient_stack(|| eval_kind(self, env, ctx)))
            .map_err(|e| e.with_span(self.span))
    }
}

fn eval_kind(stmt: &Stmt, env: &mut Environment, ctx: &EvalContext) -> Result<Value, RuntimeError> {
    match &stmt.kind {
        StmtKind::Expression(expr) => expr.eval(env, ctx),

        StmtKind::VarDecl {
            name,
            initializer,
            constant,
        } => local::eval_var_decl(name, initializer.as_ref(), *constant, env, ctx),

        StmtKind::Block(stmts) => eval_block(stmts, env, ctx),

        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            if condition.eval(env, ctx)?.is_truthy() {
                then_branch.eval(env, ctx)
            } else if let Some(else_branch) = else_branch {
                else_branch.eval(env, ctx)
            } else {
                Ok(Value::Undefined)
            }
        }

        // Loops
        StmtKind::While { condition, body } => loops::eval_while(condition, body, env, ctx),
        StmtKind::For {
            init,
            condition,
            increment,
            body,
        } => loops::eval_for(
            init.as_deref(),
            condition.as_ref(),
            increment.as_ref(),
            body,
            env,
            ctx,
        ),
        StmtKind::Foreach {
            variable,
            iterable,
            body,
        } => loops::eval_foreach(variable, iterable, body, env, ctx),

        // Declarations
        StmtKind::Function(decl) => Ok(function::eval_function_decl(decl, env)),
        StmtKind::Class(decl) => Ok(item::eval_class_decl(decl, env)),

        // Control flow signals
        StmtKind::Return(value) => {
            let value = match value {
                Some(expr) => expr.eval(env, ctx)?,
                None => Value::Undefined,
            };
            Err(RuntimeError::ControlFlow(ControlFlow::return_value(value)))
        }
        StmtKind::Break => Err(RuntimeError::ControlFlow(ControlFlow::Break { span: stmt.span })),
        StmtKind::Continue => Err(RuntimeError::ControlFlow(ControlFlow::Continue {
            span: stmt.span,
        })),
    }
}

/// Evaluate statements in order in the current scope, yielding the value
/// of the last one (or `undefined` when there are none).
pub fn eval_stmts(
    stmts: &[Stmt],
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, RuntimeError> {
    let mut last = Value::Undefined;
    for stmt in stmts {
        last = stmt.eval(env, ctx)?;
    }
    Ok(last)
}

/// Evaluate a block in a new scope that is left however the block exits.
pub fn eval_block(
    stmts: &[Stmt],
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, RuntimeError> {
    let mut scope = env.scope_guard();
    eval_stmts(stmts, &mut scope, ctx)
}
