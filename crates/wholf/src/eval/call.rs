//! Function call evaluation

use std::rc::Rc;

use tracing::trace;

use super::{control, stmt, Evaluate};
use crate::ast::Expr;
use crate::environment::{BindingMode, Scope};
use crate::error::{type_name, RuntimeError};
use crate::lexer::Span;
use crate::value::{BuiltinFn, ClassValue, FunctionValue, InstanceValue, CONSTRUCTOR};
use crate::{Environment, EvalContext, Value};

/// Evaluate `callee(args...)`: callee first, then arguments left to right.
pub fn eval_call(
    callee: &Expr,
    args: &[Expr],
    span: Span,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, RuntimeError> {
    let func = callee.eval(env, ctx)?;

    let args = args
        .iter()
        .map(|arg| arg.eval(env, ctx))
        .collect::<Result<Vec<_>, _>>()?;

    call_value(&func, args, span, env, ctx)
}

/// Call any callable value with already evaluated arguments.
pub fn call_value(
    func: &Value,
    args: Vec<Value>,
    span: Span,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, RuntimeError> {
    match func {
        Value::Function(f) => call_function(f, args, span, env, ctx),
        Value::BuiltinFn(b) => call_builtin(b, &args, span, ctx),
        Value::Class(class) => instantiate(class, args, span, env, ctx),
        other => Err(RuntimeError::TypeError {
            message: format!("`{}` is not callable", type_name(other)),
            span: Some(span),
        }),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// User-Defined Functions
// ═══════════════════════════════════════════════════════════════════════

fn call_function(
    func: &FunctionValue,
    args: Vec<Value>,
    span: Span,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, RuntimeError> {
    if args.len() != func.arity() {
        return Err(RuntimeError::ArityMismatch {
            expected: func.arity(),
            got: args.len(),
            name: func.name().to_string(),
            span: Some(span),
        });
    }

    env.enter_call()
        .map_err(|e| RuntimeError::from(e).with_span(span))?;
    trace!(function = func.name(), depth = env.call_depth(), "call");

    // Methods see `this` in a scope between the closure and the parameters
    let enclosing = match &func.receiver {
        Some(receiver) => {
            let scope = Scope::child(&func.closure);
            scope
                .borrow_mut()
                .define("this", receiver.clone(), BindingMode::Constant);
            scope
        }
        None => Rc::clone(&func.closure),
    };

    let result = {
        let mut frame = env.enter_guard(Scope::child(&enclosing));
        for (param, arg) in func.decl.params.iter().zip(args) {
            frame.define(param.clone(), arg);
        }
        stmt::eval_stmts(&func.decl.body, &mut frame, ctx)
    };

    env.exit_call();
    control::function_result(result)
}

// ═══════════════════════════════════════════════════════════════════════
// Built-in Functions
// ═══════════════════════════════════════════════════════════════════════

fn call_builtin(
    builtin: &BuiltinFn,
    args: &[Value],
    span: Span,
    ctx: &EvalContext,
) -> Result<Value, RuntimeError> {
    if !builtin.is_variadic() && args.len() != builtin.arity as usize {
        return Err(RuntimeError::ArityMismatch {
            expected: builtin.arity as usize,
            got: args.len(),
            name: builtin.name.clone(),
            span: Some(span),
        });
    }

    trace!(builtin = %builtin.name, args = args.len(), "call");
    (builtin.func)(args, ctx.host.as_ref()).map_err(|e| e.into_runtime(&builtin.name, Some(span)))
}

// ═══════════════════════════════════════════════════════════════════════
// Class Instantiation
// ═══════════════════════════════════════════════════════════════════════

fn instantiate(
    class: &Rc<ClassValue>,
    args: Vec<Value>,
    span: Span,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, RuntimeError> {
    let instance = Value::Instance(Rc::new(InstanceValue::new(Rc::clone(class))));

    match class.bound_method(CONSTRUCTOR, instance.clone()) {
        Some(constructor) => {
            call_function(&constructor, args, span, env, ctx)?;
        }
        None if !args.is_empty() => {
            return Err(RuntimeError::ArityMismatch {
                expected: 0,
                got: args.len(),
                name: class.name.clone(),
                span: Some(span),
            });
        }
        None => {}
    }

    Ok(instance)
}
