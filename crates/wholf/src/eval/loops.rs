//! Loop statement evaluation

use super::control::ControlFlow;
use super::{check_interrupt, Evaluate};
use crate::ast::{Expr, Stmt};
use crate::error::{type_name, RuntimeError};
use crate::{Environment, EvalContext, Value};

/// What a loop does after one run of its body.
enum Step {
    Next,
    Exit,
}

/// Run one iteration of `body` in a fresh scope, absorbing `break` and
/// `continue`. Anything else (including `return`) propagates.
fn run_body(body: &Stmt, env: &mut Environment, ctx: &EvalContext) -> Result<Step, RuntimeError> {
    let mut iteration = env.scope_guard();
    match body.eval(&mut iteration, ctx) {
        Ok(_) => Ok(Step::Next),
        Err(RuntimeError::ControlFlow(ControlFlow::Break { .. })) => Ok(Step::Exit),
        Err(RuntimeError::ControlFlow(ControlFlow::Continue { .. })) => Ok(Step::Next),
        Err(e) => Err(e),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// while statement
// ═══════════════════════════════════════════════════════════════════════

/// Evaluate `while (condition) body`.
pub fn eval_while(
    condition: &Expr,
    body: &Stmt,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, RuntimeError> {
    loop {
        check_interrupt(ctx)?;

        if !condition.eval(env, ctx)?.is_truthy() {
            break;
        }

        if let Step::Exit = run_body(body, env, ctx)? {
            break;
        }
    }
    Ok(Value::Undefined)
}

// ═══════════════════════════════════════════════════════════════════════
// for statement
// ═══════════════════════════════════════════════════════════════════════

/// Evaluate `for (init; condition; increment) body`.
///
/// The initializer runs once in the loop's own scope; each iteration of
/// the body gets a fresh scope inside it. `continue` still runs the
/// increment; `break` skips it.
pub fn eval_for(
    init: Option<&Stmt>,
    condition: Option<&Expr>,
    increment: Option<&Expr>,
    body: &Stmt,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, RuntimeError> {
    let mut scope = env.scope_guard();

    if let Some(init) = init {
        init.eval(&mut scope, ctx)?;
    }

    loop {
        check_interrupt(ctx)?;

        if let Some(condition) = condition {
            if !condition.eval(&mut scope, ctx)?.is_truthy() {
                break;
            }
        }

        if let Step::Exit = run_body(body, &mut scope, ctx)? {
            break;
        }

        if let Some(increment) = increment {
            increment.eval(&mut scope, ctx)?;
        }
    }
    Ok(Value::Undefined)
}

// ═══════════════════════════════════════════════════════════════════════
// foreach statement
// ═══════════════════════════════════════════════════════════════════════

/// Evaluate `foreach (variable : iterable) body`.
pub fn eval_foreach(
    variable: &str,
    iterable: &Expr,
    body: &Stmt,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, RuntimeError> {
    let iterable = iterable.eval(env, ctx)?;
    let items = value_to_items(&iterable)?;

    for item in items {
        check_interrupt(ctx)?;

        // The loop variable lives in its own scope around the body's
        let mut binding = env.scope_guard();
        binding.define(variable, item);

        if let Step::Exit = run_body(body, &mut binding, ctx)? {
            break;
        }
    }
    Ok(Value::Undefined)
}

/// Snapshot the values a `foreach` visits.
///
/// Arrays yield their elements, strings their characters and objects
/// their keys. Mutating the container inside the loop does not change the
/// iteration.
fn value_to_items(value: &Value) -> Result<Vec<Value>, RuntimeError> {
    match value {
        Value::Array(items) => Ok(items.borrow().clone()),
        Value::String(s) => Ok(s.chars().map(|c| Value::string(c.to_string())).collect()),
        Value::Object(entries) => Ok(entries.borrow().keys().map(Value::string).collect()),
        other => Err(RuntimeError::TypeError {
            message: format!("cannot iterate over `{}`", type_name(other)),
            span: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::test_support::{eval, eval_with_output};

    #[test]
    fn test_while_loop() {
        let source = "let i = 0; let sum = 0; while (i < 5) { sum = sum + i; i = i + 1; } sum;";
        assert_eq!(eval(source).unwrap(), Value::Integer(10));
    }

    #[test]
    fn test_for_loop_break_stops_before_increment() {
        let source = r#"
            let last = -1;
            for (i = 0; i < 5; i = i + 1) { if (i == 3) break; last = i; }
            [last, i];
        "#;
        assert_eq!(eval(source).unwrap().to_string(), "[2, 3]");
    }

    #[test]
    fn test_for_continue_runs_increment() {
        let source = r#"
            let odd = 0;
            for (let i = 0; i < 6; i = i + 1) { if (i % 2 == 0) continue; odd = odd + 1; }
            odd;
        "#;
        assert_eq!(eval(source).unwrap(), Value::Integer(3));
    }

    #[test]
    fn test_for_let_is_scoped_to_loop() {
        let err = eval("for (let j = 0; j < 1; j = j + 1) {} j;").unwrap_err();
        assert!(matches!(err, RuntimeError::UndefinedVariable { ref name, .. } if name == "j"));
    }

    #[test]
    fn test_for_without_condition_needs_break() {
        let source = "let n = 0; for (;;) { n = n + 1; if (n == 4) break; } n;";
        assert_eq!(eval(source).unwrap(), Value::Integer(4));
    }

    #[test]
    fn test_foreach_over_array_string_and_object() {
        let source = r#"
            foreach (x : [1, 2]) print(x);
            foreach (c : "ab") print(c);
            foreach (let k in { p: 1, q: 2 }) print(k);
        "#;
        let (result, output) = eval_with_output(source);
        result.unwrap();
        assert_eq!(output, "1\n2\na\nb\np\nq\n");
    }

    #[test]
    fn test_foreach_over_number_is_error() {
        let err = eval("foreach (x : 5) {}").unwrap_err();
        assert!(matches!(err, RuntimeError::TypeError { ref message, .. } if message.contains("iterate")));
    }

    #[test]
    fn test_each_iteration_gets_fresh_scope() {
        let source = r#"
            let fs = [];
            foreach (x : [1, 2, 3]) { fs[x - 1] = () => x; }
            fs[0]() + fs[2]();
        "#;
        assert_eq!(eval(source).unwrap(), Value::Integer(4));
    }

    #[test]
    fn test_nested_break_only_leaves_inner_loop() {
        let source = r#"
            let count = 0;
            foreach (a : [1, 2, 3]) {
                while (true) { break; }
                count = count + 1;
            }
            count;
        "#;
        assert_eq!(eval(source).unwrap(), Value::Integer(3));
    }

    #[test]
    fn test_return_passes_through_loop() {
        let source = "function f() { while (true) { return 8; } } f();";
        assert_eq!(eval(source).unwrap(), Value::Integer(8));
    }

    #[test]
    fn test_interrupt_stops_loop() {
        let program = crate::parser::parse_source("while (true) {}").unwrap();
        let ctx = EvalContext::new();
        ctx.interrupt();
        let mut env = Environment::new();
        let err = crate::interpreter::run(&program, &mut env, &ctx).unwrap_err();
        assert!(matches!(err, RuntimeError::Interrupted { .. }));
    }
}
