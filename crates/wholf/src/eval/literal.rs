//! Literal evaluation

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use super::Evaluate;
use crate::ast::{Expr, NumberLiteral};
use crate::error::RuntimeError;
use crate::{Environment, EvalContext, Value};

/// Convert a classified number literal into a value.
pub fn number(lit: NumberLiteral) -> Value {
    match lit {
        NumberLiteral::Integer(n) => Value::Integer(n),
        NumberLiteral::Float(n) => Value::Float(n),
    }
}

/// Evaluate `[a, b, c]` left to right into a fresh array.
pub fn eval_array(
    items: &[Expr],
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, RuntimeError> {
    let values = items
        .iter()
        .map(|item| item.eval(env, ctx))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::array(values))
}

/// Evaluate `{ key: value }` into a fresh object. A repeated key keeps its
/// first position and its last value.
pub fn eval_object(
    entries: &[(String, Expr)],
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, RuntimeError> {
    let mut map = IndexMap::with_capacity(entries.len());
    for (key, value) in entries {
        let value = value.eval(env, ctx)?;
        map.insert(key.clone(), value);
    }
    Ok(Value::Object(Rc::new(RefCell::new(map))))
}
