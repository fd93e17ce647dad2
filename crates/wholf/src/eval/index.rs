//! Index expression evaluation

use super::Evaluate;
use crate::ast::Expr;
use crate::error::{type_name, RuntimeError};
use crate::lexer::Span;
use crate::{Environment, EvalContext, Value};

/// Evaluate `object[index]`.
pub fn eval_index(
    object: &Expr,
    index: &Expr,
    span: Span,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, RuntimeError> {
    let object = object.eval(env, ctx)?;
    let index = index.eval(env, ctx)?;
    get_index(&object, &index, span)
}

/// Read `object[index]`.
///
/// Arrays and strings take integer positions (integral floats are
/// accepted); objects take string keys.
pub fn get_index(object: &Value, index: &Value, span: Span) -> Result<Value, RuntimeError> {
    match (object, index) {
        (Value::Array(items), _) => {
            let items = items.borrow();
            let i = position(index, items.len(), object, span)?;
            Ok(items[i].clone())
        }
        (Value::String(s), _) => {
            let len = s.chars().count();
            let i = position(index, len, object, span)?;
            let c = s.chars().nth(i).map(String::from).unwrap_or_default();
            Ok(Value::string(c))
        }
        (Value::Object(entries), Value::String(key)) => {
            entries
                .borrow()
                .get(&**key)
                .cloned()
                .ok_or_else(|| RuntimeError::UndefinedField {
                    field: key.to_string(),
                    type_name: "object".to_string(),
                    span: Some(span),
                })
        }
        _ => Err(cannot_index(object, index, span)),
    }
}

/// Write `object[index] = value` in place.
///
/// Writing one past the end of an array appends.
pub fn set_index(object: &Value, index: &Value, value: Value, span: Span) -> Result<(), RuntimeError> {
    match (object, index) {
        (Value::Array(items), _) => {
            let mut items = items.borrow_mut();
            let len = items.len();
            match integer_index(index) {
                Some(i) if i >= 0 && (i as usize) < len => items[i as usize] = value,
                Some(i) if i >= 0 && i as usize == len => items.push(value),
                Some(i) => return Err(RuntimeError::IndexOutOfBounds { index: i, len, span: Some(span) }),
                None => return Err(cannot_index(object, index, span)),
            }
            Ok(())
        }
        (Value::Object(entries), Value::String(key)) => {
            entries.borrow_mut().insert(key.to_string(), value);
            Ok(())
        }
        _ => Err(RuntimeError::TypeError {
            message: format!(
                "cannot assign to `{}` indexed by `{}`",
                type_name(object),
                type_name(index)
            ),
            span: Some(span),
        }),
    }
}

/// A bounds-checked position into a container of `len` elements.
fn position(index: &Value, len: usize, object: &Value, span: Span) -> Result<usize, RuntimeError> {
    let i = integer_index(index).ok_or_else(|| cannot_index(object, index, span))?;
    usize::try_from(i)
        .ok()
        .filter(|&i| i < len)
        .ok_or(RuntimeError::IndexOutOfBounds { index: i, len, span: Some(span) })
}

fn integer_index(index: &Value) -> Option<i64> {
    match index {
        Value::Integer(i) => Some(*i),
        Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
        _ => None,
    }
}

fn cannot_index(object: &Value, index: &Value, span: Span) -> RuntimeError {
    RuntimeError::TypeError {
        message: format!(
            "cannot index `{}` with `{}`",
            type_name(object),
            type_name(index)
        ),
        span: Some(span),
    }
}
