//! Binary operation evaluation

use std::cmp::Ordering;

use super::Evaluate;
use crate::ast::{BinaryOp, Expr, LogicalOp};
use crate::error::{type_name, RuntimeError};
use crate::{Environment, EvalContext, Value};

/// Evaluate a non-short-circuit binary expression, left operand first.
pub fn eval_binary(
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, RuntimeError> {
    let left = left.eval(env, ctx)?;
    let right = right.eval(env, ctx)?;
    apply_binary(op, left, right)
}

/// Apply a binary operator to two evaluated operands.
pub fn apply_binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
    match op {
        // Arithmetic
        BinaryOp::Add => eval_add(left, right),
        BinaryOp::Subtract => eval_arith(op, left, right, i64::checked_sub, |a, b| a - b),
        BinaryOp::Multiply => eval_arith(op, left, right, i64::checked_mul, |a, b| a * b),
        BinaryOp::Divide => eval_div(left, right),
        BinaryOp::Remainder => eval_rem(left, right),
        BinaryOp::Power => eval_pow(left, right),

        // Equality
        BinaryOp::Equal => Ok(Value::Boolean(left == right)),
        BinaryOp::NotEqual => Ok(Value::Boolean(left != right)),

        // Ordering
        BinaryOp::Less => eval_compare(op, left, right, Ordering::is_lt),
        BinaryOp::LessEqual => eval_compare(op, left, right, Ordering::is_le),
        BinaryOp::Greater => eval_compare(op, left, right, Ordering::is_gt),
        BinaryOp::GreaterEqual => eval_compare(op, left, right, Ordering::is_ge),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Short-Circuit Logical Operators
// ═══════════════════════════════════════════════════════════════════════

/// Evaluate `&&` / `||`, yielding whichever operand decided the result.
pub fn eval_logical(
    op: LogicalOp,
    left: &Expr,
    right: &Expr,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, RuntimeError> {
    let left = left.eval(env, ctx)?;
    let decided = match op {
        LogicalOp::And => !left.is_truthy(),
        LogicalOp::Or => left.is_truthy(),
    };
    if decided {
        Ok(left)
    } else {
        right.eval(env, ctx)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Arithmetic
// ═══════════════════════════════════════════════════════════════════════

fn eval_add(left: Value, right: Value) -> Result<Value, RuntimeError> {
    match (&left, &right) {
        (Value::String(a), Value::String(b)) => {
            let mut s = String::with_capacity(a.len() + b.len());
            s.push_str(a);
            s.push_str(b);
            Ok(Value::string(s))
        }
        (Value::String(_), _) | (_, Value::String(_)) => {
            Ok(Value::string(format!("{}{}", left, right)))
        }
        _ => eval_arith(BinaryOp::Add, left, right, i64::checked_add, |a, b| a + b),
    }
}

/// Integer pairs use the checked operation; any float promotes both sides.
fn eval_arith(
    op: BinaryOp,
    left: Value,
    right: Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, RuntimeError> {
    match (&left, &right) {
        (Value::Integer(a), Value::Integer(b)) => int_op(*a, *b)
            .map(Value::Integer)
            .ok_or(RuntimeError::IntegerOverflow { span: None }),
        _ => match numeric_pair(&left, &right) {
            Some((a, b)) => Ok(Value::Float(float_op(a, b))),
            None => Err(invalid_operands(op, &left, &right)),
        },
    }
}

fn eval_div(left: Value, right: Value) -> Result<Value, RuntimeError> {
    match (&left, &right) {
        (Value::Integer(_), Value::Integer(0)) => Err(RuntimeError::DivisionByZero { span: None }),
        (Value::Integer(a), Value::Integer(b)) => match a.checked_rem(*b) {
            Some(0) => a
                .checked_div(*b)
                .map(Value::Integer)
                .ok_or(RuntimeError::IntegerOverflow { span: None }),
            Some(_) => Ok(Value::Float(*a as f64 / *b as f64)),
            None => Err(RuntimeError::IntegerOverflow { span: None }),
        },
        _ => match numeric_pair(&left, &right) {
            Some((_, b)) if b == 0.0 => Err(RuntimeError::DivisionByZero { span: None }),
            Some((a, b)) => Ok(Value::Float(a / b)),
            None => Err(invalid_operands(BinaryOp::Divide, &left, &right)),
        },
    }
}

fn eval_rem(left: Value, right: Value) -> Result<Value, RuntimeError> {
    match (&left, &right) {
        (Value::Integer(_), Value::Integer(0)) => Err(RuntimeError::DivisionByZero { span: None }),
        (Value::Integer(a), Value::Integer(b)) => a
            .checked_rem(*b)
            .map(Value::Integer)
            .ok_or(RuntimeError::IntegerOverflow { span: None }),
        _ => match numeric_pair(&left, &right) {
            Some((_, b)) if b == 0.0 => Err(RuntimeError::DivisionByZero { span: None }),
            Some((a, b)) => Ok(Value::Float(a % b)),
            None => Err(invalid_operands(BinaryOp::Remainder, &left, &right)),
        },
    }
}

fn eval_pow(left: Value, right: Value) -> Result<Value, RuntimeError> {
    match (&left, &right) {
        (Value::Integer(base), Value::Integer(exp)) if *exp >= 0 => match u32::try_from(*exp) {
            Ok(exp) => base
                .checked_pow(exp)
                .map(Value::Integer)
                .ok_or(RuntimeError::IntegerOverflow { span: None }),
            // Huge exponents only stay in range for these bases
            Err(_) => match *base {
                0 | 1 => Ok(Value::Integer(*base)),
                -1 => Ok(Value::Integer(if exp % 2 == 0 { 1 } else { -1 })),
                _ => Err(RuntimeError::IntegerOverflow { span: None }),
            },
        },
        _ => match numeric_pair(&left, &right) {
            Some((a, b)) => Ok(Value::Float(a.powf(b))),
            None => Err(invalid_operands(BinaryOp::Power, &left, &right)),
        },
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Comparison
// ═══════════════════════════════════════════════════════════════════════

fn eval_compare(
    op: BinaryOp,
    left: Value,
    right: Value,
    test: fn(Ordering) -> bool,
) -> Result<Value, RuntimeError> {
    let ordering = match (&left, &right) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => match numeric_pair(&left, &right) {
            // NaN is unordered: every comparison is false
            Some((a, b)) => a.partial_cmp(&b),
            None => return Err(invalid_operands(op, &left, &right)),
        },
    };
    Ok(Value::Boolean(ordering.is_some_and(test)))
}

// ═══════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════

fn numeric_pair(left: &Value, right: &Value) -> Option<(f64, f64)> {
    if left.is_numeric() && right.is_numeric() {
        Some((left.as_f64()?, right.as_f64()?))
    } else {
        None
    }
}

fn invalid_operands(op: BinaryOp, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::InvalidBinaryOperands {
        op: op.to_string(),
        left_type: type_name(left).to_string(),
        right_type: type_name(right).to_string(),
        span: None,
    }
}
