//! Unary operation evaluation

use super::Evaluate;
use crate::ast::{Expr, UnaryOp};
use crate::error::{type_name, RuntimeError};
use crate::{Environment, EvalContext, Value};

/// Evaluate `-operand` or `!operand`.
pub fn eval_unary(
    op: UnaryOp,
    operand: &Expr,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, RuntimeError> {
    let value = operand.eval(env, ctx)?;
    apply_unary(op, value)
}

/// Apply a prefix operator to an already evaluated operand.
pub fn apply_unary(op: UnaryOp, value: Value) -> Result<Value, RuntimeError> {
    match op {
        UnaryOp::Not => Ok(Value::Boolean(!value.is_truthy())),
        UnaryOp::Negate => match value {
            Value::Integer(n) => n
                .checked_neg()
                .map(Value::Integer)
                .ok_or(RuntimeError::IntegerOverflow { span: None }),
            Value::Float(n) => Ok(Value::Float(-n)),
            other => Err(RuntimeError::InvalidUnaryOperand {
                op: op.to_string(),
                operand_type: type_name(&other).to_string(),
                span: None,
            }),
        },
    }
}
