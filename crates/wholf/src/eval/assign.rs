//! Assignment evaluation

use super::{field, index, Evaluate};
use crate::ast::{AssignTarget, Expr};
use crate::error::{EnvironmentError, RuntimeError};
use crate::{Environment, EvalContext, Value};

/// Evaluate `target = value`, yielding the assigned value.
///
/// Assigning to an undeclared name creates it in the global scope.
/// Member and index targets evaluate the container, then the key, then
/// the value.
pub fn eval_assign(
    target: &AssignTarget,
    value: &Expr,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, RuntimeError> {
    match target {
        AssignTarget::Identifier(name) => {
            let value = value.eval(env, ctx)?;
            match env.assign(name, value.clone()) {
                Ok(()) => {}
                Err(EnvironmentError::UndefinedVariable { .. }) => {
                    env.define_global(name.clone(), value.clone());
                }
                Err(e) => return Err(e.into()),
            }
            Ok(value)
        }

        AssignTarget::Member { object, name } => {
            let target = object.eval(env, ctx)?;
            let value = value.eval(env, ctx)?;
            field::set_member(&target, name, value.clone(), object.span)?;
            Ok(value)
        }

        AssignTarget::Index { object, index: key } => {
            let target = object.eval(env, ctx)?;
            let key = key.eval(env, ctx)?;
            let value = value.eval(env, ctx)?;
            index::set_index(&target, &key, value.clone(), object.span)?;
            Ok(value)
        }
    }
}
