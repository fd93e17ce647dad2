//! Variable declaration evaluation

use super::Evaluate;
use crate::ast::Expr;
use crate::environment::BindingMode;
use crate::error::RuntimeError;
use crate::{Environment, EvalContext, Value};

/// Evaluate `let name = init;` or `const name = init;`.
///
/// The initializer runs before the name is bound, so it sees any outer
/// binding of the same name. A missing initializer binds `undefined`.
pub fn eval_var_decl(
    name: &str,
    initializer: Option<&Expr>,
    constant: bool,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, RuntimeError> {
    let value = match initializer {
        Some(init) => init.eval(env, ctx)?,
        None => Value::Undefined,
    };

    let mode = if constant {
        BindingMode::Constant
    } else {
        BindingMode::Mutable
    };
    env.define_with_mode(name, value, mode);
    Ok(Value::Undefined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::test_support::eval;

    #[test]
    fn test_let_without_initializer_is_undefined() {
        assert_eq!(eval("let x; x;").unwrap(), Value::Undefined);
    }

    #[test]
    fn test_redeclaration_overwrites() {
        assert_eq!(eval("let x = 1; let x = 2; x;").unwrap(), Value::Integer(2));
        assert_eq!(eval("const x = 1; let x = 2; x = 3; x;").unwrap(), Value::Integer(3));
    }

    #[test]
    fn test_shadowing_in_block() {
        assert_eq!(eval("let x = 1; { let x = 2; } x;").unwrap(), Value::Integer(1));
    }

    #[test]
    fn test_initializer_sees_outer_binding() {
        assert_eq!(eval("let x = 1; { let x = x + 1; x; }").unwrap(), Value::Integer(2));
    }

    #[test]
    fn test_declaration_value_is_undefined() {
        assert_eq!(eval("let x = 4;").unwrap(), Value::Undefined);
    }
}
