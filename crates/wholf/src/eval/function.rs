//! Function declarations and lambdas

use std::rc::Rc;

use crate::ast::FunctionDecl;
use crate::value::FunctionValue;
use crate::{Environment, Value};

/// Create a function value closing over the current scope.
pub fn make_function(decl: &Rc<FunctionDecl>, env: &Environment) -> Value {
    Value::function(FunctionValue::new(Rc::clone(decl), env.current_scope()))
}

/// Evaluate `function name(...) { ... }`: bind `name` in the current scope.
///
/// The function captures the scope it is bound in, so it can call itself.
pub fn eval_function_decl(decl: &Rc<FunctionDecl>, env: &mut Environment) -> Value {
    let func = make_function(decl, env);
    env.define(decl.name.clone(), func);
    Value::Undefined
}
