//! Member access evaluation

use super::Evaluate;
use crate::ast::Expr;
use crate::error::{type_name, RuntimeError};
use crate::lexer::Span;
use crate::{Environment, EvalContext, Value};

/// Evaluate `object.name`.
pub fn eval_member(
    object: &Expr,
    name: &str,
    span: Span,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, RuntimeError> {
    let object = object.eval(env, ctx)?;
    get_member(&object, name, span)
}

/// Read a member: an instance field, a bound method, an object entry, or
/// the `length` of an array or string.
pub fn get_member(object: &Value, name: &str, span: Span) -> Result<Value, RuntimeError> {
    let found = match object {
        Value::Instance(instance) => instance.get_field(name).or_else(|| {
            instance
                .class
                .bound_method(name, object.clone())
                .map(Value::function)
        }),
        Value::Object(entries) => entries.borrow().get(name).cloned(),
        Value::Array(items) if name == "length" => Some(length(items.borrow().len())),
        Value::String(s) if name == "length" => Some(length(s.chars().count())),
        _ => None,
    };

    found.ok_or_else(|| RuntimeError::UndefinedField {
        field: name.to_string(),
        type_name: owner_name(object),
        span: Some(span),
    })
}

/// Write a member in place. Instances and objects gain the member if it
/// was missing.
pub fn set_member(object: &Value, name: &str, value: Value, span: Span) -> Result<(), RuntimeError> {
    match object {
        Value::Instance(instance) => {
            instance.set_field(name, value);
            Ok(())
        }
        Value::Object(entries) => {
            entries.borrow_mut().insert(name.to_string(), value);
            Ok(())
        }
        other => Err(RuntimeError::TypeError {
            message: format!("cannot set property `{}` on `{}`", name, type_name(other)),
            span: Some(span),
        }),
    }
}

fn length(len: usize) -> Value {
    Value::Integer(i64::try_from(len).unwrap_or(i64::MAX))
}

fn owner_name(value: &Value) -> String {
    match value {
        Value::Instance(instance) => instance.class.name.clone(),
        other => type_name(other).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::test_support::eval;

    #[test]
    fn test_object_member() {
        assert_eq!(eval("let o = { a: 1 }; o.a;").unwrap(), Value::Integer(1));
    }

    #[test]
    fn test_missing_member_is_error() {
        let err = eval("let o = { a: 1 }; o.b;").unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::UndefinedField { ref field, ref type_name, .. }
                if field == "b" && type_name == "object"
        ));
    }

    #[test]
    fn test_missing_instance_member_names_class() {
        let err = eval("class P {} P().x;").unwrap_err();
        assert!(matches!(err, RuntimeError::UndefinedField { ref type_name, .. } if type_name == "P"));
    }

    #[test]
    fn test_length() {
        assert_eq!(eval("[1, 2, 3].length;").unwrap(), Value::Integer(3));
        assert_eq!(eval("\"héllo\".length;").unwrap(), Value::Integer(5));
    }

    #[test]
    fn test_field_shadows_method() {
        let source = "class A { m() { return 1; } } let a = A(); a.m = 5; a.m;";
        assert_eq!(eval(source).unwrap(), Value::Integer(5));
    }

    #[test]
    fn test_set_member_on_primitive_fails() {
        let err = set_member(&Value::Integer(1), "x", Value::Null, Span::new(1, 1)).unwrap_err();
        assert!(matches!(err, RuntimeError::TypeError { .. }));
    }

    #[test]
    fn test_objects_are_shared() {
        let source = "let a = { n: 1 }; let b = a; b.n = 2; a.n;";
        assert_eq!(eval(source).unwrap(), Value::Integer(2));
    }
}
