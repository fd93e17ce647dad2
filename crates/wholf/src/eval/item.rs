//! Class declaration evaluation

use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::ClassDecl;
use crate::value::ClassValue;
use crate::{Environment, Value};

/// Evaluate `class Name { ... }`: bind a class value in the current scope.
///
/// A method declared twice keeps its first position and its last body.
pub fn eval_class_decl(decl: &ClassDecl, env: &mut Environment) -> Value {
    let methods: IndexMap<_, _> = decl
        .methods
        .iter()
        .map(|method| (method.name.clone(), Rc::clone(method)))
        .collect();

    let class = ClassValue {
        name: decl.name.clone(),
        methods,
        closure: env.current_scope(),
    };
    env.define(decl.name.clone(), Value::Class(Rc::new(class)));
    Value::Undefined
}

#[cfg(test)]
mod tests {
    use crate::error::RuntimeError;
    use crate::eval::test_support::{eval, eval_with_output};
    use crate::Value;

    #[test]
    fn test_class_value_is_bound() {
        let value = eval("class Box { get() { return 1; } } Box;").unwrap();
        assert!(matches!(value, Value::Class(ref c) if c.name == "Box" && c.find_method("get").is_some()));
    }

    #[test]
    fn test_instances_have_separate_fields() {
        let source = r#"
            class Cell { constructor(v) { this.v = v; } }
            let a = Cell(1);
            let b = Cell(2);
            a.v = 10;
            b.v;
        "#;
        assert_eq!(eval(source).unwrap(), Value::Integer(2));
    }

    #[test]
    fn test_methods_close_over_declaring_scope() {
        let source = r#"
            let greeting = "hello";
            class G { say() { print(greeting); } }
            G().say();
        "#;
        let (result, output) = eval_with_output(source);
        result.unwrap();
        assert_eq!(output, "hello\n");
    }

    #[test]
    fn test_this_is_constant() {
        let err = eval("class A { f() { this = 1; } } A().f();").unwrap_err();
        assert!(matches!(err, RuntimeError::ImmutableBinding { ref name, .. } if name == "this"));
    }

    #[test]
    fn test_type_of_instance_is_class_name() {
        assert_eq!(eval("class Dog {} typeOf(Dog());").unwrap(), Value::string("Dog"));
    }
}
