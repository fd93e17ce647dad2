//! Compound value types: classes and instances

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::{FunctionValue, Value};
use crate::ast::FunctionDecl;
use crate::environment::ScopeRef;

/// Name of the method run when a class is instantiated.
pub const CONSTRUCTOR: &str = "constructor";

/// A class: a named set of methods sharing one defining scope.
pub struct ClassValue {
    /// The class name
    pub name: String,

    /// Methods in declaration order
    pub methods: IndexMap<String, Rc<FunctionDecl>>,

    /// Scope the class was declared in; methods close over it
    pub closure: ScopeRef,
}

impl ClassValue {
    /// Look up a method declaration by name.
    pub fn find_method(&self, name: &str) -> Option<&Rc<FunctionDecl>> {
        self.methods.get(name)
    }

    /// The method `name` as a function bound to `receiver`.
    pub fn bound_method(&self, name: &str, receiver: Value) -> Option<FunctionValue> {
        self.find_method(name).map(|decl| FunctionValue {
            decl: Rc::clone(decl),
            closure: Rc::clone(&self.closure),
            receiver: Some(receiver),
        })
    }

    /// Number of arguments a call to the class expects.
    pub fn arity(&self) -> usize {
        self.find_method(CONSTRUCTOR)
            .map(|ctor| ctor.params.len())
            .unwrap_or(0)
    }
}

impl fmt::Debug for ClassValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassValue")
            .field("name", &self.name)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// An instance of a class with its own mutable fields.
#[derive(Debug)]
pub struct InstanceValue {
    /// The instantiated class
    pub class: Rc<ClassValue>,

    /// Fields in assignment order
    pub fields: RefCell<IndexMap<String, Value>>,
}

impl InstanceValue {
    /// Create an instance with no fields.
    pub fn new(class: Rc<ClassValue>) -> Self {
        Self {
            class,
            fields: RefCell::new(IndexMap::new()),
        }
    }

    /// Read a field.
    pub fn get_field(&self, name: &str) -> Option<Value> {
        self.fields.borrow().get(name).cloned()
    }

    /// Create or overwrite a field.
    pub fn set_field(&self, name: impl Into<String>, value: Value) {
        self.fields.borrow_mut().insert(name.into(), value);
    }
}
