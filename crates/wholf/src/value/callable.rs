//! Callable value types: functions and builtins

use std::fmt;
use std::rc::Rc;

use super::Value;
use crate::ast::FunctionDecl;
use crate::environment::ScopeRef;
use crate::error::NativeError;
use crate::host::Host;

/// Type alias for builtin function pointers to reduce complexity
pub type BuiltinFnPtr = Rc<dyn Fn(&[Value], &dyn Host) -> Result<Value, NativeError>>;

/// A user-defined function or lambda together with its captured scope.
#[derive(Clone)]
pub struct FunctionValue {
    /// The declaration; shared with the syntax tree
    pub decl: Rc<FunctionDecl>,

    /// Scope the function was created in
    pub closure: ScopeRef,

    /// Receiver bound to `this`, for methods read off an instance
    pub receiver: Option<Value>,
}

impl FunctionValue {
    /// Create an unbound function value.
    pub fn new(decl: Rc<FunctionDecl>, closure: ScopeRef) -> Self {
        Self {
            decl,
            closure,
            receiver: None,
        }
    }

    /// Function name
    pub fn name(&self) -> &str {
        &self.decl.name
    }

    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.decl.params.len()
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionValue")
            .field("name", &self.decl.name)
            .field("params", &self.decl.params)
            .field("bound", &self.receiver.is_some())
            .finish()
    }
}

/// A built-in native function.
///
/// These are Rust functions exposed to the interpreter. They receive the
/// evaluated arguments and the host services of the running context.
#[derive(Clone)]
pub struct BuiltinFn {
    /// Function name (for display/debugging)
    pub name: String,

    /// Arity (-1 for variadic)
    pub arity: i32,

    /// The actual function pointer
    pub func: BuiltinFnPtr,
}

impl BuiltinFn {
    /// Create a builtin from a closure.
    pub fn new(
        name: impl Into<String>,
        arity: i32,
        func: impl Fn(&[Value], &dyn Host) -> Result<Value, NativeError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            arity,
            func: Rc::new(func),
        }
    }

    /// Whether the builtin accepts any number of arguments.
    pub fn is_variadic(&self) -> bool {
        self.arity < 0
    }
}

impl fmt::Debug for BuiltinFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BuiltinFn({})", self.name)
    }
}
