//! Runtime environment managing variable, function and class bindings

mod cycles;
mod frame;
mod prelude;

pub use frame::ScopeGuard;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use self::cycles::CycleCollector;
use crate::context::DEFAULT_MAX_CALL_DEPTH;
use crate::error::EnvironmentError;
use crate::value::{BuiltinFn, Value};

/// Shared handle to a scope.
///
/// Function values keep their defining scope alive through one of these.
pub type ScopeRef = Rc<RefCell<Scope>>;

/// A single variable binding.
#[derive(Debug, Clone)]
pub struct Binding {
    /// The bound value
    pub value: Value,

    /// Whether the binding may be reassigned
    pub mode: BindingMode,
}

/// Binding mode for declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingMode {
    /// Reassignable binding: `let x = ...`, parameters, loop variables
    Mutable,

    /// Constant binding: `const X = ...`
    Constant,
}

/// One lexical scope: its own bindings plus a link to the enclosing scope.
#[derive(Default)]
pub struct Scope {
    bindings: IndexMap<String, Binding>,
    parent: Option<ScopeRef>,
}

impl fmt::Debug for Scope {
    // Scopes and closures reference each other, so only names are shown
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("names", &self.bindings.keys().collect::<Vec<_>>())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

impl Scope {
    /// Create a root scope.
    pub fn new_root() -> ScopeRef {
        Rc::new(RefCell::new(Scope::default()))
    }

    /// Create a scope enclosed by `parent`.
    pub fn child(parent: &ScopeRef) -> ScopeRef {
        Rc::new(RefCell::new(Scope {
            bindings: IndexMap::new(),
            parent: Some(Rc::clone(parent)),
        }))
    }

    /// The enclosing scope, if any.
    pub fn parent(&self) -> Option<ScopeRef> {
        self.parent.clone()
    }

    /// Bind `name` in this scope, overwriting any previous binding here.
    pub fn define(&mut self, name: impl Into<String>, value: Value, mode: BindingMode) {
        self.bindings.insert(name.into(), Binding { value, mode });
    }

    /// Whether `name` is bound in this scope itself.
    pub fn contains_local(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Names bound in this scope, in definition order.
    pub fn names(&self) -> Vec<String> {
        self.bindings.keys().cloned().collect()
    }

    /// Walk outward from `scope` and return the first binding of `name`.
    pub fn lookup(scope: &ScopeRef, name: &str) -> Option<Value> {
        let mut cursor = Some(Rc::clone(scope));
        while let Some(current) = cursor {
            let borrowed = current.borrow();
            if let Some(binding) = borrowed.bindings.get(name) {
                return Some(binding.value.clone());
            }
            cursor = borrowed.parent.clone();
        }
        None
    }

    /// Walk outward from `scope` and overwrite the first binding of `name`.
    pub fn assign(scope: &ScopeRef, name: &str, value: Value) -> Result<(), EnvironmentError> {
        let mut cursor = Some(Rc::clone(scope));
        while let Some(current) = cursor {
            let mut borrowed = current.borrow_mut();
            if let Some(binding) = borrowed.bindings.get_mut(name) {
                if binding.mode == BindingMode::Constant {
                    return Err(EnvironmentError::ImmutableBinding {
                        name: name.to_string(),
                    });
                }
                binding.value = value;
                return Ok(());
            }
            cursor = borrowed.parent.clone();
        }
        Err(EnvironmentError::UndefinedVariable {
            name: name.to_string(),
        })
    }
}

/// The runtime environment: a chain of lexical scopes plus call tracking.
///
/// The innermost scope is `current`; lookup walks outward to `globals`.
/// Blocks push and pop child scopes. Function calls switch `current` to a
/// child of the callee's captured scope and restore the caller's scope
/// afterwards.
///
/// # Example
///
/// ```
/// use wholf::{Environment, Value};
///
/// let mut env = Environment::new();
///
/// // Global scope
/// env.define("x", Value::Integer(1));
///
/// // Enter a new scope
/// env.push_frame();
/// env.define("y", Value::Integer(2));
/// env.define("x", Value::Integer(10)); // Shadows outer x
///
/// assert_eq!(env.get("x"), Some(Value::Integer(10)));
/// assert_eq!(env.get("y"), Some(Value::Integer(2)));
///
/// // Exit scope
/// env.pop_frame();
///
/// assert_eq!(env.get("x"), Some(Value::Integer(1)));
/// assert_eq!(env.get("y"), None);
/// ```
///
/// A function bound in the scope it captures forms a reference cycle with
/// it. Leaving such a scope runs a local cycle check, and scopes kept alive
/// by escaping closures are checked again later, so a scope is freed once
/// no frame and no reachable value refers to it.
#[derive(Debug)]
pub struct Environment {
    globals: ScopeRef,
    current: ScopeRef,

    /// Current call depth (for recursion limiting)
    call_depth: usize,

    /// Maximum allowed call depth
    max_call_depth: usize,

    /// Scopes left behind that may be held only by cycles
    collector: CycleCollector,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Create a new empty environment.
    pub fn new() -> Self {
        Self::with_max_call_depth(DEFAULT_MAX_CALL_DEPTH)
    }

    /// Create an environment with a custom call depth limit.
    pub fn with_max_call_depth(max_depth: usize) -> Self {
        let globals = Scope::new_root();
        Self {
            current: Rc::clone(&globals),
            globals,
            call_depth: 0,
            max_call_depth: max_depth,
            collector: CycleCollector::default(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Frame Management (Scope Entry/Exit)
    // ═══════════════════════════════════════════════════════════════════

    /// Enter a new scope nested in the current one.
    pub fn push_frame(&mut self) {
        self.current = Scope::child(&self.current);
    }

    /// Exit the current scope.
    ///
    /// Does nothing at the global scope.
    pub fn pop_frame(&mut self) {
        if self.is_global_scope() {
            return;
        }
        let parent = self.current.borrow().parent();
        if let Some(parent) = parent {
            self.restore_scope(parent);
        }
    }

    /// Make `scope` the current scope, returning the one it replaces.
    ///
    /// Used for calls, whose body runs in a child of the callee's captured
    /// scope rather than of the caller's.
    pub fn enter_scope(&mut self, scope: ScopeRef) -> ScopeRef {
        std::mem::replace(&mut self.current, scope)
    }

    /// Reinstate a scope returned by [`Environment::enter_scope`].
    ///
    /// The scope being left is freed if nothing outside a cycle still
    /// refers to it.
    pub fn restore_scope(&mut self, previous: ScopeRef) {
        let exited = std::mem::replace(&mut self.current, previous);
        self.collector.release(exited, &self.current);
    }

    /// Re-examine scopes that outlived their frames and free those now
    /// held only by cycles.
    pub fn collect_cycles(&mut self) {
        let active = cycles::active_chain(&self.current);
        self.collector.sweep(&active);
    }

    /// Handle to the current scope (captured by new functions).
    pub fn current_scope(&self) -> ScopeRef {
        Rc::clone(&self.current)
    }

    /// Number of scopes from the current one out to the globals, inclusive.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut cursor = self.current.borrow().parent();
        while let Some(scope) = cursor {
            depth += 1;
            cursor = scope.borrow().parent();
        }
        depth
    }

    /// Check if we're at global scope.
    pub fn is_global_scope(&self) -> bool {
        Rc::ptr_eq(&self.current, &self.globals)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Call Depth Tracking (Stack Overflow Protection)
    // ═══════════════════════════════════════════════════════════════════

    /// Enter a function call. Returns error if max depth exceeded.
    pub fn enter_call(&mut self) -> Result<(), EnvironmentError> {
        if self.call_depth >= self.max_call_depth {
            return Err(EnvironmentError::StackOverflow {
                depth: self.call_depth + 1,
                max: self.max_call_depth,
            });
        }
        self.call_depth += 1;
        Ok(())
    }

    /// Exit a function call.
    pub fn exit_call(&mut self) {
        self.call_depth = self.call_depth.saturating_sub(1);
    }

    /// Get current call depth.
    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    /// Change the call depth limit.
    pub fn set_max_call_depth(&mut self, max_depth: usize) {
        self.max_call_depth = max_depth;
    }

    // ═══════════════════════════════════════════════════════════════════
    // Binding Definition
    // ═══════════════════════════════════════════════════════════════════

    /// Define a reassignable binding in the current scope.
    ///
    /// Re-declaring a name in the same scope overwrites it.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.define_with_mode(name, value, BindingMode::Mutable);
    }

    /// Define a binding with explicit mutability.
    pub fn define_with_mode(&mut self, name: impl Into<String>, value: Value, mode: BindingMode) {
        self.current.borrow_mut().define(name, value, mode);
    }

    /// Define a reassignable binding in the global scope.
    pub fn define_global(&mut self, name: impl Into<String>, value: Value) {
        self.globals
            .borrow_mut()
            .define(name, value, BindingMode::Mutable);
    }

    /// Register a built-in function in the global scope.
    pub fn define_builtin(&mut self, builtin: BuiltinFn) {
        let name = builtin.name.clone();
        self.define_global(name, Value::BuiltinFn(builtin));
    }

    // ═══════════════════════════════════════════════════════════════════
    // Binding Lookup
    // ═══════════════════════════════════════════════════════════════════

    /// Look up a binding by name, innermost scope first.
    pub fn get(&self, name: &str) -> Option<Value> {
        Scope::lookup(&self.current, name)
    }

    /// Check if a binding exists in any enclosing scope.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Check if a binding exists in the current (innermost) scope only.
    pub fn contains_in_current_scope(&self, name: &str) -> bool {
        self.current.borrow().contains_local(name)
    }

    /// Names bound in the global scope, in definition order.
    pub fn global_names(&self) -> Vec<String> {
        self.globals.borrow().names()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Assignment (Mutation)
    // ═══════════════════════════════════════════════════════════════════

    /// Assign a new value to an existing binding.
    ///
    /// # Errors
    ///
    /// - `UndefinedVariable` if the binding doesn't exist
    /// - `ImmutableBinding` if the binding is `const`
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), EnvironmentError> {
        Scope::assign(&self.current, name, value)
    }

    /// Reset to a fresh, empty global scope.
    pub fn clear(&mut self) {
        let fresh = Scope::new_root();
        self.current = Rc::clone(&fresh);
        let retired = std::mem::replace(&mut self.globals, fresh);
        self.call_depth = 0;
        self.collector.retire(retired);
    }
}

impl Drop for Environment {
    fn drop(&mut self) {
        self.clear();
    }
}
