//! RAII scope guard for automatic scope cleanup

use super::{Environment, Scope, ScopeRef};

/// RAII guard that restores the previous scope when dropped.
///
/// The evaluator enters every block, loop iteration and call through a
/// guard, so the scope is left on normal completion, on error, and when a
/// `return`/`break`/`continue` signal unwinds through it.
///
/// # Example
///
/// ```
/// use wholf::{Environment, Value};
///
/// let mut env = Environment::new();
/// env.define("x", Value::Integer(1));
///
/// {
///     let mut guard = env.scope_guard();
///     guard.define("y", Value::Integer(2));
///     // y is visible here
/// }
/// // guard dropped, scope left, y is gone
/// assert!(!env.contains("y"));
/// assert!(env.contains("x"));
/// ```
pub struct ScopeGuard<'a> {
    env: &'a mut Environment,
    previous: Option<ScopeRef>,
}

impl Environment {
    /// Create a guard that enters a child of the current scope now and
    /// leaves it on drop.
    pub fn scope_guard(&mut self) -> ScopeGuard<'_> {
        let child = Scope::child(&self.current);
        self.enter_guard(child)
    }

    /// Create a guard that makes `scope` current now and restores the
    /// previous scope on drop.
    pub fn enter_guard(&mut self, scope: ScopeRef) -> ScopeGuard<'_> {
        let previous = self.enter_scope(scope);
        ScopeGuard {
            env: self,
            previous: Some(previous),
        }
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.env.restore_scope(previous);
        }
    }
}

impl std::ops::Deref for ScopeGuard<'_> {
    type Target = Environment;

    fn deref(&self) -> &Self::Target {
        self.env
    }
}

impl std::ops::DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.env
    }
}
