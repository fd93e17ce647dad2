//! Value trait implementations: constructors, predicates, extractors, From traits, PartialEq

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use super::*;
use crate::stack::ensure_sufficient_stack;

// ═══════════════════════════════════════════════════════════════════
// Convenience Constructors
// ═══════════════════════════════════════════════════════════════════

impl Value {
    /// Create a string value
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    /// Create an array value
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    /// Create an object value from ordered entries
    pub fn object(entries: Vec<(String, Value)>) -> Self {
        let map: IndexMap<String, Value> = entries.into_iter().collect();
        Value::Object(Rc::new(RefCell::new(map)))
    }

    /// Wrap a function value
    pub fn function(func: FunctionValue) -> Self {
        Value::Function(Rc::new(func))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Type Predicates
    // ═══════════════════════════════════════════════════════════════════

    /// Truthiness for conditions and `!`.
    ///
    /// `false`, `null`, `undefined`, `0`, `0.0`, `NaN` and `""` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Integer(n) => *n != 0,
            Value::Float(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Check if value is numeric (integer or float)
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// Check if value is callable (function, builtin or class)
    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            Value::Function(_) | Value::BuiltinFn(_) | Value::Class(_)
        )
    }

    // ═══════════════════════════════════════════════════════════════════
    // Extractors (return Option for safe access)
    // ═══════════════════════════════════════════════════════════════════

    /// Extract integer value
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract as f64 (converts from integers)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(&**s),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// PartialEq Implementation
// ═══════════════════════════════════════════════════════════════════

/// Language equality, as used by `==` and `!=`.
///
/// Integers and floats compare numerically. Arrays and objects compare
/// structurally. Functions, classes and instances compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        values_equal(self, other, &mut Vec::new())
    }
}

/// Container pairs whose comparison is in progress.
///
/// Arrays and objects can contain themselves, so a pair met again while
/// it is still being compared is assumed equal; any real difference is
/// found along another path.
type InProgress = Vec<(*const (), *const ())>;

fn values_equal(left: &Value, right: &Value, in_progress: &mut InProgress) -> bool {
    match (left, right) {
        (Value::Undefined, Value::Undefined) => true,
        (Value::Null, Value::Null) => true,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,

        // Numbers
        (Value::Integer(a), Value::Integer(b)) => a == b,
        (Value::Float(a), Value::Float(b)) => a == b,
        (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
            (*a as f64) == *b
        }

        (Value::String(a), Value::String(b)) => a == b,

        // Collections (element-wise comparison)
        (Value::Array(a), Value::Array(b)) => {
            if Rc::ptr_eq(a, b) {
                return true;
            }
            nested(Rc::as_ptr(a).cast(), Rc::as_ptr(b).cast(), in_progress, |in_progress| {
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|(x, y)| values_equal(x, y, in_progress))
            })
        }
        (Value::Object(a), Value::Object(b)) => {
            if Rc::ptr_eq(a, b) {
                return true;
            }
            nested(Rc::as_ptr(a).cast(), Rc::as_ptr(b).cast(), in_progress, |in_progress| {
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len()
                    && a.iter().all(|(key, x)| {
                        b.get(key)
                            .is_some_and(|y| values_equal(x, y, in_progress))
                    })
            })
        }

        // Identity
        (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
        (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
        (Value::Function(a), Value::Function(b)) => {
            Rc::ptr_eq(a, b)
                || (Rc::ptr_eq(&a.decl, &b.decl)
                    && Rc::ptr_eq(&a.closure, &b.closure)
                    && match (&a.receiver, &b.receiver) {
                        (Some(x), Some(y)) => values_equal(x, y, in_progress),
                        (None, None) => true,
                        _ => false,
                    })
        }
        (Value::BuiltinFn(a), Value::BuiltinFn(b)) => Rc::ptr_eq(&a.func, &b.func),

        // Different types are never equal
        _ => false,
    }
}

fn nested(
    a: *const (),
    b: *const (),
    in_progress: &mut InProgress,
    compare: impl FnOnce(&mut InProgress) -> bool,
) -> bool {
    if in_progress.contains(&(a, b)) {
        return true;
    }
    in_progress.push((a, b));
    let equal = ensure_sufficient_stack(|| compare(in_progress));
    in_progress.pop();
    equal
}

// ═══════════════════════════════════════════════════════════════════
// From Trait Implementations
// ═══════════════════════════════════════════════════════════════════

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}
