//! Value representation for runtime values

mod callable;
mod compound;
mod display;
mod impls;

pub use callable::{BuiltinFn, BuiltinFnPtr, FunctionValue};
pub use compound::{ClassValue, InstanceValue, CONSTRUCTOR};

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

/// Shared, mutable array storage.
pub type ArrayRef = Rc<RefCell<Vec<Value>>>;

/// Shared, mutable object storage (insertion-ordered).
pub type ObjectRef = Rc<RefCell<IndexMap<String, Value>>>;

/// Runtime value representation for the Wholf interpreter.
///
/// Values are organized into three tiers:
/// - Tier 1: Inline primitives (no allocation)
/// - Tier 2: Shared compound types (`Rc`-wrapped, mutated in place)
/// - Tier 3: Callable types (functions, builtins, classes)
///
/// Cloning a value never copies an array, object or instance; the clone
/// aliases the same storage. Values are `!Send`: an interpreter and
/// everything it produces stay on one thread.
#[derive(Clone)]
pub enum Value {
    // ═══════════════════════════════════════════════════════════════════
    // Tier 1: Inline Primitives
    // ═══════════════════════════════════════════════════════════════════
    /// `undefined`: uninitialized variables, functions without `return`
    Undefined,

    /// `null`
    Null,

    /// Boolean: `true` or `false`
    Boolean(bool),

    /// 64-bit signed integer
    Integer(i64),

    /// 64-bit floating point
    Float(f64),

    // ═══════════════════════════════════════════════════════════════════
    // Tier 2: Shared Compound Types
    // ═══════════════════════════════════════════════════════════════════
    /// Immutable string
    String(Rc<str>),

    /// Ordered, growable sequence
    Array(ArrayRef),

    /// Mapping from property name to value
    Object(ObjectRef),

    /// Class instance
    Instance(Rc<InstanceValue>),

    // ═══════════════════════════════════════════════════════════════════
    // Tier 3: Callable Types
    // ═══════════════════════════════════════════════════════════════════
    /// User-defined function or lambda
    Function(Rc<FunctionValue>),

    /// Built-in native function
    BuiltinFn(BuiltinFn),

    /// Class; calling it creates an instance
    Class(Rc<ClassValue>),
}
