//! Control flow mechanism for break/continue/return

use crate::error::RuntimeError;
use crate::lexer::Span;
use crate::Value;

/// Control flow signal for non-local jumps.
///
/// `break`, `continue` and `return` don't produce a value. They return
/// `Err(RuntimeError::ControlFlow(...))`, which propagates up until a loop
/// or a function call absorbs it.
#[derive(Debug, Clone)]
pub enum ControlFlow {
    /// Leave the innermost loop.
    Break {
        /// Position of the `break`
        span: Span,
    },

    /// Skip to the next iteration of the innermost loop.
    Continue {
        /// Position of the `continue`
        span: Span,
    },

    /// Return from the current function (or the program) with a value.
    Return {
        /// Returned value
        value: Value,
    },
}

impl ControlFlow {
    /// Create a return.
    pub fn return_value(value: Value) -> Self {
        ControlFlow::Return { value }
    }

    /// The error a loop signal becomes once it reaches a boundary with no
    /// enclosing loop.
    fn escaped(self) -> Result<Value, RuntimeError> {
        match self {
            ControlFlow::Return { value } => Ok(value),
            ControlFlow::Break { span } => Err(RuntimeError::BreakOutsideLoop { span: Some(span) }),
            ControlFlow::Continue { span } => {
                Err(RuntimeError::ContinueOutsideLoop { span: Some(span) })
            }
        }
    }
}

impl PartialEq for ControlFlow {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ControlFlow::Break { span: a }, ControlFlow::Break { span: b }) => a == b,
            (ControlFlow::Continue { span: a }, ControlFlow::Continue { span: b }) => a == b,
            (ControlFlow::Return { value: a }, ControlFlow::Return { value: b }) => a == b,
            _ => false,
        }
    }
}

/// Settle the result of a function body.
///
/// A body that runs off its end yields `undefined`; `return` yields its
/// value; `break`/`continue` are errors at the call boundary.
pub fn function_result(result: Result<Value, RuntimeError>) -> Result<Value, RuntimeError> {
    match result {
        Ok(_) => Ok(Value::Undefined),
        Err(RuntimeError::ControlFlow(cf)) => cf.escaped(),
        Err(e) => Err(e),
    }
}

/// Settle the result of a whole program.
///
/// Unlike a function body, a program yields the value of its last
/// statement when it completes normally.
pub fn program_result(result: Result<Value, RuntimeError>) -> Result<Value, RuntimeError> {
    match result {
        Err(RuntimeError::ControlFlow(cf)) => cf.escaped(),
        other => other,
    }
}
