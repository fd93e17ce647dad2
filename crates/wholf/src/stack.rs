//! Native stack growth for deeply nested source.
//!
//! The parser and evaluator both recurse once per nesting level. Interpreted
//! recursion is bounded by the call-depth limit, but a single expression such
//! as `((((...))))` can still nest arbitrarily deep, so each recursive entry
//! point runs through [`ensure_sufficient_stack`].

/// Run `f`, growing the native stack first if less than the red zone remains.
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    /// Minimum stack space to keep available (100KB).
    const RED_ZONE: usize = 100 * 1024;

    /// Stack space to allocate when growing (1MB).
    const STACK_PER_RECURSION: usize = 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
