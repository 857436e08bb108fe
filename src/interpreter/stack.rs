//! Stack headroom for recursive parsing and evaluation.
//!
//! A script call costs several Rust frames, so nested calls, `new` chains and
//! deeply parenthesized expressions can outgrow a host thread's stack well
//! before the call-depth limit is reached. Recursive entry points run through
//! [`ensure_sufficient_stack`], which moves onto a fresh stack segment when
//! the current one runs low.

/// Minimum stack space to keep available before recursing.
const RED_ZONE: usize = 128 * 1024;

/// Size of each additional stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
