//! Stack safety for deep recursion.
//!
//! The parser and the tree-walking evaluator both recurse once per nesting
//! level of the source program. Wrapping those recursive entry points in
//! [`ensure_sufficient_stack`] grows the stack on demand instead of
//! overflowing on deeply nested input or deep (but bounded) user recursion.
//!
//! - **Red zone**: 100KB. If less than this remains, the stack is grown.
//! - **Growth size**: 1MB per growth.
//!
//! On WASM targets this is a passthrough.

const RED_ZONE: usize = 100 * 1024;

const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version: call directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_recursion() {
        fn depth(n: u64) -> u64 {
            ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
        }

        assert_eq!(depth(100_000), 100_000);
    }

    #[test]
    fn test_passes_through_result() {
        let result: Result<i32, &str> = ensure_sufficient_stack(|| Err("boom"));
        assert_eq!(result, Err("boom"));
    }
}
