//! Stack growth for deeply nested input.
//!
//! The parser, checker and emitter all recurse on the shape of the source, so
//! a pasted expression like `((((...))))` can nest arbitrarily deep. Each
//! recursive entry point wraps its body in [`with_stack`], which switches to a
//! freshly allocated segment when fewer than [`RED_ZONE`] bytes remain.
//! On wasm the call is a passthrough.

/// Remaining stack below which a new segment is allocated.
pub const RED_ZONE: usize = 100 * 1024;

/// Size of each additional segment.
pub const SEGMENT_SIZE: usize = 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn with_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn with_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::with_stack;

    fn nest(depth: u32) -> u32 {
        with_stack(|| if depth == 0 { 0 } else { 1 + nest(depth - 1) })
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        assert_eq!(nest(200_000), 200_000);
    }

    #[test]
    fn test_passes_result_through() {
        let r: Result<u8, String> = with_stack(|| Err("boom".to_string()));
        assert_eq!(r, Err("boom".to_string()));
    }
}
