//! Stack growth for deeply nested Prose programs.
//!
//! The parser, the static checker and the interpreter all recurse on the
//! shape of the source. A program such as `((((((1))))))` nested a few
//! thousand levels deep would exhaust a thread's default stack, so every
//! recursive entry point runs its body through [`ensure_sufficient_stack`].

/// Remaining stack below which a new segment is allocated.
const MIN_REMAINING: usize = 128 * 1024;

/// Size of each freshly allocated stack segment.
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first switching to a fresh stack segment when less than
/// [`MIN_REMAINING`] bytes are left on the current one.
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(MIN_REMAINING, SEGMENT_SIZE, f)
}

#[cfg(test)]
mod tests {
    use super::ensure_sufficient_stack;

    fn nest(depth: u32) -> u32 {
        ensure_sufficient_stack(|| if depth == 0 { 0 } else { 1 + nest(depth - 1) })
    }

    #[test]
    fn passes_value_through() {
        assert_eq!(ensure_sufficient_stack(|| "prose"), "prose");
    }

    #[test]
    fn survives_deep_nesting() {
        assert_eq!(nest(200_000), 200_000);
    }
}
