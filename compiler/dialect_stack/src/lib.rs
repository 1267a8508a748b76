//! Stack growth for the recursive walks of the pipeline.
//!
//! Expression building, evaluation and the transformer all recurse once per
//! tree level. Documents nest as deep as their authors like, so every
//! recursive step goes through [`ensure_sufficient_stack`], which moves onto
//! a freshly allocated segment when the current one runs low.
//!
//! [`Nesting`] additionally bounds the depth so that a pathological input
//! is reported instead of exhausting memory.
//!
//! On `wasm32` the guard is a plain call.

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated segment.
const SEGMENT_SIZE: usize = 1024 * 1024;

/// Default maximum nesting depth of a document or expression.
pub const DEFAULT_MAX_DEPTH: usize = 10_000;

/// Run `f`, growing the stack first if less than the red zone remains.
///
/// ```text
/// fn walk(&mut self, id: NodeId) -> Option<Value> {
///     ensure_sufficient_stack(|| {
///         // ... recurse into children ...
///     })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Depth counter for a recursive walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nesting {
    depth: usize,
    limit: usize,
}

impl Default for Nesting {
    fn default() -> Self {
        Nesting::with_limit(DEFAULT_MAX_DEPTH)
    }
}

impl Nesting {
    pub const fn with_limit(limit: usize) -> Self {
        Nesting { depth: 0, limit }
    }

    #[inline]
    pub const fn depth(self) -> usize {
        self.depth
    }

    #[inline]
    pub const fn limit(self) -> usize {
        self.limit
    }

    /// Descend one level; `false` once the limit would be exceeded.
    #[inline]
    pub fn enter(&mut self) -> bool {
        if self.depth >= self.limit {
            return false;
        }
        self.depth += 1;
        true
    }

    /// Return from a level entered with [`Nesting::enter`].
    #[inline]
    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A chain of nested arrays, as in `[[[[...]]]]`.
    enum Nested {
        Leaf,
        Array(Box<Nested>),
    }

    fn build(depth: usize) -> Nested {
        (0..depth).fold(Nested::Leaf, |inner, _| Nested::Array(Box::new(inner)))
    }

    fn measure(node: &Nested) -> usize {
        ensure_sufficient_stack(|| match node {
            Nested::Leaf => 0,
            Nested::Array(inner) => measure(inner) + 1,
        })
    }

    fn drop_iteratively(mut node: Nested) {
        while let Nested::Array(inner) = node {
            node = *inner;
        }
    }

    #[test]
    fn test_shallow_walk() {
        assert_eq!(measure(&build(3)), 3);
    }

    #[test]
    fn test_deep_walk() {
        let deep = build(200_000);
        assert_eq!(measure(&deep), 200_000);
        drop_iteratively(deep);
    }

    #[test]
    fn test_passes_results_through() {
        let result: Result<u8, &str> = ensure_sufficient_stack(|| Err("nope"));
        assert_eq!(result, Err("nope"));
    }

    #[test]
    fn test_nesting_limit() {
        let mut nesting = Nesting::with_limit(2);
        assert!(nesting.enter());
        assert!(nesting.enter());
        assert!(!nesting.enter());
        assert_eq!(nesting.depth(), 2);
        nesting.leave();
        assert!(nesting.enter());
        nesting.leave();
        nesting.leave();
        nesting.leave();
        assert_eq!(nesting.depth(), 0);
    }
}
