//! Source positions.
//!
//! The external parser reports every node at a 1-based (line, column) pair.
//! Diagnostics are ordered by position, so `Pos` orders line-major.

use std::fmt;

/// A 1-based source position.
///
/// Layout: 8 bytes total (`line: u32`, `column: u32`). Ordering compares the
/// line first, then the column, which is the display order of diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
pub struct Pos {
    pub line: u32,
    pub column: u32,
}

impl Pos {
    /// Position used for synthesized nodes that have no source location.
    pub const DUMMY: Pos = Pos { line: 0, column: 0 };

    /// Create a new position.
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Pos { line, column }
    }

    /// Returns `true` if this position came from real source text.
    #[inline]
    pub const fn is_known(self) -> bool {
        self.line != 0
    }
}

impl fmt::Debug for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
