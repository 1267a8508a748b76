//! Proof that an error was reported.

use std::fmt;

/// Zero-sized proof that at least one error diagnostic was emitted.
///
/// Only the queue hands these out, so a `Result<T, ErrorGuaranteed>` cannot
/// fail silently.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    pub(crate) const fn new() -> Self {
        ErrorGuaranteed(())
    }

    /// Proof derived from an error count; `None` when nothing was reported.
    pub fn from_error_count(count: usize) -> Option<Self> {
        (count > 0).then(Self::new)
    }
}

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("error(s) emitted")
    }
}

#[cfg(test)]
mod tests;
