//! Occurrence ranges.

use std::fmt;
use std::str::FromStr;

use crate::{ParseError, ParseProblem, ScalarKind};

/// Inclusive occurrence range `[min, max]`; `max == None` is unbounded (`*`).
///
/// Invariant: `min <= max` when bounded. [`Cardinality::ZERO`] is a valid
/// value but never a valid declared member cardinality.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Cardinality {
    min: u64,
    max: Option<u64>,
}

impl Cardinality {
    /// `0..0`
    pub const ZERO: Cardinality = Cardinality {
        min: 0,
        max: Some(0),
    };
    /// `0..1`
    pub const OPTIONAL: Cardinality = Cardinality {
        min: 0,
        max: Some(1),
    };
    /// `1..1`
    pub const ONE: Cardinality = Cardinality {
        min: 1,
        max: Some(1),
    };
    /// `0..*`
    pub const MANY: Cardinality = Cardinality { min: 0, max: None };
    /// `1..*`
    pub const AT_LEAST_ONE: Cardinality = Cardinality { min: 1, max: None };

    /// Create a range, `None` if `min > max`.
    pub const fn new(min: u64, max: Option<u64>) -> Option<Self> {
        match max {
            Some(max) if min > max => None,
            _ => Some(Cardinality { min, max }),
        }
    }

    /// `n..n`
    pub const fn exactly(n: u64) -> Self {
        Cardinality {
            min: n,
            max: Some(n),
        }
    }

    #[inline]
    pub const fn min(self) -> u64 {
        self.min
    }

    #[inline]
    pub const fn max(self) -> Option<u64> {
        self.max
    }

    /// Returns `true` if `count` occurrences satisfy this range.
    #[inline]
    pub const fn is_valid(self, count: u64) -> bool {
        count >= self.min
            && match self.max {
                Some(max) => count <= max,
                None => true,
            }
    }

    /// At most one occurrence.
    #[inline]
    pub const fn is_singleton(self) -> bool {
        matches!(self.max, Some(max) if max <= 1)
    }

    #[inline]
    pub const fn is_unbounded(self) -> bool {
        self.max.is_none()
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        matches!(self.max, Some(0))
    }

    #[inline]
    pub const fn is_required(self) -> bool {
        self.min > 0
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Cardinality::ONE
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}..{max}", self.min),
            None => write!(f, "{}..*", self.min),
        }
    }
}

/// Accepts `n`, `*`, `a..b` and `a..*`.
impl FromStr for Cardinality {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let error = |problem| ParseError::new(ScalarKind::Cardinality, text, problem);
        let bound = |part: &str| -> Result<u64, ParseError> {
            let part = part.trim();
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(error(ParseProblem::Malformed("`n`, `*`, `a..b` or `a..*`")));
            }
            part.parse().map_err(|_| error(ParseProblem::OutOfRange))
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(error(ParseProblem::Empty));
        }
        if trimmed == "*" {
            return Ok(Cardinality::MANY);
        }
        let Some((lo, hi)) = trimmed.split_once("..") else {
            return bound(trimmed).map(Cardinality::exactly);
        };
        let min = bound(lo)?;
        let max = if hi.trim() == "*" {
            None
        } else {
            Some(bound(hi)?)
        };
        Cardinality::new(min, max).ok_or_else(|| {
            error(ParseProblem::InvertedRange {
                min,
                max: max.unwrap_or(0),
            })
        })
    }
}

#[cfg(test)]
mod tests;
