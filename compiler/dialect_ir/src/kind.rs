//! Scalar kind tags.
//!
//! Every value in the expression language has exactly one `ScalarKind`.
//! The three numeric kinds carry an explicit rank (integer < decimal <
//! precision) that drives promotion; all other kinds are mutually exclusive,
//! plus one kind for `null` and the `any` wildcard accepted by schemas.
//!
//! Operator legality is written as exhaustive matches over these kinds in
//! `dialect_eval`; this module only answers the questions shared by every
//! phase (rank, names, categories).

use std::fmt;

/// Kind of a scalar value.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ScalarKind {
    /// 64-bit signed integer.
    Integer,
    /// 64-bit binary floating point.
    Decimal,
    /// Arbitrary-precision decimal.
    Precision,
    /// `true` / `false`.
    Boolean,
    /// UTF-8 text.
    Text,
    /// Calendar date.
    Date,
    /// Wall-clock time.
    Time,
    /// Date and time without zone.
    DateTime,
    /// Bare identifier.
    Identifier,
    /// Navigation path (opaque to the core).
    Path,
    /// Occurrence range such as `1..*`.
    Cardinality,
    /// Wildcard accepted wherever a kind is declared.
    Any,
    /// The `null` value's kind.
    Null,
}

impl ScalarKind {
    /// Every kind, in declaration order.
    pub const ALL: [ScalarKind; 13] = [
        ScalarKind::Integer,
        ScalarKind::Decimal,
        ScalarKind::Precision,
        ScalarKind::Boolean,
        ScalarKind::Text,
        ScalarKind::Date,
        ScalarKind::Time,
        ScalarKind::DateTime,
        ScalarKind::Identifier,
        ScalarKind::Path,
        ScalarKind::Cardinality,
        ScalarKind::Any,
        ScalarKind::Null,
    ];

    /// The numeric kinds in widening order.
    pub const NUMERIC: [ScalarKind; 3] =
        [ScalarKind::Integer, ScalarKind::Decimal, ScalarKind::Precision];

    /// Numeric rank, `None` for non-numeric kinds.
    ///
    /// Widening only ever moves to a higher rank.
    #[inline]
    pub const fn rank(self) -> Option<u8> {
        match self {
            ScalarKind::Integer => Some(0),
            ScalarKind::Decimal => Some(1),
            ScalarKind::Precision => Some(2),
            _ => None,
        }
    }

    /// Returns `true` for integer, decimal and precision.
    #[inline]
    pub const fn is_numeric(self) -> bool {
        self.rank().is_some()
    }

    /// Kinds accepted by the integer-only operators (`%`, bitwise, shifts).
    ///
    /// Precision values qualify by kind; integrality is checked on the value.
    #[inline]
    pub const fn is_integer_class(self) -> bool {
        matches!(self, ScalarKind::Integer | ScalarKind::Precision)
    }

    /// Kinds whose values are plain text at runtime.
    #[inline]
    pub const fn is_text_like(self) -> bool {
        matches!(
            self,
            ScalarKind::Text | ScalarKind::Identifier | ScalarKind::Path
        )
    }

    /// Lower-case name used in messages and dialect descriptions.
    pub const fn name(self) -> &'static str {
        match self {
            ScalarKind::Integer => "integer",
            ScalarKind::Decimal => "decimal",
            ScalarKind::Precision => "precision",
            ScalarKind::Boolean => "boolean",
            ScalarKind::Text => "text",
            ScalarKind::Date => "date",
            ScalarKind::Time => "time",
            ScalarKind::DateTime => "datetime",
            ScalarKind::Identifier => "identifier",
            ScalarKind::Path => "path",
            ScalarKind::Cardinality => "cardinality",
            ScalarKind::Any => "any",
            ScalarKind::Null => "null",
        }
    }

    /// Inverse of [`ScalarKind::name`].
    pub fn from_name(name: &str) -> Option<ScalarKind> {
        ScalarKind::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests;
