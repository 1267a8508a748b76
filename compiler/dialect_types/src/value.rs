//! Runtime scalar values.

use std::cmp::Ordering;
use std::fmt;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use num_traits::ToPrimitive;

use crate::{escape_text, Cardinality, ScalarKind};

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
pub(crate) const TIME_FORMAT: &str = "%H:%M:%S%.f";
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A scalar value, one variant per concrete kind.
#[derive(Clone, Debug)]
pub enum Value {
    Integer(i64),
    Decimal(f64),
    Precision(BigDecimal),
    Boolean(bool),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Identifier(String),
    Path(String),
    Cardinality(Cardinality),
    Null,
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn identifier(s: impl Into<String>) -> Self {
        Value::Identifier(s.into())
    }

    /// The kind of this value. Never `any`.
    pub fn kind(&self) -> ScalarKind {
        match self {
            Value::Integer(_) => ScalarKind::Integer,
            Value::Decimal(_) => ScalarKind::Decimal,
            Value::Precision(_) => ScalarKind::Precision,
            Value::Boolean(_) => ScalarKind::Boolean,
            Value::Text(_) => ScalarKind::Text,
            Value::Date(_) => ScalarKind::Date,
            Value::Time(_) => ScalarKind::Time,
            Value::DateTime(_) => ScalarKind::DateTime,
            Value::Identifier(_) => ScalarKind::Identifier,
            Value::Path(_) => ScalarKind::Path,
            Value::Cardinality(_) => ScalarKind::Cardinality,
            Value::Null => ScalarKind::Null,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Borrow the text of a text-like value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Identifier(s) | Value::Path(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric value as `f64`, lossy for precision.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => i.to_f64(),
            Value::Decimal(d) => Some(*d),
            Value::Precision(p) => p.to_f64(),
            _ => None,
        }
    }

    /// Text used when this value addresses a map entry.
    pub fn key_string(&self) -> String {
        match self {
            Value::Text(s) | Value::Identifier(s) | Value::Path(s) => s.clone(),
            other => other.to_literal(),
        }
    }

    /// Render in the textual form accepted by [`crate::parse`].
    pub fn to_literal(&self) -> String {
        match self {
            Value::Integer(i) => i.to_string(),
            Value::Decimal(d) => format!("{d:?}"),
            Value::Precision(p) => p.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Text(s) => escape_text(s),
            Value::Date(d) => format!("@{}", d.format(DATE_FORMAT)),
            Value::Time(t) => format!("@{}", t.format(TIME_FORMAT)),
            Value::DateTime(dt) => format!("@{}", dt.format(DATETIME_FORMAT)),
            Value::Identifier(s) | Value::Path(s) => s.clone(),
            Value::Cardinality(c) => c.to_string(),
            Value::Null => "null".to_string(),
        }
    }
}

/// Same-kind equality; numeric kinds compare by value, so precision
/// `1.50` equals `1.5`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            #[allow(clippy::float_cmp)]
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Precision(a), Value::Precision(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Text(a), Value::Text(b))
            | (Value::Identifier(a), Value::Identifier(b))
            | (Value::Path(a), Value::Path(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Cardinality(a), Value::Cardinality(b)) => a == b,
            (Value::Null, Value::Null) => true,
            _ => false,
        }
    }
}

/// Same-kind ordering; `None` across kinds and for unordered kinds.
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Decimal(a), Value::Decimal(b)) => a.partial_cmp(b),
            (Value::Precision(a), Value::Precision(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b))
            | (Value::Identifier(a), Value::Identifier(b))
            | (Value::Path(a), Value::Path(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) if a == b => Some(Ordering::Equal),
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_literal())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Decimal(d)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<BigDecimal> for Value {
    fn from(p: BigDecimal) -> Self {
        Value::Precision(p)
    }
}

impl From<Cardinality> for Value {
    fn from(c: Cardinality) -> Self {
        Value::Cardinality(c)
    }
}
