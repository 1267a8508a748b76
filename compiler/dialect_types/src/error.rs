//! Errors of the scalar type system.

use dialect_diagnostic::{Diagnostic, ErrorCode};
use dialect_ir::Pos;
use thiserror::Error;

use crate::ScalarKind;

/// Promotion or coercion failure.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("no common type for {left} and {right}")]
    NoCommonType { left: ScalarKind, right: ScalarKind },

    #[error("cannot coerce {from} to {to}")]
    Coercion { from: ScalarKind, to: ScalarKind },

    #[error("{literal} cannot be represented as {to}")]
    Unrepresentable { literal: String, to: ScalarKind },
}

impl TypeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TypeError::NoCommonType { .. } => ErrorCode::E2001,
            TypeError::Coercion { .. } => ErrorCode::E2002,
            TypeError::Unrepresentable { .. } => ErrorCode::E2003,
        }
    }

    #[cold]
    pub fn to_diagnostic(&self, pos: Pos) -> Diagnostic {
        Diagnostic::error(self.code())
            .with_message(self.to_string())
            .with_label(pos, "type error")
    }
}

/// What was wrong with a literal.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseProblem {
    #[error("empty literal")]
    Empty,

    #[error("expected {0}")]
    Malformed(&'static str),

    #[error("value out of range")]
    OutOfRange,

    #[error("invalid escape sequence `{0}`")]
    InvalidEscape(String),

    #[error("unterminated text")]
    Unterminated,

    #[error("minimum {min} exceeds maximum {max}")]
    InvertedRange { min: u64, max: u64 },
}

/// A literal that does not conform to its kind's textual form.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid {kind} literal `{text}`: {problem}")]
pub struct ParseError {
    pub kind: ScalarKind,
    pub text: String,
    pub problem: ParseProblem,
}

impl ParseError {
    pub(crate) fn new(kind: ScalarKind, text: &str, problem: ParseProblem) -> Self {
        ParseError {
            kind,
            text: text.to_string(),
            problem,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match (&self.problem, self.kind) {
            (ParseProblem::OutOfRange, _) => ErrorCode::E1002,
            (ParseProblem::InvalidEscape(_) | ParseProblem::Unterminated, _) => ErrorCode::E1003,
            (_, ScalarKind::Date | ScalarKind::Time | ScalarKind::DateTime) => ErrorCode::E1004,
            (_, ScalarKind::Cardinality) => ErrorCode::E1005,
            _ => ErrorCode::E1001,
        }
    }

    #[cold]
    pub fn to_diagnostic(&self, pos: Pos) -> Diagnostic {
        Diagnostic::error(self.code())
            .with_message(self.to_string())
            .with_label(pos, format!("expected a {} literal", self.kind))
    }
}
