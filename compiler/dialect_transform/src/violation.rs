//! Schema violations found while transforming a document.

use dialect_diagnostic::{Diagnostic, ErrorCode};
use dialect_ir::Pos;
use dialect_types::Cardinality;
use thiserror::Error;

/// `a, b, c`, or a placeholder when there is nothing to list.
fn alternatives(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

/// A document that does not conform to its schema.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("unknown root `{name}`; expected one of: {}", alternatives(.roots))]
    UnknownRoot { name: String, roots: Vec<String> },

    #[error("unknown member `{name}` in `{object}`; expected one of: {}", alternatives(.expected))]
    UnknownMember {
        name: String,
        object: String,
        expected: Vec<String>,
    },

    #[error("value without a member name in `{context}`")]
    UnnamedValue { context: String },

    #[error("`{member}` expects {expected}, found {found}")]
    WrongKind {
        member: String,
        expected: String,
        found: String,
    },

    #[error("need {cardinality} {member}(s)")]
    Cardinality {
        member: String,
        cardinality: Cardinality,
        found: usize,
    },

    #[error("duplicate key `{key}` in {member}")]
    DuplicateKey { member: String, key: String },

    #[error("{member} entry has no key")]
    MissingKey { member: String },

    #[error("duplicate value {value} in {member}")]
    DuplicateValue { member: String, value: String },

    #[error("{member} may appear only once")]
    DuplicateSingleton { member: String },

    #[error("invalid member `{name}` in `{object}`: {reason}")]
    InvalidMember {
        name: String,
        object: String,
        reason: String,
    },

    #[error("{member}: {reason}")]
    Constraint { member: String, reason: String },

    #[error("cannot build `{rule}`: {reason}")]
    FactoryFailure { rule: String, reason: String },
}

impl SchemaViolation {
    pub fn code(&self) -> ErrorCode {
        match self {
            SchemaViolation::UnknownRoot { .. } => ErrorCode::E4001,
            SchemaViolation::UnknownMember { .. } => ErrorCode::E4002,
            SchemaViolation::UnnamedValue { .. } => ErrorCode::E4003,
            SchemaViolation::WrongKind { .. } => ErrorCode::E4004,
            SchemaViolation::Cardinality { .. } => ErrorCode::E4005,
            SchemaViolation::DuplicateKey { .. } => ErrorCode::E4006,
            SchemaViolation::MissingKey { .. } => ErrorCode::E4007,
            SchemaViolation::DuplicateValue { .. } => ErrorCode::E4008,
            SchemaViolation::DuplicateSingleton { .. } => ErrorCode::E4009,
            SchemaViolation::InvalidMember { .. } => ErrorCode::E4010,
            SchemaViolation::Constraint { .. } => ErrorCode::E4011,
            SchemaViolation::FactoryFailure { .. } => ErrorCode::E4012,
        }
    }

    #[cold]
    pub fn to_diagnostic(&self, pos: Pos) -> Diagnostic {
        let diag = Diagnostic::error(self.code())
            .with_message(self.to_string())
            .with_label(pos, self.code().description());
        match self {
            SchemaViolation::Cardinality { found, .. } => diag.with_note(format!("found {found}")),
            _ => diag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn messages() {
        let v = SchemaViolation::Cardinality {
            member: "Email".to_string(),
            cardinality: Cardinality::AT_LEAST_ONE,
            found: 0,
        };
        assert_eq!(v.to_string(), "need 1..* Email(s)");
        assert_eq!(v.code(), ErrorCode::E4005);

        let v = SchemaViolation::UnknownRoot {
            name: "Persn".to_string(),
            roots: vec!["Person".to_string()],
        };
        assert_eq!(v.to_string(), "unknown root `Persn`; expected one of: Person");
    }

    #[test]
    fn diagnostic_carries_position_and_note() {
        let v = SchemaViolation::Cardinality {
            member: "Email".to_string(),
            cardinality: Cardinality::AT_LEAST_ONE,
            found: 0,
        };
        let diag = v.to_diagnostic(Pos::new(3, 1));
        assert_eq!(diag.primary_pos(), Some(Pos::new(3, 1)));
        assert_eq!(diag.notes, vec!["found 0".to_string()]);
    }
}
