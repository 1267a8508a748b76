//! Schema construction errors and warnings.

use dialect_diagnostic::{Diagnostic, ErrorCode};
use dialect_ir::Pos;
use dialect_types::Cardinality;
use thiserror::Error;

use crate::rule::CollectionKind;

/// A schema that cannot be built. Aborts [`crate::SchemaBuilder::build`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SchemaBuildError {
    #[error("rule `{key}` is declared more than once")]
    DuplicateRule { key: String },

    #[error("member `{member}` of `{object}` refers to an unknown rule")]
    UnresolvedMember { object: String, member: String },

    #[error("member `{member}` of `{object}` has cardinality 0..0")]
    ZeroCardinality { object: String, member: String },

    #[error(
        "member `{member}` of `{object}` is a {collection} but has cardinality {cardinality}"
    )]
    InconsistentCollection {
        object: String,
        member: String,
        cardinality: Cardinality,
        collection: CollectionKind,
    },

    #[error("member `{member}` is declared twice in `{object}`")]
    DuplicateMember { object: String, member: String },

    #[error("member `{member}` of `{object}` is a map, but `{member}` has no key member")]
    MapWithoutKey { object: String, member: String },

    #[error("key member `{member}` of `{object}` {reason}")]
    InvalidKeyMember {
        object: String,
        member: String,
        reason: &'static str,
    },

    #[error("object rule `{object}` has no factory")]
    MissingFactory { object: String },

    #[error("root name `{name}` is used by `{first}` and `{second}`")]
    DuplicateRoot {
        name: String,
        first: String,
        second: String,
    },

    #[error("schema declares no root object")]
    NoRoot,

    #[error("invalid constraint on `{property}`: {reason}")]
    InvalidConstraint { property: String, reason: String },
}

impl SchemaBuildError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SchemaBuildError::DuplicateRule { .. } => ErrorCode::E5001,
            SchemaBuildError::UnresolvedMember { .. } => ErrorCode::E5002,
            SchemaBuildError::ZeroCardinality { .. } => ErrorCode::E5003,
            SchemaBuildError::InconsistentCollection { .. } => ErrorCode::E5004,
            SchemaBuildError::DuplicateMember { .. } => ErrorCode::E5005,
            SchemaBuildError::MapWithoutKey { .. } => ErrorCode::E5006,
            SchemaBuildError::InvalidKeyMember { .. } => ErrorCode::E5007,
            SchemaBuildError::MissingFactory { .. } => ErrorCode::E5008,
            SchemaBuildError::DuplicateRoot { .. } => ErrorCode::E5009,
            SchemaBuildError::NoRoot => ErrorCode::E5010,
            SchemaBuildError::InvalidConstraint { .. } => ErrorCode::E5011,
        }
    }

    /// Key of the declaration the error is reported against.
    pub fn rule(&self) -> Option<&str> {
        match self {
            SchemaBuildError::DuplicateRule { key } => Some(key),
            SchemaBuildError::UnresolvedMember { object, .. }
            | SchemaBuildError::ZeroCardinality { object, .. }
            | SchemaBuildError::InconsistentCollection { object, .. }
            | SchemaBuildError::DuplicateMember { object, .. }
            | SchemaBuildError::MapWithoutKey { object, .. }
            | SchemaBuildError::InvalidKeyMember { object, .. }
            | SchemaBuildError::MissingFactory { object } => Some(object),
            SchemaBuildError::DuplicateRoot { second, .. } => Some(second),
            SchemaBuildError::InvalidConstraint { property, .. } => Some(property),
            SchemaBuildError::NoRoot => None,
        }
    }

    #[cold]
    pub fn to_diagnostic(&self, pos: Pos) -> Diagnostic {
        Diagnostic::error(self.code())
            .with_message(self.to_string())
            .with_label(pos, "in this schema declaration")
    }
}

/// Suspicious but legal schema content.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SchemaWarning {
    #[error("unused rule `{key}`")]
    UnusedRule { key: String },
}

impl SchemaWarning {
    pub fn code(&self) -> ErrorCode {
        match self {
            SchemaWarning::UnusedRule { .. } => ErrorCode::E5101,
        }
    }

    /// The name of the rule the warning is about.
    pub fn rule(&self) -> &str {
        match self {
            SchemaWarning::UnusedRule { key } => key,
        }
    }

    pub fn to_diagnostic(&self, pos: Pos) -> Diagnostic {
        Diagnostic::warning(self.code())
            .with_message(self.to_string())
            .with_label(pos, "declared here")
    }
}
