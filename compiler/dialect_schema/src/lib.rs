//! Schema model for Dialect documents.
//!
//! A schema is a set of rules. A [`PropertyRule`] describes a scalar member
//! (kind and constraints); an [`ObjectRule`] describes an object: which rules
//! it may contain ([`Relationship`]s with cardinality and collection kind),
//! its key member, and the factory that builds the typed value.
//!
//! Schemas are declared through [`SchemaBuilder`] and frozen by
//! [`SchemaBuilder::build`]. The frozen [`Schema`] is read-only and shared
//! between transformer runs.

mod builder;
mod constraint;
mod error;
mod rule;
mod schema;
mod slot;

pub use builder::{MemberDecl, ObjectDecl, PropertyDecl, SchemaBuilder};
pub use constraint::Constraint;
pub use error::{SchemaBuildError, SchemaWarning};
pub use rule::{CollectionKind, ObjectRule, PropertyRule, Relationship, Rule, RuleId};
pub use schema::Schema;
pub use slot::{Factory, FactoryArgs, Member, Slot};
