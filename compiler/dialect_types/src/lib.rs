//! Scalar type system for Dialect.
//!
//! Every scalar kind except `any` and `null` has exactly one native
//! representation in [`Value`]. The numeric kinds are ordered by rank
//! (`integer` < `decimal` < `precision`) and only ever widen:
//!
//! - [`common_type`] picks the kind two operands are promoted to
//! - [`widening_distance`] scores how far an argument must widen to reach a
//!   parameter (overload selection)
//! - [`coerce`] performs the widening on a value
//! - [`parse`] reads the textual literal form of each kind; [`Value::to_literal`]
//!   writes it back

mod cardinality;
mod error;
mod literal;
mod promote;
mod value;

pub use cardinality::Cardinality;
pub use dialect_ir::ScalarKind;
pub use error::{ParseError, ParseProblem, TypeError};
pub use literal::{escape_text, infer, parse};
pub use promote::{coerce, common_type, widening_distance};
pub use value::Value;
