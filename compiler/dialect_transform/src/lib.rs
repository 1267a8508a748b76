//! Schema-driven transformation of Dialect documents.
//!
//! [`Transformer`] walks a generic tree, checks it against a
//! [`Schema`](dialect_schema::Schema), evaluates scalar expressions and
//! builds typed values through the schema's factories. Violations become
//! diagnostics; the walk continues past them so one run reports every
//! independent problem.
//!
//! [`load_dialect`] turns a dialect document into a schema over [`Record`]s.

mod bootstrap;
mod frame;
mod record;
mod transformer;
mod violation;

pub use bootstrap::{bootstrap_schema, load_dialect, LoadedDialect};
pub use record::{record_factory, Record};
pub use transformer::{Transformation, Transformer};
pub use violation::SchemaViolation;

use dialect_eval::Library;
use dialect_ir::{Document, NodeId};
use dialect_schema::Schema;

/// Transform `doc` from `root` with default settings.
pub fn transform<T>(
    schema: &Schema<T>,
    library: &dyn Library,
    doc: &Document,
    root: NodeId,
) -> Transformation<T> {
    Transformer::new(schema, library).transform(doc, root)
}
