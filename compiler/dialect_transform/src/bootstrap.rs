//! Dialects described as documents.
//!
//! A dialect document is transformed with a fixed bootstrap schema into
//! [`Record`]s, which are then declared to a [`SchemaBuilder`]. Every object
//! rule of a loaded dialect builds [`Record`]s.
//!
//! ```text
//! Dialect {
//!     key: people;
//!     Property { key: Name; type: text; minLength: 1; }
//!     Property { key: Email; type: text; pattern: ".+@.+"; }
//!     Object {
//!         key: Person; root; keyMember: Name;
//!         Member { key: Name; }
//!         Member { key: Email; cardinality: 0..*; }
//!     }
//! }
//! ```

use std::str::FromStr;
use std::sync::OnceLock;

use dialect_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use dialect_eval::FunctionRegistry;
use dialect_ir::{Document, NodeId, NodeKind, Pos};
use dialect_schema::{
    CollectionKind, Constraint, MemberDecl, ObjectDecl, PropertyDecl, Schema, SchemaBuildError,
    SchemaBuilder,
};
use dialect_types::{coerce, parse, Cardinality, ScalarKind, Value};
use rustc_hash::FxHashMap;

use crate::record::{record_factory, Record};
use crate::transformer::Transformer;

/// Member every bootstrap object is keyed by.
const KEY: &str = "key";

/// A dialect ready to transform documents.
#[derive(Debug)]
pub struct LoadedDialect {
    /// Value of the dialect's `key` member.
    pub name: String,
    pub schema: Schema<Record>,
    /// Schema warnings, positioned at the declaration they concern.
    pub warnings: Vec<Diagnostic>,
}

/// The schema dialect documents are validated against.
pub fn bootstrap_schema() -> Result<&'static Schema<Record>, SchemaBuildError> {
    static BOOTSTRAP: OnceLock<Result<Schema<Record>, SchemaBuildError>> = OnceLock::new();
    BOOTSTRAP.get_or_init(build_bootstrap).as_ref().map_err(Clone::clone)
}

fn build_bootstrap() -> Result<Schema<Record>, SchemaBuildError> {
    use ScalarKind::{Any, Boolean, Identifier, Integer, Text};

    let kinds = ScalarKind::ALL
        .iter()
        .map(|kind| Value::Identifier(kind.name().to_string()))
        .collect();
    let collections = CollectionKind::ALL
        .iter()
        .map(|kind| Value::Identifier(kind.name().to_string()))
        .collect();
    let non_negative = Constraint::Range {
        min: Some(Value::Integer(0)),
        max: None,
    };
    let one = Cardinality::ONE;
    let optional = Cardinality::OPTIONAL;
    let many = Cardinality::MANY;

    let mut builder = SchemaBuilder::new();
    builder
        .property(PropertyDecl::new(KEY, Identifier))
        .property(PropertyDecl::new("type", Identifier).with_constraint(Constraint::Choice(kinds)))
        .property(PropertyDecl::new("pattern", Text))
        .property(PropertyDecl::new("choice", Any))
        .property(PropertyDecl::new("min", Any))
        .property(PropertyDecl::new("max", Any))
        .property(PropertyDecl::new("minLength", Integer).with_constraint(non_negative.clone()))
        .property(PropertyDecl::new("maxLength", Integer).with_constraint(non_negative))
        .property(PropertyDecl::new("root", Boolean))
        .property(PropertyDecl::new("alias", Identifier))
        .property(PropertyDecl::new("describes", Identifier))
        .property(PropertyDecl::new("keyMember", Identifier))
        .property(PropertyDecl::new("cardinality", ScalarKind::Cardinality))
        .property(
            PropertyDecl::new("collection", Identifier)
                .with_constraint(Constraint::Choice(collections)),
        )
        .object(
            ObjectDecl::new("Dialect")
                .root()
                .key_member(KEY)
                .member(KEY, one)
                .member_as("Property", many, CollectionKind::Map)
                .member_as("Object", many, CollectionKind::Map)
                .with_factory(record_factory()),
        )
        .object(
            ObjectDecl::new("Property")
                .key_member(KEY)
                .member(KEY, one)
                .member("type", one)
                .member("pattern", optional)
                .member("choice", many)
                .member("min", optional)
                .member("max", optional)
                .member("minLength", optional)
                .member("maxLength", optional)
                .with_factory(record_factory()),
        )
        .object(
            ObjectDecl::new("Object")
                .key_member(KEY)
                .member(KEY, one)
                .member("root", optional)
                .member("alias", optional)
                .member("describes", optional)
                .member("keyMember", optional)
                .member_as("Member", many, CollectionKind::Map)
                .with_factory(record_factory()),
        )
        .object(
            ObjectDecl::new("Member")
                .key_member(KEY)
                .member(KEY, one)
                .member("cardinality", optional)
                .member("collection", optional)
                .with_factory(record_factory()),
        );
    builder.build()
}

/// Load the dialect described by the tree rooted at `root`.
///
/// Returns every diagnostic on failure: violations of the bootstrap schema
/// first, otherwise the declarations that cannot be built.
#[tracing::instrument(level = "debug", skip_all)]
pub fn load_dialect(doc: &Document, root: NodeId) -> Result<LoadedDialect, DiagnosticQueue> {
    let root_pos = doc.try_get(root).map_or(Pos::DUMMY, |node| node.pos);
    let bootstrap = match bootstrap_schema() {
        Ok(schema) => schema,
        Err(err) => {
            let mut diagnostics = DiagnosticQueue::new();
            diagnostics.add(
                Diagnostic::error(ErrorCode::E9001)
                    .with_message(format!("bootstrap schema is invalid: {err}")),
            );
            return Err(diagnostics);
        }
    };

    let library = FunctionRegistry::with_builtins();
    let transformation = Transformer::new(bootstrap, &library).transform(doc, root);
    if !transformation.is_success() {
        return Err(transformation.diagnostics);
    }
    let mut diagnostics = transformation.diagnostics;
    let Some(dialect) = transformation.value else {
        diagnostics.add(
            Diagnostic::error(ErrorCode::E9001)
                .with_message("dialect document produced no value")
                .with_label(root_pos, "in this document"),
        );
        return Err(diagnostics);
    };

    let positions = declaration_positions(doc);
    let pos_of = |rule: Option<&str>| {
        rule.and_then(|key| positions.get(key).copied())
            .unwrap_or(root_pos)
    };

    let mut builder = SchemaBuilder::new();
    for property in dialect.objects("Property") {
        match property_decl(property) {
            Ok(decl) => {
                builder.property(decl);
            }
            Err(err) => {
                diagnostics.add(err.to_diagnostic(pos_of(err.rule())));
            }
        }
    }
    for object in dialect.objects("Object") {
        builder.object(object_decl(object));
    }
    if diagnostics.has_errors().is_some() {
        return Err(diagnostics);
    }

    let schema = match builder.build() {
        Ok(schema) => schema,
        Err(err) => {
            diagnostics.add(err.to_diagnostic(pos_of(err.rule())));
            return Err(diagnostics);
        }
    };
    let warnings = schema
        .warnings()
        .iter()
        .map(|warning| warning.to_diagnostic(pos_of(Some(warning.rule()))))
        .collect();
    let name = dialect.value(KEY).map(Value::key_string).unwrap_or_default();
    tracing::debug!(dialect = %name, rules = schema.len(), "dialect loaded");

    Ok(LoadedDialect {
        name,
        schema,
        warnings,
    })
}

fn identifier<'a>(record: &'a Record, name: &str) -> Option<&'a str> {
    record.value(name).and_then(Value::as_str)
}

fn property_decl(record: &Record) -> Result<PropertyDecl, SchemaBuildError> {
    let key = identifier(record, KEY).unwrap_or_default();
    let invalid = |reason: String| SchemaBuildError::InvalidConstraint {
        property: key.to_string(),
        reason,
    };

    let type_name = identifier(record, "type").unwrap_or_default();
    let kind = ScalarKind::from_name(type_name)
        .ok_or_else(|| invalid(format!("unknown kind `{type_name}`")))?;
    let mut decl = PropertyDecl::new(key, kind);

    if let Some(pattern) = record.value("pattern").and_then(Value::as_str) {
        let constraint = Constraint::pattern(pattern)
            .map_err(|err| invalid(format!("invalid pattern: {err}")))?;
        decl = decl.with_constraint(constraint);
    }

    let choices = record
        .values("choice")
        .map(|value| conform(value, kind).ok_or_else(|| invalid(format!("choice {value} is not a {kind}"))))
        .collect::<Result<Vec<_>, _>>()?;
    if !choices.is_empty() {
        decl = decl.with_constraint(Constraint::Choice(choices));
    }

    let bound = |name: &str| {
        record
            .value(name)
            .map(|value| conform(value, kind).ok_or_else(|| invalid(format!("{name} {value} is not a {kind}"))))
            .transpose()
    };
    let (min, max) = (bound("min")?, bound("max")?);
    if min.is_some() || max.is_some() {
        decl = decl.with_constraint(Constraint::Range { min, max });
    }

    let length = |name: &str| match record.value(name) {
        Some(Value::Integer(n)) => usize::try_from(*n)
            .map(Some)
            .map_err(|_| invalid(format!("{name} {n} is out of range"))),
        _ => Ok(None),
    };
    let (min_length, max_length) = (length("minLength")?, length("maxLength")?);
    if min_length.is_some() || max_length.is_some() {
        decl = decl.with_constraint(Constraint::Length {
            min: min_length,
            max: max_length,
        });
    }
    Ok(decl)
}

/// Constraint operands are written without a kind; read them as `kind`.
fn conform(value: &Value, kind: ScalarKind) -> Option<Value> {
    if kind == ScalarKind::Any || value.kind() == kind {
        return Some(value.clone());
    }
    coerce(value.clone(), kind)
        .ok()
        .or_else(|| parse(kind, &value.key_string()).ok())
}

fn object_decl(record: &Record) -> ObjectDecl<Record> {
    let mut decl = ObjectDecl::new(identifier(record, KEY).unwrap_or_default());
    if record.value("root") == Some(&Value::Boolean(true)) {
        decl = decl.root();
    }
    if let Some(alias) = identifier(record, "alias") {
        decl = decl.alias(alias);
    }
    if let Some(type_name) = identifier(record, "describes") {
        decl = decl.describes(type_name);
    }
    for member in record.objects("Member") {
        let cardinality = match member.value("cardinality") {
            Some(Value::Cardinality(cardinality)) => *cardinality,
            _ => Cardinality::ONE,
        };
        let name = identifier(member, KEY).unwrap_or_default();
        // A required `key` member keys the object unless told otherwise.
        if name == KEY && cardinality == Cardinality::ONE {
            decl = decl.key_member(KEY);
        }
        let mut member_decl = MemberDecl::new(name, cardinality);
        // Spelling is checked by the bootstrap choice constraint.
        if let Some(Ok(collection)) = identifier(member, "collection").map(CollectionKind::from_str) {
            member_decl = member_decl.with_collection(collection);
        }
        decl = decl.with_member(member_decl);
    }
    if let Some(key_member) = identifier(record, "keyMember") {
        decl = decl.key_member(key_member);
    }
    decl.with_factory(record_factory())
}

/// Position of each `Property` and `Object` declaration by key.
fn declaration_positions(doc: &Document) -> FxHashMap<String, Pos> {
    let mut positions = FxHashMap::default();
    for (_, node) in doc.iter() {
        let NodeKind::Object {
            name: Some(name),
            members,
        } = &node.kind
        else {
            continue;
        };
        if name != "Property" && name != "Object" {
            continue;
        }
        let key = members.iter().find_map(|&member| {
            let NodeKind::Pair {
                name,
                value: Some(value),
            } = &doc.try_get(member)?.kind
            else {
                return None;
            };
            if name != KEY {
                return None;
            }
            match &doc.try_get(*value)?.kind {
                NodeKind::Scalar { kind, raw } => parse(*kind, raw).ok().map(|v| v.key_string()),
                _ => None,
            }
        });
        if let Some(key) = key {
            // Later declarations win, so a duplicate points at the repeat.
            positions.insert(key, node.pos);
        }
    }
    positions
}
