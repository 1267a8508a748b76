//! Property-based tests for record serialization.
//!
//! Random records of a fixed schema are written back as generic trees and
//! transformed again; the result must equal the original record.

#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use std::collections::BTreeSet;

use dialect_eval::FunctionRegistry;
use dialect_ir::ScalarKind;
use dialect_schema::{CollectionKind, Member, ObjectDecl, PropertyDecl, Schema, SchemaBuilder, Slot};
use dialect_transform::{record_factory, transform, Record};
use dialect_types::{Cardinality, Value};
use proptest::prelude::*;

fn schema() -> Schema<Record> {
    let mut builder = SchemaBuilder::new();
    builder
        .property(PropertyDecl::new("Name", ScalarKind::Identifier))
        .property(PropertyDecl::new("Label", ScalarKind::Text))
        .property(PropertyDecl::new("Count", ScalarKind::Integer))
        .property(PropertyDecl::new("Ratio", ScalarKind::Decimal))
        .property(PropertyDecl::new("Enabled", ScalarKind::Boolean))
        .property(PropertyDecl::new("Tag", ScalarKind::Identifier))
        .object(
            ObjectDecl::new("Item")
                .key_member("Name")
                .member("Name", Cardinality::ONE)
                .member("Count", Cardinality::OPTIONAL)
                .with_factory(record_factory()),
        )
        .object(
            ObjectDecl::new("Config")
                .root()
                .member("Label", Cardinality::ONE)
                .member("Count", Cardinality::ONE)
                .member("Ratio", Cardinality::OPTIONAL)
                .member("Enabled", Cardinality::OPTIONAL)
                .member_as("Tag", Cardinality::MANY, CollectionKind::Set)
                .member_as("Item", Cardinality::MANY, CollectionKind::Map)
                .with_factory(record_factory()),
        );
    builder.build().unwrap()
}

// -- Strategies --

fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,6}"
}

fn single(value: Value) -> Slot<Record> {
    Slot::Single(Member::Value(value))
}

fn optional(value: Option<Value>) -> Slot<Record> {
    value.map_or(Slot::Absent, single)
}

fn item(name: &str, count: Option<i64>) -> Record {
    Record {
        rule: "Item".to_string(),
        fields: vec![
            ("Name".to_string(), single(Value::Identifier(name.to_string()))),
            ("Count".to_string(), optional(count.map(Value::Integer))),
        ],
    }
}

prop_compose! {
    fn config()(
        label in "[ -~]{0,12}",
        count in any::<i64>(),
        ratio in proptest::option::of(-1.0e9..1.0e9f64),
        enabled in proptest::option::of(any::<bool>()),
        tags in proptest::collection::btree_set(identifier(), 0..4),
        items in proptest::collection::btree_map(identifier(), proptest::option::of(0..100i64), 0..4),
    ) -> Record {
        let tags: BTreeSet<String> = tags;
        let tag_slot = if tags.is_empty() {
            Slot::Absent
        } else {
            Slot::Set(tags.into_iter().map(|t| Member::Value(Value::Identifier(t))).collect())
        };
        let item_slot = if items.is_empty() {
            Slot::Absent
        } else {
            Slot::Map(
                items
                    .iter()
                    .map(|(name, count)| (name.clone(), Member::Object(item(name, *count))))
                    .collect(),
            )
        };
        Record {
            rule: "Config".to_string(),
            fields: vec![
                ("Label".to_string(), single(Value::text(label))),
                ("Count".to_string(), single(Value::Integer(count))),
                ("Ratio".to_string(), optional(ratio.map(Value::Decimal))),
                ("Enabled".to_string(), optional(enabled.map(Value::Boolean))),
                ("Tag".to_string(), tag_slot),
                ("Item".to_string(), item_slot),
            ],
        }
    }
}

// -- Properties --

proptest! {
    #[test]
    fn records_survive_a_document_round_trip(record in config()) {
        let schema = schema();
        let library = FunctionRegistry::new();
        let doc = record.to_document(&schema);
        let result = transform(&schema, &library, &doc, doc.root().unwrap());
        prop_assert!(result.is_success(), "{:?}", result.diagnostics.sorted());
        prop_assert_eq!(result.value, Some(record));
    }
}
