#![allow(clippy::unwrap_used)]

use dialect_eval::FunctionRegistry;
use dialect_ir::{NodeKind, ScalarKind};
use dialect_schema::{CollectionKind, Member, ObjectDecl, PropertyDecl, Schema, SchemaBuilder, Slot};
use dialect_types::{Cardinality, Value};
use pretty_assertions::assert_eq;

use super::{record_factory, Record};
use crate::transform;

fn schema() -> Schema<Record> {
    let mut builder = SchemaBuilder::new();
    builder
        .property(PropertyDecl::new("Name", ScalarKind::Identifier))
        .property(PropertyDecl::new("Draft", ScalarKind::Boolean))
        .property(PropertyDecl::new("Size", ScalarKind::Cardinality))
        .property(PropertyDecl::new("Tag", ScalarKind::Text))
        .object(
            ObjectDecl::new("Part")
                .key_member("Name")
                .member("Name", Cardinality::ONE)
                .with_factory(record_factory()),
        )
        .object(
            ObjectDecl::new("Document")
                .root()
                .alias("doc")
                .member("Name", Cardinality::ONE)
                .member("Draft", Cardinality::OPTIONAL)
                .member("Size", Cardinality::OPTIONAL)
                .member_as("Tag", Cardinality::MANY, CollectionKind::Set)
                .member("Part", Cardinality::MANY)
                .with_factory(record_factory()),
        );
    builder.build().unwrap()
}

fn part(name: &str) -> Record {
    Record {
        rule: "Part".to_string(),
        fields: vec![(
            "Name".to_string(),
            Slot::Single(Member::Value(Value::Identifier(name.to_string()))),
        )],
    }
}

fn document() -> Record {
    Record {
        rule: "Document".to_string(),
        fields: vec![
            (
                "Name".to_string(),
                Slot::Single(Member::Value(Value::Identifier("manual".to_string()))),
            ),
            ("Draft".to_string(), Slot::Single(Member::Value(Value::Boolean(true)))),
            (
                "Size".to_string(),
                Slot::Single(Member::Value(Value::Cardinality(Cardinality::AT_LEAST_ONE))),
            ),
            (
                "Tag".to_string(),
                Slot::Set(vec![
                    Member::Value(Value::text("a \"quoted\" tag")),
                    Member::Value(Value::text("plain")),
                ]),
            ),
            (
                "Part".to_string(),
                Slot::List(vec![Member::Object(part("intro")), Member::Object(part("body"))]),
            ),
        ],
    }
}

#[test]
fn test_accessors() {
    let record = document();
    assert_eq!(record.value("Name"), Some(&Value::Identifier("manual".to_string())));
    assert_eq!(record.values("Tag").count(), 2);
    let parts: Vec<_> = record
        .objects("Part")
        .filter_map(|p| p.value("Name"))
        .map(Value::key_string)
        .collect();
    assert_eq!(parts, vec!["intro".to_string(), "body".to_string()]);
    assert!(record.object("Part").is_none());
    assert!(record.get("Missing").is_none());
}

#[test]
fn test_document_uses_root_alias_and_flags() {
    let schema = schema();
    let doc = document().to_document(&schema);
    let root = doc.get(doc.root().unwrap());
    let NodeKind::Object {
        name: Some(name),
        members,
    } = &root.kind
    else {
        panic!("root is not a named object: {root:?}");
    };
    assert_eq!(name, "doc");
    assert!(matches!(
        &doc.get(members[1]).kind,
        NodeKind::Pair { name, value: None } if name == "Draft"
    ));
}

#[test]
fn test_document_transforms_back() {
    let schema = schema();
    let library = FunctionRegistry::new();
    let original = document();
    let doc = original.to_document(&schema);

    let result = transform(&schema, &library, &doc, doc.root().unwrap());
    assert!(result.is_success(), "{:?}", result.diagnostics.sorted());
    assert_eq!(result.value, Some(original));
}
