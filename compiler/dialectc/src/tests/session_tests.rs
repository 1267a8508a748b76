#![allow(clippy::unwrap_used)]

use dialect_eval::FunctionRegistry;
use dialect_ir::{Document, NodeId, Pos, ScalarKind};
use dialect_schema::{ObjectDecl, PropertyDecl, SchemaBuilder};
use dialect_types::{Cardinality, Value};
use pretty_assertions::assert_eq;

use crate::{ErrorCode, Record, Session, SessionConfig};

/// `Dialect { key: contacts; Property { key: key; type: identifier; }
/// Property { key: Email; type: text; } Object { key: Person; root;
/// Member { key: key; } Member { key: Email; cardinality: {email}; } } }`
fn contacts(email: (u64, Option<u64>)) -> (Document, NodeId) {
    let mut doc = Document::new();
    let mut line = 0;
    let mut pos = || {
        line += 1;
        Pos::new(line, 1)
    };
    let ident = |doc: &mut Document, name: &str, value: &str, p: Pos| {
        let value = doc.scalar(ScalarKind::Identifier, value, p);
        doc.pair(name, value, p)
    };

    let p = pos();
    let members = vec![ident(&mut doc, "key", "key", p), ident(&mut doc, "type", "identifier", p)];
    let key_property = doc.object("Property", members, p);

    let p = pos();
    let members = vec![ident(&mut doc, "key", "Email", p), ident(&mut doc, "type", "text", p)];
    let email_property = doc.object("Property", members, p);

    let p = pos();
    let key = ident(&mut doc, "key", "key", p);
    let key_member = doc.object("Member", vec![key], p);

    let p = pos();
    let key = ident(&mut doc, "key", "Email", p);
    let card = doc.cardinality(email.0, email.1, p);
    let card = doc.pair("cardinality", card, p);
    let email_member = doc.object("Member", vec![key, card], p);

    let p = pos();
    let key = ident(&mut doc, "key", "Person", p);
    let root = doc.flag("root", p);
    let person = doc.object("Object", vec![key, root, key_member, email_member], p);

    let p = pos();
    let name = ident(&mut doc, "key", "contacts", p);
    let dialect = doc.object("Dialect", vec![name, key_property, email_property, person], p);
    doc.set_root(dialect);
    (doc, dialect)
}

/// `Person { key: bob; }`
fn bob() -> Document {
    let mut doc = Document::new();
    let p = Pos::new(1, 1);
    let name = doc.scalar(ScalarKind::Identifier, "bob", p);
    let name = doc.pair("key", name, Pos::new(2, 1));
    let person = doc.object("Person", vec![name], p);
    doc.set_root(person);
    doc
}

fn session(email: (u64, Option<u64>)) -> Session<Record> {
    let (doc, root) = contacts(email);
    let config = SessionConfig::default().with_source_name("bob.dl");
    Session::from_dialect(&doc, root, config).unwrap()
}

#[test]
fn test_optional_emails_succeed() {
    let session = session((0, None));
    let doc = bob();
    let outcome = session.transform(&doc, doc.root().unwrap());
    assert!(!outcome.has_errors(), "{}", outcome.render());
    let person = outcome.into_value().unwrap();
    assert_eq!(person.value("key"), Some(&Value::Identifier("bob".to_string())));
    assert_eq!(person.values("Email").count(), 0);
}

#[test]
fn test_required_emails_fail_and_render() {
    let session = session((1, None));
    let doc = bob();
    let outcome = session.transform(&doc, doc.root().unwrap());
    assert!(outcome.has_errors());
    assert_eq!(outcome.value(), None);
    assert_eq!(outcome.diagnostics()[0].code, ErrorCode::E4005);
    assert_eq!(
        outcome.render(),
        "bob.dl:1 need 1..* Email(s)\n  = note: found 0\nbob.dl: failed with 1 error\n"
    );
}

#[test]
fn test_batch_keeps_order_in_parallel_and_sequential_mode() {
    let session = session((0, None));
    let mut unknown = Document::new();
    let root = unknown.object("Company", vec![], Pos::new(1, 1));
    unknown.set_root(root);
    let docs = vec![bob(), unknown, bob()];

    for config in [SessionConfig::default(), SessionConfig::default().sequential()] {
        let session = session.clone().with_config(config);
        let outcomes = session.transform_all(&docs);
        let failed: Vec<bool> = outcomes.iter().map(|o| o.has_errors()).collect();
        assert_eq!(failed, vec![false, true, false]);
        assert_eq!(outcomes[1].source(), "<document>[1]");
        assert_eq!(outcomes[1].diagnostics()[0].code, ErrorCode::E4001);
    }
}

#[test]
fn test_document_without_root() {
    let session = session((0, None));
    let outcomes = session.transform_all(&[Document::new()]);
    assert_eq!(outcomes[0].diagnostics()[0].code, ErrorCode::E9001);
}

#[test]
fn test_broken_dialect_returns_outcome() {
    let (mut doc, _) = contacts((0, None));
    let p = Pos::new(40, 1);
    let stray = doc.scalar(ScalarKind::Integer, "1", p);
    let stray = doc.pair("version", stray, p);
    let root = doc.object("Dialect", vec![stray], p);

    let outcome = Session::from_dialect(&doc, root, SessionConfig::default())
        .err()
        .unwrap();
    assert!(outcome.has_errors());
    assert_eq!(outcome.diagnostics()[0].code, ErrorCode::E4002);
}

#[test]
fn test_typed_session() {
    let mut builder = SchemaBuilder::new();
    builder
        .property(PropertyDecl::new("Count", ScalarKind::Integer))
        .object(
            ObjectDecl::new("Counter")
                .root()
                .member("Count", Cardinality::ONE)
                .factory(|args| match args.value("Count") {
                    Some(Value::Integer(n)) => Ok(*n),
                    _ => Err("no count".to_string()),
                }),
        );
    let session = Session::new(builder.build().unwrap(), FunctionRegistry::with_builtins());

    let mut doc = Document::new();
    let p = Pos::new(1, 1);
    let value = doc.scalar(ScalarKind::Integer, "41", p);
    let one = doc.scalar(ScalarKind::Integer, "1", p);
    let sum = doc.binary(dialect_ir::BinaryOp::Add, value, one, p);
    let count = doc.pair("Count", sum, p);
    let root = doc.object("Counter", vec![count], p);

    let outcome = session.transform(&doc, root);
    assert_eq!(outcome.value(), Some(&42));
    assert_eq!(outcome.render(), "");
}
