//! End-to-end transformer runs against hand-built schemas.

#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use dialect_diagnostic::ErrorCode;
use dialect_eval::FunctionRegistry;
use dialect_ir::{BinaryOp, Document, NodeId, Pos, ScalarKind};
use dialect_schema::{
    CollectionKind, Constraint, FactoryArgs, Member, ObjectDecl, PropertyDecl, Schema,
    SchemaBuilder, Slot,
};
use dialect_transform::{record_factory, transform, Record, Transformer};
use dialect_types::{Cardinality, Value};
use pretty_assertions::assert_eq;

// -- People --

#[derive(Clone, Debug, PartialEq)]
struct Person {
    name: String,
    emails: Vec<String>,
    age: Option<i64>,
    active: bool,
}

fn build_person(args: FactoryArgs<Person>) -> Result<Person, String> {
    let text = |value: &Value| value.as_str().map(str::to_string);
    let name = args.value("Name").and_then(text).ok_or("missing name")?;
    if name == "Nobody" {
        return Err("nobody is not a person".to_string());
    }
    let emails = args
        .get("Email")
        .map(|slot| slot.members().filter_map(Member::as_value).filter_map(text).collect())
        .unwrap_or_default();
    let age = match args.value("Age") {
        Some(Value::Integer(age)) => Some(*age),
        _ => None,
    };
    let active = args.value("Active") == Some(&Value::Boolean(true));
    Ok(Person {
        name,
        emails,
        age,
        active,
    })
}

fn people(emails: Cardinality) -> Schema<Person> {
    let mut builder = SchemaBuilder::new();
    builder
        .property(PropertyDecl::new("Name", ScalarKind::Text))
        .property(
            PropertyDecl::new("Email", ScalarKind::Text)
                .with_constraint(Constraint::pattern(".+@.+").unwrap()),
        )
        .property(PropertyDecl::new("Age", ScalarKind::Integer).with_constraint(
            Constraint::Range {
                min: Some(Value::Integer(0)),
                max: None,
            },
        ))
        .property(PropertyDecl::new("Active", ScalarKind::Boolean))
        .object(
            ObjectDecl::new("Person")
                .root()
                .key_member("Name")
                .member("Name", Cardinality::ONE)
                .member("Email", emails)
                .member("Age", Cardinality::OPTIONAL)
                .member("Active", Cardinality::OPTIONAL)
                .factory(build_person),
        );
    builder.build().unwrap()
}

/// Builds documents with one line per node.
struct Doc {
    doc: Document,
    line: u32,
}

impl Doc {
    fn new() -> Self {
        Doc {
            doc: Document::new(),
            line: 0,
        }
    }

    fn pos(&mut self) -> Pos {
        self.line += 1;
        Pos::new(self.line, 1)
    }

    fn text(&mut self, s: &str) -> NodeId {
        let pos = self.pos();
        self.doc.scalar(ScalarKind::Text, &format!("\"{s}\""), pos)
    }

    fn int(&mut self, n: i64) -> NodeId {
        let pos = self.pos();
        self.doc.scalar(ScalarKind::Integer, &n.to_string(), pos)
    }

    fn pair(&mut self, name: &str, value: NodeId) -> NodeId {
        let pos = self.pos();
        self.doc.pair(name, value, pos)
    }

    fn flag(&mut self, name: &str) -> NodeId {
        let pos = self.pos();
        self.doc.flag(name, pos)
    }

    fn array(&mut self, elements: Vec<NodeId>) -> NodeId {
        let pos = self.pos();
        self.doc.array(elements, pos)
    }

    fn object(&mut self, name: &str, members: Vec<NodeId>) -> NodeId {
        let pos = self.pos();
        self.doc.object(name, members, pos)
    }

    fn anonymous(&mut self, members: Vec<NodeId>) -> NodeId {
        let pos = self.pos();
        self.doc.anonymous_object(members, pos)
    }
}

fn codes<T>(result: &dialect_transform::Transformation<T>) -> Vec<ErrorCode> {
    result.diagnostics.sorted().iter().map(|d| d.code).collect()
}

fn messages<T>(result: &dialect_transform::Transformation<T>) -> Vec<String> {
    result
        .diagnostics
        .sorted()
        .iter()
        .map(|d| d.message.clone())
        .collect()
}

#[test]
fn test_person_with_optional_emails() {
    let schema = people(Cardinality::MANY);
    let library = FunctionRegistry::with_builtins();
    let mut d = Doc::new();
    let name = d.text("Ada");
    let name = d.pair("Name", name);
    let a = d.text("ada@example.org");
    let b = d.text("ada@lovelace.net");
    let list = d.array(vec![a, b]);
    let email = d.pair("Email", list);
    let root = d.object("Person", vec![name, email]);

    let result = transform(&schema, &library, &d.doc, root);
    assert!(result.is_success(), "{:?}", messages(&result));
    assert_eq!(
        result.value,
        Some(Person {
            name: "Ada".to_string(),
            emails: vec!["ada@example.org".to_string(), "ada@lovelace.net".to_string()],
            age: None,
            active: false,
        })
    );
}

#[test]
fn test_missing_required_emails() {
    let schema = people(Cardinality::AT_LEAST_ONE);
    let library = FunctionRegistry::with_builtins();
    let mut d = Doc::new();
    let name = d.text("Ada");
    let name = d.pair("Name", name);
    let root = d.object("Person", vec![name]);

    let result = transform(&schema, &library, &d.doc, root);
    assert!(!result.is_success());
    assert_eq!(result.value, None);
    assert_eq!(codes(&result), vec![ErrorCode::E4005]);
    assert_eq!(messages(&result), vec!["need 1..* Email(s)".to_string()]);
}

#[test]
fn test_expression_flag_and_pattern() {
    let schema = people(Cardinality::MANY);
    let library = FunctionRegistry::with_builtins();
    let mut d = Doc::new();
    let name = d.text("Grace");
    let name = d.pair("Name", name);
    let six = d.int(6);
    let seven = d.int(7);
    let pos = d.pos();
    let product = d.doc.binary(BinaryOp::Mul, six, seven, pos);
    let age = d.pair("Age", product);
    let active = d.flag("Active");
    let root = d.object("Person", vec![name, age, active]);

    let result = transform(&schema, &library, &d.doc, root);
    let person = result.into_result().unwrap();
    assert_eq!(person.age, Some(42));
    assert!(person.active);
}

#[test]
fn test_violations_are_reported_once_each() {
    let schema = people(Cardinality::MANY);
    let library = FunctionRegistry::with_builtins();
    let mut d = Doc::new();
    let name = d.text("Ada");
    let name = d.pair("Name", name);
    let bad_age = d.text("old");
    let age = d.pair("Age", bad_age);
    let bogus = d.int(1);
    let bogus = d.pair("Nickname", bogus);
    let root = d.object("Person", vec![name, age, bogus]);

    let result = transform(&schema, &library, &d.doc, root);
    assert_eq!(codes(&result), vec![ErrorCode::E4004, ErrorCode::E4002]);
    assert_eq!(
        messages(&result)[1],
        "unknown member `Nickname` in `Person`; expected one of: Name, Email, Age, Active"
    );
}

#[test]
fn test_constraint_violation() {
    let schema = people(Cardinality::MANY);
    let library = FunctionRegistry::with_builtins();
    let mut d = Doc::new();
    let name = d.text("Ada");
    let name = d.pair("Name", name);
    let email = d.text("not-an-address");
    let email = d.pair("Email", email);
    let root = d.object("Person", vec![name, email]);

    let result = transform(&schema, &library, &d.doc, root);
    assert_eq!(codes(&result), vec![ErrorCode::E4011]);
}

#[test]
fn test_duplicate_singleton() {
    let schema = people(Cardinality::MANY);
    let library = FunctionRegistry::with_builtins();
    let mut d = Doc::new();
    let first = d.text("Ada");
    let first = d.pair("Name", first);
    let second = d.text("Grace");
    let second = d.pair("Name", second);
    let root = d.object("Person", vec![first, second]);

    let result = transform(&schema, &library, &d.doc, root);
    assert_eq!(codes(&result), vec![ErrorCode::E4009]);
}

#[test]
fn test_evaluation_error_becomes_diagnostic() {
    let schema = people(Cardinality::MANY);
    let library = FunctionRegistry::with_builtins();
    let mut d = Doc::new();
    let name = d.text("Ada");
    let name = d.pair("Name", name);
    let one = d.int(1);
    let zero = d.int(0);
    let pos = d.pos();
    let quotient = d.doc.binary(BinaryOp::Div, one, zero, pos);
    let age = d.pair("Age", quotient);
    let root = d.object("Person", vec![name, age]);

    let result = transform(&schema, &library, &d.doc, root);
    assert_eq!(codes(&result), vec![ErrorCode::E3002]);
    assert_eq!(result.diagnostics.sorted()[0].primary_pos(), Some(Pos::new(5, 1)));
}

#[test]
fn test_factory_failure() {
    let schema = people(Cardinality::MANY);
    let library = FunctionRegistry::with_builtins();
    let mut d = Doc::new();
    let name = d.text("Nobody");
    let name = d.pair("Name", name);
    let root = d.object("Person", vec![name]);

    let result = transform(&schema, &library, &d.doc, root);
    assert_eq!(codes(&result), vec![ErrorCode::E4012]);
    assert_eq!(
        messages(&result),
        vec!["cannot build `Person`: nobody is not a person".to_string()]
    );
}

#[test]
fn test_unknown_root_lists_roots() {
    let schema = people(Cardinality::MANY);
    let library = FunctionRegistry::with_builtins();
    let mut d = Doc::new();
    let root = d.object("Persn", vec![]);

    let result = transform(&schema, &library, &d.doc, root);
    assert_eq!(
        messages(&result),
        vec!["unknown root `Persn`; expected one of: Person".to_string()]
    );
}

#[test]
fn test_nesting_limit() {
    let schema = people(Cardinality::MANY);
    let library = FunctionRegistry::with_builtins();
    let mut d = Doc::new();
    let mut value = d.int(1);
    for _ in 0..8 {
        let pos = d.pos();
        let one = d.int(1);
        value = d.doc.binary(BinaryOp::Add, value, one, pos);
    }
    let name = d.text("Ada");
    let name = d.pair("Name", name);
    let age = d.pair("Age", value);
    let root = d.object("Person", vec![name, age]);

    // Expression subtrees are evaluated, not walked; only structure counts.
    let result = Transformer::new(&schema, &library)
        .with_max_depth(3)
        .transform(&d.doc, root);
    assert!(result.is_success());

    // Both pair values are too deep; the limit is reported once.
    let result = Transformer::new(&schema, &library)
        .with_max_depth(2)
        .transform(&d.doc, root);
    assert_eq!(codes(&result), vec![ErrorCode::E9001]);
    assert_eq!(result.value, None);
}

// -- Books --

fn library_schema() -> Schema<Record> {
    let mut builder = SchemaBuilder::new();
    builder
        .property(PropertyDecl::new("Title", ScalarKind::Text))
        .property(PropertyDecl::new("Pages", ScalarKind::Integer))
        .property(PropertyDecl::new("Tag", ScalarKind::Text))
        .object(
            ObjectDecl::new("Chapter")
                .key_member("Title")
                .member("Title", Cardinality::ONE)
                .member("Pages", Cardinality::OPTIONAL)
                .with_factory(record_factory()),
        )
        .object(
            ObjectDecl::new("Book")
                .root()
                .member("Title", Cardinality::ONE)
                .member_as("Tag", Cardinality::MANY, CollectionKind::Set)
                .member_as("Chapter", Cardinality::AT_LEAST_ONE, CollectionKind::Map)
                .member_as("Label", Cardinality::MANY, CollectionKind::Set)
                .with_factory(record_factory()),
        )
        .object(
            ObjectDecl::new("Label")
                .member("Tag", Cardinality::ONE)
                .with_factory(record_factory()),
        );
    builder.build().unwrap()
}

fn chapter(d: &mut Doc, title: &str, extra: Option<&str>) -> NodeId {
    let value = d.text(title);
    let mut members = vec![d.pair("Title", value)];
    if let Some(extra) = extra {
        let value = d.int(1);
        members.push(d.pair(extra, value));
    }
    d.object("Chapter", members)
}

#[test]
fn test_map_of_objects_by_key() {
    let schema = library_schema();
    let library = FunctionRegistry::new();
    let mut d = Doc::new();
    let title = d.text("Notes");
    let title = d.pair("Title", title);
    let one = chapter(&mut d, "One", Some("Pages"));
    let two = chapter(&mut d, "Two", None);
    let root = d.object("Book", vec![title, one, two]);

    let book = transform(&schema, &library, &d.doc, root)
        .into_result()
        .unwrap();
    let Some(Slot::Map(entries)) = book.get("Chapter") else {
        panic!("chapters are not a map: {book:?}");
    };
    let keys: Vec<&str> = entries.iter().map(|(key, _)| key.as_str()).collect();
    assert_eq!(keys, vec!["One", "Two"]);
    assert_eq!(
        book.objects("Chapter").next().unwrap().value("Pages"),
        Some(&Value::Integer(1))
    );
}

#[test]
fn test_duplicate_key_reported_once_and_siblings_still_checked() {
    let schema = library_schema();
    let library = FunctionRegistry::new();
    let mut d = Doc::new();
    let title = d.text("Notes");
    let title = d.pair("Title", title);
    let one = chapter(&mut d, "One", None);
    let again = chapter(&mut d, "One", None);
    let broken = chapter(&mut d, "Three", Some("Words"));
    let root = d.object("Book", vec![title, one, again, broken]);

    let result = transform(&schema, &library, &d.doc, root);
    assert_eq!(result.value, None);
    assert_eq!(codes(&result), vec![ErrorCode::E4006, ErrorCode::E4002]);
    assert_eq!(messages(&result)[0], "duplicate key `One` in Chapter");
}

#[test]
fn test_anonymous_objects_in_array() {
    let schema = library_schema();
    let library = FunctionRegistry::new();
    let mut d = Doc::new();
    let title = d.text("Notes");
    let title = d.pair("Title", title);
    let a = d.text("A");
    let a = d.pair("Title", a);
    let a = d.anonymous(vec![a]);
    let b = d.text("B");
    let b = d.pair("Title", b);
    let b = d.anonymous(vec![b]);
    let chapters = d.array(vec![a, b]);
    let chapters = d.pair("Chapter", chapters);
    let root = d.object("Book", vec![title, chapters]);

    let book = transform(&schema, &library, &d.doc, root)
        .into_result()
        .unwrap();
    let titles: Vec<&Value> = book
        .objects("Chapter")
        .filter_map(|c| c.value("Title"))
        .collect();
    assert_eq!(titles, vec![&Value::text("A"), &Value::text("B")]);
}

#[test]
fn test_set_rejects_duplicate_values() {
    let schema = library_schema();
    let library = FunctionRegistry::new();
    let mut d = Doc::new();
    let title = d.text("Notes");
    let title = d.pair("Title", title);
    let one = chapter(&mut d, "One", None);
    let x = d.text("x");
    let y = d.text("x");
    let tags = d.array(vec![x, y]);
    let tags = d.pair("Tag", tags);
    let root = d.object("Book", vec![title, one, tags]);

    let result = transform(&schema, &library, &d.doc, root);
    assert_eq!(codes(&result), vec![ErrorCode::E4008]);
}

#[test]
fn test_value_directly_in_object_is_unnamed() {
    let schema = library_schema();
    let library = FunctionRegistry::new();
    let mut d = Doc::new();
    let stray = d.int(3);
    let root = d.object("Book", vec![stray]);

    let result = transform(&schema, &library, &d.doc, root);
    assert_eq!(codes(&result), vec![ErrorCode::E4003]);
}

#[test]
fn test_property_written_as_object_is_invalid_member() {
    let schema = library_schema();
    let library = FunctionRegistry::new();
    let mut d = Doc::new();
    let title = d.object("Title", vec![]);
    let root = d.object("Book", vec![title]);

    let result = transform(&schema, &library, &d.doc, root);
    assert_eq!(codes(&result), vec![ErrorCode::E4010]);
}

fn label(d: &mut Doc, tag: &str) -> NodeId {
    let value = d.text(tag);
    let tag = d.pair("Tag", value);
    d.object("Label", vec![tag])
}

fn labelled_book(d: &mut Doc, tags: &[&str]) -> NodeId {
    let title = d.text("Notes");
    let title = d.pair("Title", title);
    let mut members = vec![title, chapter(d, "One", None)];
    for tag in tags {
        members.push(label(d, tag));
    }
    d.object("Book", members)
}

#[test]
fn test_set_of_unkeyed_objects_compares_members() {
    let schema = library_schema();
    let library = FunctionRegistry::new();

    let mut d = Doc::new();
    let root = labelled_book(&mut d, &["x", "y"]);
    let book = transform(&schema, &library, &d.doc, root)
        .into_result()
        .unwrap();
    assert_eq!(book.objects("Label").count(), 2);

    let mut d = Doc::new();
    let root = labelled_book(&mut d, &["x", "x"]);
    let result = transform(&schema, &library, &d.doc, root);
    assert!(!result.is_success());
    assert_eq!(result.value, None);
    assert_eq!(codes(&result), vec![ErrorCode::E4008]);
    assert!(messages(&result)[0].contains("Label { Tag: "), "{:?}", messages(&result));
}
