use super::*;
use pretty_assertions::assert_eq;

fn person(doc: &mut Document) -> NodeId {
    let bob = doc.scalar(ScalarKind::Identifier, "bob", Pos::new(1, 14));
    let key = doc.pair("key", bob, Pos::new(1, 9));
    doc.object("Person", vec![key], Pos::new(1, 1))
}

#[test]
fn test_alloc_returns_sequential_ids() {
    let mut doc = Document::new();
    let a = doc.symbol("a", Pos::new(1, 1));
    let b = doc.symbol("b", Pos::new(1, 3));
    assert_eq!(a.raw(), 0);
    assert_eq!(b.raw(), 1);
    assert_eq!(doc.len(), 2);
    assert_eq!(doc.get(b).kind, NodeKind::Symbol("b".to_string()));
}

#[test]
fn test_root_defaults_to_last_node() {
    let mut doc = Document::new();
    assert_eq!(doc.root(), None);
    let root = person(&mut doc);
    assert_eq!(doc.root(), Some(root));

    let other = doc.symbol("x", Pos::DUMMY);
    doc.set_root(root);
    assert_ne!(doc.root(), Some(other));
}

#[test]
fn test_parent_map() {
    let mut doc = Document::new();
    let root = person(&mut doc);
    let parents = doc.parents();

    let NodeKind::Object { members, .. } = &doc.get(root).kind else {
        panic!("expected object");
    };
    let pair = members[0];
    let NodeKind::Pair { value: Some(value), .. } = doc.get(pair).kind else {
        panic!("expected pair with value");
    };

    assert_eq!(parents.parent(root), None);
    assert_eq!(parents.parent(pair), Some(root));
    assert_eq!(parents.ancestors(value).collect::<Vec<_>>(), vec![pair, root]);
}

#[test]
fn test_same_shape_ignores_positions() {
    let mut a = Document::new();
    let a_root = person(&mut a);

    let mut b = Document::new();
    let bob = b.scalar(ScalarKind::Identifier, "bob", Pos::new(7, 2));
    let key = b.pair("key", bob, Pos::new(7, 1));
    let b_root = b.object("Person", vec![key], Pos::new(6, 1));

    assert!(a.same_shape(a_root, &b, b_root));
}

#[test]
fn test_same_shape_detects_differences() {
    let mut a = Document::new();
    let a_root = person(&mut a);

    let mut b = Document::new();
    let alice = b.scalar(ScalarKind::Identifier, "alice", Pos::DUMMY);
    let key = b.pair("key", alice, Pos::DUMMY);
    let b_root = b.object("Person", vec![key], Pos::DUMMY);

    assert!(!a.same_shape(a_root, &b, b_root));
}

#[test]
fn test_expression_children() {
    let mut doc = Document::new();
    let one = doc.scalar(ScalarKind::Integer, "1", Pos::DUMMY);
    let two = doc.scalar(ScalarKind::Integer, "2", Pos::DUMMY);
    let sum = doc.binary(BinaryOp::Add, one, two, Pos::DUMMY);
    assert_eq!(doc.get(sum).kind.children(), vec![one, two]);
    assert!(doc.get(sum).kind.is_value());
    assert_eq!(doc.get(sum).kind.describe(), "expression");
}

#[test]
fn test_node_id_sentinel() {
    assert!(!NodeId::INVALID.is_valid());
    assert_eq!(NodeId::default(), NodeId::INVALID);
    assert_eq!(format!("{:?}", NodeId::new(3)), "NodeId(3)");
}
