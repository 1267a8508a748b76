use super::*;

#[test]
fn test_numeric_ranks_increase_with_width() {
    let ranks: Vec<_> = ScalarKind::NUMERIC.iter().map(|k| k.rank()).collect();
    assert_eq!(ranks, vec![Some(0), Some(1), Some(2)]);
}

#[test]
fn test_non_numeric_kinds_have_no_rank() {
    for kind in ScalarKind::ALL {
        assert_eq!(kind.is_numeric(), ScalarKind::NUMERIC.contains(&kind), "{kind}");
    }
    assert_eq!(ScalarKind::Null.rank(), None);
    assert_eq!(ScalarKind::Any.rank(), None);
}

#[test]
fn test_integer_class() {
    assert!(ScalarKind::Integer.is_integer_class());
    assert!(ScalarKind::Precision.is_integer_class());
    assert!(!ScalarKind::Decimal.is_integer_class());
    assert!(!ScalarKind::Boolean.is_integer_class());
}

#[test]
fn test_names_round_trip() {
    for kind in ScalarKind::ALL {
        assert_eq!(ScalarKind::from_name(kind.name()), Some(kind));
    }
    assert_eq!(ScalarKind::from_name("float"), None);
}
