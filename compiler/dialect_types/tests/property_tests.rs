//! Property-based tests for promotion, coercion and cardinalities.

#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use dialect_types::{coerce, common_type, parse, Cardinality, ScalarKind, Value};
use proptest::prelude::*;

// -- Strategies --

fn numeric_kind() -> impl Strategy<Value = ScalarKind> {
    prop::sample::select(ScalarKind::NUMERIC.to_vec())
}

fn any_kind() -> impl Strategy<Value = ScalarKind> {
    prop::sample::select(ScalarKind::ALL.to_vec())
}

/// Integers that survive the trip through `f64` exactly.
fn safe_integer() -> impl Strategy<Value = i64> {
    -(1i64 << 53)..=(1i64 << 53)
}

fn cardinality() -> impl Strategy<Value = Cardinality> {
    (0u64..20, prop::option::of(0u64..20)).prop_map(|(a, b)| match b {
        Some(b) => Cardinality::new(a.min(b), Some(a.max(b))).unwrap(),
        None => Cardinality::new(a, None).unwrap(),
    })
}

proptest! {
    #[test]
    fn common_type_is_commutative(a in any_kind(), b in any_kind()) {
        prop_assert_eq!(common_type(a, b).is_ok(), common_type(b, a).is_ok());
        if let (Ok(x), Ok(y)) = (common_type(a, b), common_type(b, a)) {
            prop_assert_eq!(x, y);
        }
    }

    #[test]
    fn numeric_common_type_never_narrows(a in numeric_kind(), b in numeric_kind()) {
        let common = common_type(a, b).unwrap();
        let rank = common.rank().unwrap();
        prop_assert!(rank >= a.rank().unwrap());
        prop_assert!(rank >= b.rank().unwrap());
    }

    #[test]
    fn coercion_path_is_transitive(i in safe_integer()) {
        let direct = coerce(Value::Integer(i), ScalarKind::Precision).unwrap();
        let via_decimal = coerce(
            coerce(Value::Integer(i), ScalarKind::Decimal).unwrap(),
            ScalarKind::Precision,
        )
        .unwrap();
        prop_assert_eq!(via_decimal, direct);
    }

    #[test]
    fn coercion_to_same_kind_is_identity(i in any::<i64>()) {
        prop_assert_eq!(coerce(Value::Integer(i), ScalarKind::Integer).unwrap(), Value::Integer(i));
    }

    #[test]
    fn cardinality_validity(c in cardinality(), n in 0u64..40) {
        let expected = n >= c.min() && c.max().map_or(true, |max| n <= max);
        prop_assert_eq!(c.is_valid(n), expected);
    }

    #[test]
    fn cardinality_text_round_trips(c in cardinality()) {
        prop_assert_eq!(c.to_string().parse::<Cardinality>().unwrap(), c);
    }

    #[test]
    fn integer_literals_round_trip(i in any::<i64>()) {
        let value = Value::Integer(i);
        prop_assert_eq!(parse(ScalarKind::Integer, &value.to_literal()).unwrap(), value);
    }

    #[test]
    fn text_literals_round_trip(s in "\\PC{0,24}") {
        let value = Value::text(s);
        prop_assert_eq!(parse(ScalarKind::Text, &value.to_literal()).unwrap(), value);
    }
}
