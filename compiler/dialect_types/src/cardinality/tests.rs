#![allow(clippy::unwrap_used)]

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_constants() {
    assert_eq!(Cardinality::ONE.to_string(), "1..1");
    assert_eq!(Cardinality::OPTIONAL.to_string(), "0..1");
    assert_eq!(Cardinality::MANY.to_string(), "0..*");
    assert_eq!(Cardinality::AT_LEAST_ONE.to_string(), "1..*");
    assert!(Cardinality::ZERO.is_zero());
    assert_eq!(Cardinality::default(), Cardinality::ONE);
}

#[test]
fn test_new_rejects_inverted() {
    assert_eq!(Cardinality::new(3, Some(1)), None);
    assert_eq!(Cardinality::new(1, Some(3)).unwrap().to_string(), "1..3");
    assert_eq!(Cardinality::new(5, None).unwrap().to_string(), "5..*");
}

#[test]
fn test_is_valid() {
    let c = Cardinality::new(1, Some(3)).unwrap();
    assert!(!c.is_valid(0));
    assert!(c.is_valid(1));
    assert!(c.is_valid(3));
    assert!(!c.is_valid(4));
    assert!(Cardinality::MANY.is_valid(0));
    assert!(Cardinality::AT_LEAST_ONE.is_valid(1_000_000));
}

#[test]
fn test_is_singleton() {
    assert!(Cardinality::ONE.is_singleton());
    assert!(Cardinality::OPTIONAL.is_singleton());
    assert!(Cardinality::ZERO.is_singleton());
    assert!(!Cardinality::MANY.is_singleton());
    assert!(!Cardinality::new(0, Some(2)).unwrap().is_singleton());
}

#[test]
fn test_parse_forms() {
    assert_eq!("2".parse::<Cardinality>().unwrap(), Cardinality::exactly(2));
    assert_eq!("*".parse::<Cardinality>().unwrap(), Cardinality::MANY);
    assert_eq!("1..*".parse::<Cardinality>().unwrap(), Cardinality::AT_LEAST_ONE);
    assert_eq!("0..1".parse::<Cardinality>().unwrap(), Cardinality::OPTIONAL);
    assert_eq!(" 0 .. 4 ".parse::<Cardinality>().unwrap().max(), Some(4));
}

#[test]
fn test_parse_errors() {
    let err = "3..1".parse::<Cardinality>().unwrap_err();
    assert_eq!(err.problem, ParseProblem::InvertedRange { min: 3, max: 1 });
    assert_eq!(
        "x..2".parse::<Cardinality>().unwrap_err().problem,
        ParseProblem::Malformed("`n`, `*`, `a..b` or `a..*`")
    );
    assert_eq!("".parse::<Cardinality>().unwrap_err().problem, ParseProblem::Empty);
    assert_eq!(
        "99999999999999999999".parse::<Cardinality>().unwrap_err().problem,
        ParseProblem::OutOfRange
    );
}
