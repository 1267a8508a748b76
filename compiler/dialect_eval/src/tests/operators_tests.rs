//! Tests for binary operator implementations.

#![allow(clippy::unwrap_used)]

use std::str::FromStr;

use bigdecimal::BigDecimal;
use dialect_ir::BinaryOp;
use dialect_types::{ScalarKind, Value};
use pretty_assertions::assert_eq;

use crate::errors::EvalError;
use crate::operators::evaluate_binary;

fn int(op: BinaryOp, a: i64, b: i64) -> Result<Value, EvalError> {
    evaluate_binary(op, Value::Integer(a), Value::Integer(b), ScalarKind::Integer)
}

fn prec(s: &str) -> Value {
    Value::Precision(BigDecimal::from_str(s).unwrap())
}

#[test]
fn test_integer_arithmetic() {
    assert_eq!(int(BinaryOp::Add, 2, 3).unwrap(), Value::Integer(5));
    assert_eq!(int(BinaryOp::Sub, 5, 3).unwrap(), Value::Integer(2));
    assert_eq!(int(BinaryOp::Mul, 2, 3).unwrap(), Value::Integer(6));
    assert_eq!(int(BinaryOp::Div, 7, 2).unwrap(), Value::Integer(3));
    assert_eq!(int(BinaryOp::Mod, 7, 2).unwrap(), Value::Integer(1));
}

#[test]
fn test_integer_overflow_is_checked() {
    assert!(matches!(
        int(BinaryOp::Add, i64::MAX, 1),
        Err(EvalError::Overflow { .. })
    ));
    assert!(matches!(
        int(BinaryOp::Mul, i64::MIN, -1),
        Err(EvalError::Overflow { .. })
    ));
    assert!(matches!(
        int(BinaryOp::Div, i64::MIN, -1),
        Err(EvalError::Overflow { .. })
    ));
}

#[test]
fn test_division_by_zero() {
    assert_eq!(int(BinaryOp::Div, 1, 0), Err(EvalError::DivisionByZero));
    assert_eq!(int(BinaryOp::Mod, 1, 0), Err(EvalError::DivisionByZero));
    assert_eq!(
        evaluate_binary(
            BinaryOp::Div,
            Value::Decimal(1.0),
            Value::Decimal(0.0),
            ScalarKind::Decimal
        ),
        Err(EvalError::DivisionByZero)
    );
    assert_eq!(
        evaluate_binary(BinaryOp::Div, prec("1"), prec("0.00"), ScalarKind::Precision),
        Err(EvalError::DivisionByZero)
    );
}

#[test]
fn test_shifts() {
    assert_eq!(int(BinaryOp::Shl, 1, 4).unwrap(), Value::Integer(16));
    assert_eq!(int(BinaryOp::Shr, -16, 2).unwrap(), Value::Integer(-4));
    assert_eq!(int(BinaryOp::UShr, -1, 60).unwrap(), Value::Integer(15));
}

#[test]
fn test_shifts_saturate_past_width() {
    assert_eq!(int(BinaryOp::Shl, 1, 64).unwrap(), Value::Integer(0));
    assert_eq!(int(BinaryOp::UShr, -1, 100).unwrap(), Value::Integer(0));
    assert_eq!(int(BinaryOp::Shr, -5, 200).unwrap(), Value::Integer(-1));
    assert_eq!(int(BinaryOp::Shr, 5, 200).unwrap(), Value::Integer(0));
}

#[test]
fn test_shift_amount_out_of_range() {
    assert!(matches!(
        int(BinaryOp::Shl, 1, -1),
        Err(EvalError::Overflow { .. })
    ));
    assert!(matches!(
        int(BinaryOp::Shr, 1, i64::from(i32::MAX) + 1),
        Err(EvalError::Overflow { .. })
    ));
}

#[test]
fn test_mixed_numeric_promotes() {
    let result = evaluate_binary(
        BinaryOp::Add,
        Value::Integer(1),
        Value::Decimal(0.5),
        ScalarKind::Decimal,
    );
    assert_eq!(result.unwrap(), Value::Decimal(1.5));

    let result = evaluate_binary(BinaryOp::Mul, Value::Integer(3), prec("1.5"), ScalarKind::Precision);
    assert_eq!(result.unwrap(), prec("4.5"));
}

#[test]
fn test_precision_integer_class_operators() {
    let result = evaluate_binary(BinaryOp::Mod, prec("10"), prec("3"), ScalarKind::Precision);
    assert_eq!(result.unwrap(), prec("1"));
    let result = evaluate_binary(BinaryOp::BitAnd, prec("12"), prec("10"), ScalarKind::Precision);
    assert_eq!(result.unwrap(), prec("8"));
    let result = evaluate_binary(BinaryOp::Shl, prec("1"), prec("100"), ScalarKind::Precision);
    assert_eq!(
        result.unwrap(),
        prec("1267650600228229401496703205376")
    );
}

#[test]
fn test_fractional_precision_is_invalid_operand() {
    let result = evaluate_binary(BinaryOp::Mod, prec("10.5"), prec("3"), ScalarKind::Precision);
    assert!(matches!(result, Err(EvalError::InvalidOperand { op: "%", .. })));
}

#[test]
fn test_equality_is_by_numeric_value() {
    let eq = |l: Value, r: Value, common| evaluate_binary(BinaryOp::Eq, l, r, common).unwrap();
    assert_eq!(eq(prec("1.50"), prec("1.5"), ScalarKind::Precision), Value::Boolean(true));
    assert_eq!(
        eq(Value::Integer(2), Value::Decimal(2.0), ScalarKind::Decimal),
        Value::Boolean(true)
    );
    assert_eq!(eq(Value::Null, Value::Null, ScalarKind::Null), Value::Boolean(true));
    assert_eq!(
        eq(Value::text("a"), Value::Null, ScalarKind::Text),
        Value::Boolean(false)
    );
}

#[test]
fn test_null_operand_outside_equality() {
    let result = evaluate_binary(BinaryOp::Add, Value::Integer(1), Value::Null, ScalarKind::Integer);
    assert!(matches!(result, Err(EvalError::InvalidOperand { .. })));
}

#[test]
fn test_text_concatenation_and_comparison() {
    let text = |op, a: &str, b: &str| {
        evaluate_binary(op, Value::text(a), Value::text(b), ScalarKind::Text).unwrap()
    };
    assert_eq!(text(BinaryOp::Add, "hello", " world"), Value::text("hello world"));
    // Both operands take part; "a" < "b" but not "b" < "a".
    assert_eq!(text(BinaryOp::Lt, "a", "b"), Value::Boolean(true));
    assert_eq!(text(BinaryOp::Lt, "b", "a"), Value::Boolean(false));
    assert_eq!(text(BinaryOp::Lt, "a", "a"), Value::Boolean(false));
    assert_eq!(text(BinaryOp::GtEq, "abc", "abd"), Value::Boolean(false));
}

#[test]
fn test_boolean_xor() {
    let result = evaluate_binary(
        BinaryOp::BitXor,
        Value::Boolean(true),
        Value::Boolean(true),
        ScalarKind::Boolean,
    );
    assert_eq!(result.unwrap(), Value::Boolean(false));
}

#[test]
fn test_any_redispatches_on_actual_kinds() {
    let result = evaluate_binary(BinaryOp::Add, Value::Integer(1), Value::Integer(2), ScalarKind::Any);
    assert_eq!(result.unwrap(), Value::Integer(3));
    let result = evaluate_binary(BinaryOp::Sub, Value::text("a"), Value::Integer(2), ScalarKind::Any);
    assert!(matches!(result, Err(EvalError::InvalidTypes { op: "-", .. })));
}

#[test]
fn test_decimal_overflow() {
    let result = evaluate_binary(
        BinaryOp::Mul,
        Value::Decimal(f64::MAX),
        Value::Decimal(2.0),
        ScalarKind::Decimal,
    );
    assert!(matches!(result, Err(EvalError::Overflow { .. })));
}
