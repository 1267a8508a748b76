//! Binary operator implementations for the evaluator.
//!
//! Operands are promoted to the node's common kind first, then dispatched by
//! value variant. The kind set is fixed, so pattern matching is used instead
//! of trait objects.

use std::cmp::Ordering;

use bigdecimal::BigDecimal;
use dialect_ir::BinaryOp;
use dialect_types::{coerce, ScalarKind, Value};
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use crate::errors::{
    division_by_zero, fractional_operand, invalid_binary_types, null_operand, overflow, EvalResult,
};
use crate::typing::binary_types;

/// Largest accepted shift amount.
const MAX_SHIFT: i64 = i32::MAX as i64;

// Helper functions for repetitive checked arithmetic patterns

#[inline]
fn checked_arith<T>(result: Option<T>, wrap: fn(T) -> Value, op_name: &'static str) -> EvalResult<Value> {
    result.map(wrap).ok_or_else(|| overflow(op_name))
}

#[inline]
fn checked_div<T, F>(is_zero: bool, op: F, wrap: fn(T) -> Value, op_name: &'static str) -> EvalResult<Value>
where
    F: FnOnce() -> Option<T>,
{
    if is_zero {
        Err(division_by_zero())
    } else {
        op().map(wrap).ok_or_else(|| overflow(op_name))
    }
}

/// Finite decimal results only; infinities and NaN are reported as overflow.
#[inline]
fn finite(result: f64, op_name: &'static str) -> EvalResult<Value> {
    if result.is_finite() {
        Ok(Value::Decimal(result))
    } else {
        Err(overflow(op_name))
    }
}

#[inline]
fn compare(ordering: Option<Ordering>, op: BinaryOp) -> Value {
    let holds = match op {
        BinaryOp::Lt => ordering == Some(Ordering::Less),
        BinaryOp::LtEq => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        BinaryOp::Gt => ordering == Some(Ordering::Greater),
        BinaryOp::GtEq => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        _ => false,
    };
    Value::Boolean(holds)
}

/// Shift amount within `0..=i32::MAX`.
fn shift_amount(amount: i64) -> EvalResult<u32> {
    if (0..=MAX_SHIFT).contains(&amount) {
        u32::try_from(amount).map_err(|_| overflow("shift"))
    } else {
        Err(overflow("shift"))
    }
}

// Direct Dispatch Function

/// Evaluate `left op right` with both operands promoted to `common`.
///
/// `&&` and `||` reach this function only after short-circuiting failed to
/// decide the result.
#[allow(clippy::needless_pass_by_value)]
pub fn evaluate_binary(op: BinaryOp, left: Value, right: Value, common: ScalarKind) -> EvalResult<Value> {
    if common == ScalarKind::Any {
        let actual = binary_types(op, left.kind(), right.kind())?;
        if actual.common == ScalarKind::Any {
            return Err(invalid_binary_types(op.as_symbol(), left.kind(), right.kind()));
        }
        return evaluate_binary(op, left, right, actual.common);
    }

    if matches!(op, BinaryOp::Eq | BinaryOp::NotEq) {
        let equal = values_equal(left, right, common)?;
        return Ok(Value::Boolean(equal == (op == BinaryOp::Eq)));
    }

    if left.is_null() || right.is_null() {
        return Err(null_operand(op.as_symbol()));
    }

    let left = coerce(left, common)?;
    let right = coerce(right, common)?;
    match (&left, &right) {
        (Value::Integer(a), Value::Integer(b)) => eval_integer_binary(*a, *b, op),
        (Value::Decimal(a), Value::Decimal(b)) => eval_decimal_binary(*a, *b, op),
        (Value::Precision(a), Value::Precision(b)) => eval_precision_binary(a, b, op),
        (Value::Boolean(a), Value::Boolean(b)) => eval_boolean_binary(*a, *b, op),
        (Value::Text(a), Value::Text(b)) => eval_text_binary(a, b, op),
        _ => Err(invalid_binary_types(op.as_symbol(), left.kind(), right.kind())),
    }
}

/// Equality under promotion; `null` equals only `null`.
fn values_equal(left: Value, right: Value, common: ScalarKind) -> EvalResult<bool> {
    if left.is_null() || right.is_null() {
        return Ok(left.is_null() && right.is_null());
    }
    Ok(coerce(left, common)? == coerce(right, common)?)
}

// Kind-Specific Evaluation Functions

fn eval_integer_binary(a: i64, b: i64, op: BinaryOp) -> EvalResult<Value> {
    match op {
        BinaryOp::Add => checked_arith(a.checked_add(b), Value::Integer, "addition"),
        BinaryOp::Sub => checked_arith(a.checked_sub(b), Value::Integer, "subtraction"),
        BinaryOp::Mul => checked_arith(a.checked_mul(b), Value::Integer, "multiplication"),
        BinaryOp::Div => checked_div(b == 0, || a.checked_div(b), Value::Integer, "division"),
        BinaryOp::Mod => checked_div(b == 0, || a.checked_rem(b), Value::Integer, "remainder"),
        BinaryOp::BitAnd => Ok(Value::Integer(a & b)),
        BinaryOp::BitOr => Ok(Value::Integer(a | b)),
        BinaryOp::BitXor => Ok(Value::Integer(a ^ b)),
        BinaryOp::Shl => {
            let amount = shift_amount(b)?;
            Ok(Value::Integer(a.checked_shl(amount).unwrap_or(0)))
        }
        BinaryOp::Shr => {
            let amount = shift_amount(b)?;
            let fill = if a < 0 { -1 } else { 0 };
            Ok(Value::Integer(a.checked_shr(amount).unwrap_or(fill)))
        }
        BinaryOp::UShr => {
            let amount = shift_amount(b)?;
            let bits = u64::from_ne_bytes(a.to_ne_bytes());
            let shifted = bits.checked_shr(amount).unwrap_or(0);
            Ok(Value::Integer(i64::from_ne_bytes(shifted.to_ne_bytes())))
        }
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            Ok(compare(Some(a.cmp(&b)), op))
        }
        _ => Err(invalid_binary_types(
            op.as_symbol(),
            ScalarKind::Integer,
            ScalarKind::Integer,
        )),
    }
}

fn eval_decimal_binary(a: f64, b: f64, op: BinaryOp) -> EvalResult<Value> {
    match op {
        BinaryOp::Add => finite(a + b, "addition"),
        BinaryOp::Sub => finite(a - b, "subtraction"),
        BinaryOp::Mul => finite(a * b, "multiplication"),
        BinaryOp::Div => {
            if b == 0.0 {
                Err(division_by_zero())
            } else {
                finite(a / b, "division")
            }
        }
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            Ok(compare(a.partial_cmp(&b), op))
        }
        _ => Err(invalid_binary_types(
            op.as_symbol(),
            ScalarKind::Decimal,
            ScalarKind::Decimal,
        )),
    }
}

/// Integral precision value as a big integer.
fn integral(value: &BigDecimal, op: BinaryOp) -> EvalResult<BigInt> {
    if !value.is_integer() {
        return Err(fractional_operand(op.as_symbol(), &value.to_string()));
    }
    let (digits, _) = value.with_scale(0).into_bigint_and_exponent();
    Ok(digits)
}

fn eval_precision_binary(a: &BigDecimal, b: &BigDecimal, op: BinaryOp) -> EvalResult<Value> {
    match op {
        BinaryOp::Add => Ok(Value::Precision(a + b)),
        BinaryOp::Sub => Ok(Value::Precision(a - b)),
        BinaryOp::Mul => Ok(Value::Precision(a * b)),
        BinaryOp::Div => {
            if b.is_zero() {
                Err(division_by_zero())
            } else {
                Ok(Value::Precision(a / b))
            }
        }
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            Ok(compare(Some(a.cmp(b)), op))
        }
        BinaryOp::Mod
        | BinaryOp::BitAnd
        | BinaryOp::BitOr
        | BinaryOp::BitXor
        | BinaryOp::Shl
        | BinaryOp::Shr
        | BinaryOp::UShr => {
            let x = integral(a, op)?;
            let y = integral(b, op)?;
            eval_big_integer_binary(&x, &y, op).map(|n| Value::Precision(BigDecimal::new(n, 0)))
        }
        _ => Err(invalid_binary_types(
            op.as_symbol(),
            ScalarKind::Precision,
            ScalarKind::Precision,
        )),
    }
}

/// Integer-class operators on integral precision values.
///
/// There is no fixed width, so `>>>` is an arithmetic shift here.
fn eval_big_integer_binary(a: &BigInt, b: &BigInt, op: BinaryOp) -> EvalResult<BigInt> {
    let amount = || {
        b.to_i64()
            .ok_or_else(|| overflow("shift"))
            .and_then(shift_amount)
            .and_then(|n| usize::try_from(n).map_err(|_| overflow("shift")))
    };
    match op {
        BinaryOp::Mod => {
            if b.is_zero() {
                Err(division_by_zero())
            } else {
                Ok(a % b)
            }
        }
        BinaryOp::BitAnd => Ok(a & b),
        BinaryOp::BitOr => Ok(a | b),
        BinaryOp::BitXor => Ok(a ^ b),
        BinaryOp::Shl => Ok(a << amount()?),
        BinaryOp::Shr | BinaryOp::UShr => Ok(a >> amount()?),
        _ => Err(invalid_binary_types(
            op.as_symbol(),
            ScalarKind::Precision,
            ScalarKind::Precision,
        )),
    }
}

fn eval_boolean_binary(a: bool, b: bool, op: BinaryOp) -> EvalResult<Value> {
    match op {
        BinaryOp::BitXor => Ok(Value::Boolean(a ^ b)),
        BinaryOp::And => Ok(Value::Boolean(a && b)),
        BinaryOp::Or => Ok(Value::Boolean(a || b)),
        _ => Err(invalid_binary_types(
            op.as_symbol(),
            ScalarKind::Boolean,
            ScalarKind::Boolean,
        )),
    }
}

/// Concatenation and lexicographic comparison of the two operands.
fn eval_text_binary(a: &str, b: &str, op: BinaryOp) -> EvalResult<Value> {
    match op {
        BinaryOp::Add => Ok(Value::Text(format!("{a}{b}"))),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            Ok(compare(Some(a.cmp(b)), op))
        }
        _ => Err(invalid_binary_types(
            op.as_symbol(),
            ScalarKind::Text,
            ScalarKind::Text,
        )),
    }
}
