//! Type promotion: common types, widening distances and coercion.

use std::str::FromStr;

use bigdecimal::BigDecimal;

use crate::{ScalarKind, TypeError, Value};

/// Distance charged for passing a `null` argument.
const NULL_DISTANCE: u32 = 1;
/// Distance charged for matching an `any` parameter.
const ANY_DISTANCE: u32 = 3;

/// The kind both operands are promoted to.
///
/// Commutative. For two numeric kinds the result is the higher rank; `any`
/// on either side absorbs the other, `null` included.
pub fn common_type(left: ScalarKind, right: ScalarKind) -> Result<ScalarKind, TypeError> {
    match (left.rank(), right.rank()) {
        (Some(l), Some(r)) => return Ok(if l >= r { left } else { right }),
        _ if left == right && left != ScalarKind::Null => return Ok(left),
        _ => {}
    }
    match (left, right) {
        (ScalarKind::Null, ScalarKind::Null) => Err(TypeError::NoCommonType { left, right }),
        (ScalarKind::Any, _) | (_, ScalarKind::Any) => Ok(ScalarKind::Any),
        (ScalarKind::Null, other) | (other, ScalarKind::Null) => Ok(other),
        _ => Err(TypeError::NoCommonType { left, right }),
    }
}

/// How far `arg` must widen to bind to a parameter of kind `param`.
///
/// `None` disqualifies the pairing (narrowing or unrelated kinds).
pub fn widening_distance(arg: ScalarKind, param: ScalarKind) -> Option<u32> {
    if arg == param {
        return Some(0);
    }
    match (arg.rank(), param.rank()) {
        (Some(a), Some(p)) if a <= p => Some(u32::from(p - a)),
        _ if arg == ScalarKind::Null => Some(NULL_DISTANCE),
        _ if param == ScalarKind::Any => Some(ANY_DISTANCE),
        _ => None,
    }
}

/// Convert `value` to `target`, widening numbers losslessly.
///
/// Identity when the kinds match or `target` is `any`; `null` passes through
/// unchanged. Decimals widen to precision through their shortest round-trip
/// representation, so `0.1` becomes precision `0.1`.
pub fn coerce(value: Value, target: ScalarKind) -> Result<Value, TypeError> {
    let from = value.kind();
    if from == target || target == ScalarKind::Any || value.is_null() {
        return Ok(value);
    }
    match (value, target) {
        (Value::Integer(i), ScalarKind::Decimal) => integer_to_decimal(i)
            .map(Value::Decimal)
            .ok_or_else(|| TypeError::Unrepresentable {
                literal: i.to_string(),
                to: target,
            }),
        (Value::Integer(i), ScalarKind::Precision) => Ok(Value::Precision(BigDecimal::from(i))),
        (Value::Decimal(d), ScalarKind::Precision) => decimal_to_precision(d)
            .map(Value::Precision)
            .ok_or_else(|| TypeError::Unrepresentable {
                literal: format!("{d:?}"),
                to: target,
            }),
        _ => Err(TypeError::Coercion { from, to: target }),
    }
}

/// Exact conversion, `None` when `i` has no exact `f64` representation.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn integer_to_decimal(i: i64) -> Option<f64> {
    let d = i as f64;
    (d as i128 == i128::from(i)).then_some(d)
}

fn decimal_to_precision(d: f64) -> Option<BigDecimal> {
    if !d.is_finite() {
        return None;
    }
    BigDecimal::from_str(&format!("{d:?}")).ok()
}
