//! Unary operator implementations for the evaluator.

use bigdecimal::BigDecimal;
use dialect_ir::UnaryOp;
use dialect_types::Value;

use crate::errors::{fractional_operand, invalid_unary_type, null_operand, overflow, EvalResult};

/// Evaluate `op value`.
pub fn evaluate_unary(op: UnaryOp, value: Value) -> EvalResult<Value> {
    match (&value, op) {
        (Value::Null, _) => Err(null_operand(op.as_symbol())),

        // Numeric negation
        (Value::Integer(n), UnaryOp::Neg) => n
            .checked_neg()
            .map(Value::Integer)
            .ok_or_else(|| overflow("negation")),
        (Value::Decimal(d), UnaryOp::Neg) => Ok(Value::Decimal(-d)),
        (Value::Precision(p), UnaryOp::Neg) => Ok(Value::Precision(-p)),

        // Logical not
        (Value::Boolean(b), UnaryOp::Not) => Ok(Value::Boolean(!b)),

        // Bitwise complement
        (Value::Integer(n), UnaryOp::BitNot) => Ok(Value::Integer(!n)),
        (Value::Precision(p), UnaryOp::BitNot) => {
            if p.is_integer() {
                // !n == -n - 1 in two's complement
                Ok(Value::Precision(-p - BigDecimal::from(1)))
            } else {
                Err(fractional_operand(op.as_symbol(), &p.to_string()))
            }
        }

        _ => Err(invalid_unary_type(op.as_symbol(), value.kind())),
    }
}
