//! Operator legality and result kinds.
//!
//! Legality is decided on kinds alone. When an operand's kind is `any` the
//! decision is repeated at evaluation time with the actual value kinds.

use dialect_ir::{BinaryOp, UnaryOp};
use dialect_types::{common_type, ScalarKind};

use crate::errors::{invalid_binary_types, invalid_unary_type, EvalResult};

/// Result kind of a binary node and the kind its operands are promoted to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct OperandTypes {
    pub result: ScalarKind,
    pub common: ScalarKind,
}

impl OperandTypes {
    const fn same(kind: ScalarKind) -> Self {
        OperandTypes {
            result: kind,
            common: kind,
        }
    }

    const fn boolean(common: ScalarKind) -> Self {
        OperandTypes {
            result: ScalarKind::Boolean,
            common,
        }
    }
}

/// Decide whether `left op right` is legal and what it produces.
pub fn binary_types(op: BinaryOp, left: ScalarKind, right: ScalarKind) -> EvalResult<OperandTypes> {
    use ScalarKind as K;

    if left == K::Any || right == K::Any {
        let result = if op.is_comparison() || op.is_logical() {
            K::Boolean
        } else {
            K::Any
        };
        return Ok(OperandTypes {
            result,
            common: K::Any,
        });
    }

    let numeric = left.is_numeric() && right.is_numeric();
    let integer_class = left.is_integer_class() && right.is_integer_class();
    let both = |kind: ScalarKind| left == kind && right == kind;
    let promoted = common_type(left, right).ok();

    let types = match op {
        BinaryOp::Add if numeric => promoted.map(OperandTypes::same),
        BinaryOp::Add if both(K::Text) => Some(OperandTypes::same(K::Text)),
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div if numeric => {
            promoted.map(OperandTypes::same)
        }
        BinaryOp::Mod
        | BinaryOp::BitAnd
        | BinaryOp::BitOr
        | BinaryOp::BitXor
        | BinaryOp::Shl
        | BinaryOp::Shr
        | BinaryOp::UShr
            if integer_class =>
        {
            promoted.map(OperandTypes::same)
        }
        BinaryOp::BitXor if both(K::Boolean) => Some(OperandTypes::same(K::Boolean)),
        BinaryOp::Eq | BinaryOp::NotEq => match promoted {
            Some(common) => Some(OperandTypes::boolean(common)),
            None if left == K::Null || right == K::Null => Some(OperandTypes::boolean(K::Null)),
            None => None,
        },
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq
            if numeric || both(K::Text) =>
        {
            promoted.map(OperandTypes::boolean)
        }
        BinaryOp::And | BinaryOp::Or if both(K::Boolean) => {
            Some(OperandTypes::same(K::Boolean))
        }
        _ => None,
    };

    types.ok_or_else(|| invalid_binary_types(op.as_symbol(), left, right))
}

/// Decide whether `op operand` is legal and what it produces.
pub fn unary_type(op: UnaryOp, operand: ScalarKind) -> EvalResult<ScalarKind> {
    match (op, operand) {
        (UnaryOp::Not, ScalarKind::Boolean | ScalarKind::Any) => Ok(ScalarKind::Boolean),
        (UnaryOp::Neg | UnaryOp::BitNot, ScalarKind::Any) => Ok(ScalarKind::Any),
        (UnaryOp::Neg, kind) if kind.is_numeric() => Ok(kind),
        (UnaryOp::BitNot, kind) if kind.is_integer_class() => Ok(kind),
        _ => Err(invalid_unary_type(op.as_symbol(), operand)),
    }
}

/// Result kind of `cond ? then : otherwise`.
pub fn conditional_type(
    cond: ScalarKind,
    then: ScalarKind,
    otherwise: ScalarKind,
) -> EvalResult<ScalarKind> {
    if !matches!(cond, ScalarKind::Boolean | ScalarKind::Any) {
        return Err(invalid_unary_type("?:", cond));
    }
    if then == ScalarKind::Null && otherwise == ScalarKind::Null {
        return Ok(ScalarKind::Null);
    }
    common_type(then, otherwise).map_err(|_| invalid_binary_types("?:", then, otherwise))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ScalarKind::{Any, Boolean, Date, Decimal, Identifier, Integer, Null, Precision, Text};

    fn result(op: BinaryOp, l: ScalarKind, r: ScalarKind) -> Option<ScalarKind> {
        binary_types(op, l, r).ok().map(|t| t.result)
    }

    #[test]
    fn arithmetic_promotes() {
        assert_eq!(result(BinaryOp::Add, Integer, Decimal), Some(Decimal));
        assert_eq!(result(BinaryOp::Mul, Precision, Integer), Some(Precision));
        assert_eq!(result(BinaryOp::Add, Text, Text), Some(Text));
        assert_eq!(result(BinaryOp::Sub, Text, Text), None);
        assert_eq!(result(BinaryOp::Add, Integer, Text), None);
        assert_eq!(result(BinaryOp::Add, Integer, Null), None);
    }

    #[test]
    fn integer_class_operators() {
        assert_eq!(result(BinaryOp::Mod, Integer, Integer), Some(Integer));
        assert_eq!(result(BinaryOp::Shl, Integer, Precision), Some(Precision));
        assert_eq!(result(BinaryOp::BitAnd, Decimal, Integer), None);
        assert_eq!(result(BinaryOp::BitXor, Boolean, Boolean), Some(Boolean));
        assert_eq!(result(BinaryOp::BitOr, Boolean, Boolean), None);
    }

    #[test]
    fn equality_uses_common_type() {
        let types = binary_types(BinaryOp::Eq, Integer, Decimal).ok();
        assert_eq!(
            types,
            Some(OperandTypes {
                result: Boolean,
                common: Decimal
            })
        );
        assert_eq!(result(BinaryOp::Eq, Date, Null), Some(Boolean));
        assert_eq!(result(BinaryOp::Eq, Null, Null), Some(Boolean));
        assert_eq!(result(BinaryOp::NotEq, Text, Identifier), None);
    }

    #[test]
    fn ordering_only_numeric_or_text() {
        assert_eq!(result(BinaryOp::Lt, Text, Text), Some(Boolean));
        assert_eq!(result(BinaryOp::GtEq, Integer, Precision), Some(Boolean));
        assert_eq!(result(BinaryOp::Lt, Date, Date), None);
        assert_eq!(result(BinaryOp::Lt, Boolean, Boolean), None);
    }

    #[test]
    fn logical_requires_booleans() {
        assert_eq!(result(BinaryOp::And, Boolean, Boolean), Some(Boolean));
        assert_eq!(result(BinaryOp::Or, Boolean, Integer), None);
    }

    #[test]
    fn any_defers() {
        assert_eq!(result(BinaryOp::Add, Any, Integer), Some(Any));
        assert_eq!(result(BinaryOp::Lt, Text, Any), Some(Boolean));
    }

    #[test]
    fn error_names_operator_and_kinds() {
        let err = binary_types(BinaryOp::Sub, Text, Integer).unwrap_err();
        assert_eq!(err.to_string(), "operator `-` is not defined for text and integer");
    }

    #[test]
    fn unary() {
        assert_eq!(unary_type(UnaryOp::Neg, Decimal).ok(), Some(Decimal));
        assert_eq!(unary_type(UnaryOp::Not, Boolean).ok(), Some(Boolean));
        assert_eq!(unary_type(UnaryOp::BitNot, Precision).ok(), Some(Precision));
        assert!(unary_type(UnaryOp::BitNot, Decimal).is_err());
        assert!(unary_type(UnaryOp::Neg, Text).is_err());
    }

    #[test]
    fn conditional() {
        assert_eq!(conditional_type(Boolean, Integer, Decimal).ok(), Some(Decimal));
        assert_eq!(conditional_type(Boolean, Text, Null).ok(), Some(Text));
        assert_eq!(conditional_type(Boolean, Null, Null).ok(), Some(Null));
        assert!(conditional_type(Integer, Text, Text).is_err());
        assert!(conditional_type(Boolean, Text, Date).is_err());
    }
}
