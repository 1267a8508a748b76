//! Evaluation errors and their centralized constructors.

use dialect_diagnostic::{Diagnostic, ErrorCode};
use dialect_ir::Pos;
use dialect_types::{ParseError, ScalarKind, TypeError};
use thiserror::Error;

/// Result of evaluating or building an expression.
pub type EvalResult<T> = Result<T, EvalError>;

/// Everything that can go wrong while building or evaluating an expression.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum EvalError {
    /// A value's kind differs from the kind fixed for its node.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: ScalarKind,
        found: ScalarKind,
    },

    #[error("operator `{op}` is not defined for {operands}")]
    InvalidTypes { op: &'static str, operands: String },

    /// The kinds were legal but the value is not (null, fractional precision).
    #[error("invalid operand for `{op}`: {reason}")]
    InvalidOperand { op: &'static str, reason: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("division by zero")]
    DivisionByZero,

    #[error("overflow in {operation}")]
    Overflow { operation: &'static str },

    #[error("no function matches `{signature}`")]
    FunctionNotFound { signature: String },

    #[error("unresolved symbol `{name}`")]
    UnresolvedSymbol { name: String },

    #[error("function `{name}` failed: {reason}")]
    FunctionFailed { name: String, reason: String },

    #[error("{found} is not an expression")]
    NotAnExpression { found: &'static str },
}

impl EvalError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EvalError::TypeMismatch { .. } => ErrorCode::E2004,
            EvalError::InvalidTypes { .. } => ErrorCode::E2005,
            EvalError::InvalidOperand { .. } => ErrorCode::E3001,
            EvalError::Parse(err) => err.code(),
            EvalError::DivisionByZero => ErrorCode::E3002,
            EvalError::Overflow { .. } => ErrorCode::E3003,
            EvalError::FunctionNotFound { .. } => ErrorCode::E3004,
            EvalError::UnresolvedSymbol { .. } => ErrorCode::E3005,
            EvalError::FunctionFailed { .. } => ErrorCode::E3006,
            EvalError::NotAnExpression { .. } => ErrorCode::E3007,
        }
    }

    #[cold]
    pub fn to_diagnostic(&self, pos: Pos) -> Diagnostic {
        Diagnostic::error(self.code())
            .with_message(self.to_string())
            .with_label(pos, "while evaluating this value")
    }
}

impl From<TypeError> for EvalError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::Coercion { from, to } => EvalError::TypeMismatch {
                expected: to,
                found: from,
            },
            TypeError::NoCommonType { left, right } => EvalError::InvalidTypes {
                op: "=",
                operands: format!("{left} and {right}"),
            },
            TypeError::Unrepresentable { literal, to } => EvalError::InvalidOperand {
                op: "coercion",
                reason: format!("{literal} cannot be represented as {to}"),
            },
        }
    }
}

// Constructors

#[cold]
pub fn invalid_binary_types(op: &'static str, left: ScalarKind, right: ScalarKind) -> EvalError {
    EvalError::InvalidTypes {
        op,
        operands: format!("{left} and {right}"),
    }
}

#[cold]
pub fn invalid_unary_type(op: &'static str, operand: ScalarKind) -> EvalError {
    EvalError::InvalidTypes {
        op,
        operands: operand.to_string(),
    }
}

#[cold]
pub fn null_operand(op: &'static str) -> EvalError {
    EvalError::InvalidOperand {
        op,
        reason: "operand is null".to_string(),
    }
}

#[cold]
pub fn fractional_operand(op: &'static str, literal: &str) -> EvalError {
    EvalError::InvalidOperand {
        op,
        reason: format!("{literal} is not integral"),
    }
}

#[cold]
pub fn overflow(operation: &'static str) -> EvalError {
    EvalError::Overflow { operation }
}

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::DivisionByZero
}

#[cold]
pub fn function_not_found(name: &str, args: &[ScalarKind]) -> EvalError {
    let kinds: Vec<&str> = args.iter().map(|kind| kind.name()).collect();
    EvalError::FunctionNotFound {
        signature: format!("{name}({})", kinds.join(", ")),
    }
}

#[cold]
pub fn unresolved_symbol(name: &str) -> EvalError {
    EvalError::UnresolvedSymbol {
        name: name.to_string(),
    }
}

#[cold]
pub fn function_failed(name: &str, reason: impl Into<String>) -> EvalError {
    EvalError::FunctionFailed {
        name: name.to_string(),
        reason: reason.into(),
    }
}
