//! Typed expression nodes.
//!
//! Nodes are immutable once built. Kinds that depend on a deferred symbol are
//! computed on first evaluation and frozen in a `OnceLock`, so a node never
//! changes its kind and can be evaluated concurrently.

use std::sync::{Arc, OnceLock};

use dialect_ir::{BinaryOp, UnaryOp};
use dialect_stack::ensure_sufficient_stack;
use dialect_types::{coerce, ScalarKind, Value};

use crate::errors::{function_failed, function_not_found, null_operand, unresolved_symbol, EvalError, EvalResult};
use crate::library::{Function, Library};
use crate::operators::evaluate_binary;
use crate::typing::{binary_types, conditional_type, unary_type, OperandTypes};
use crate::unary_operators::evaluate_unary;

/// A value with its declared kind.
#[derive(Clone, Debug, PartialEq)]
pub struct Constant {
    pub value: Value,
    /// Declared kind; may be wider than the value's own kind (a folded
    /// `null`, or an `any` result).
    pub kind: ScalarKind,
}

#[derive(Clone, Debug)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Expr,
    pub(crate) kind: OnceLock<ScalarKind>,
}

#[derive(Clone, Debug)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub lhs: Expr,
    pub rhs: Expr,
    pub(crate) types: OnceLock<OperandTypes>,
}

#[derive(Clone, Debug)]
pub struct ConditionalExpr {
    pub cond: Expr,
    pub then: Expr,
    pub otherwise: Expr,
    pub(crate) kind: OnceLock<ScalarKind>,
}

#[derive(Clone, Debug)]
pub struct CallExpr {
    pub name: String,
    pub args: Vec<Expr>,
    /// Selected overload; chosen at construction when every argument kind is
    /// known, otherwise on first evaluation.
    pub(crate) function: OnceLock<Arc<Function>>,
}

#[derive(Clone, Debug)]
pub struct SymbolExpr {
    pub name: String,
    pub(crate) kind: OnceLock<ScalarKind>,
}

/// An expression tree.
#[derive(Clone, Debug)]
pub enum Expr {
    Constant(Constant),
    Unary(Box<UnaryExpr>),
    Binary(Box<BinaryExpr>),
    Conditional(Box<ConditionalExpr>),
    Call(Box<CallExpr>),
    Symbol(SymbolExpr),
}

/// Read `cell`, or compute the entry. The result is frozen only when
/// `known` holds, i.e. every input kind was fixed.
fn cached<T: Clone>(
    cell: &OnceLock<T>,
    known: bool,
    compute: impl FnOnce() -> EvalResult<T>,
) -> EvalResult<T> {
    if let Some(value) = cell.get() {
        return Ok(value.clone());
    }
    let value = compute()?;
    if known {
        Ok(cell.get_or_init(|| value).clone())
    } else {
        Ok(value)
    }
}

/// Check `value` against a node's declared `kind`, widening numerics.
fn conform(value: Value, kind: ScalarKind) -> EvalResult<Value> {
    if value.is_null() || kind == ScalarKind::Any || value.kind() == kind {
        return Ok(value);
    }
    coerce(value, kind).map_err(EvalError::from)
}

impl Expr {
    pub fn constant(value: Value) -> Self {
        let kind = value.kind();
        Expr::Constant(Constant { value, kind })
    }

    /// Result kind, `None` while it depends on an unresolved symbol.
    pub fn kind(&self) -> Option<ScalarKind> {
        match self {
            Expr::Constant(c) => Some(c.kind),
            Expr::Unary(u) => u.kind.get().copied(),
            Expr::Binary(b) => b.types.get().map(|t| t.result),
            Expr::Conditional(c) => c.kind.get().copied(),
            Expr::Call(c) => c.function.get().map(|f| f.returns()),
            Expr::Symbol(s) => s.kind.get().copied(),
        }
    }

    /// Returns `true` if the value can never change between evaluations.
    pub fn is_static(&self) -> bool {
        match self {
            Expr::Constant(_) => true,
            Expr::Unary(u) => u.operand.is_static(),
            Expr::Binary(b) => b.lhs.is_static() && b.rhs.is_static(),
            Expr::Conditional(c) => {
                c.cond.is_static() && c.then.is_static() && c.otherwise.is_static()
            }
            Expr::Call(c) => {
                c.function.get().is_some_and(|f| f.is_static())
                    && c.args.iter().all(Expr::is_static)
            }
            Expr::Symbol(_) => false,
        }
    }

    /// Returns `true` if evaluating the tree may invoke a library function.
    pub(crate) fn has_call(&self) -> bool {
        match self {
            Expr::Constant(_) | Expr::Symbol(_) => false,
            Expr::Unary(u) => u.operand.has_call(),
            Expr::Binary(b) => b.lhs.has_call() || b.rhs.has_call(),
            Expr::Conditional(c) => {
                c.cond.has_call() || c.then.has_call() || c.otherwise.has_call()
            }
            Expr::Call(_) => true,
        }
    }

    /// Returns `true` for an already folded node.
    pub fn is_constant(&self) -> bool {
        matches!(self, Expr::Constant(_))
    }

    /// Constant value of a folded node.
    pub fn as_constant(&self) -> Option<&Value> {
        match self {
            Expr::Constant(c) => Some(&c.value),
            _ => None,
        }
    }

    /// Compute the value of this expression.
    pub fn evaluate(&self, library: &dyn Library) -> EvalResult<Value> {
        ensure_sufficient_stack(|| match self {
            Expr::Constant(c) => Ok(c.value.clone()),
            Expr::Unary(u) => u.evaluate(library),
            Expr::Binary(b) => b.evaluate(library),
            Expr::Conditional(c) => c.evaluate(library),
            Expr::Call(c) => c.evaluate(library),
            Expr::Symbol(s) => s.evaluate(library),
        })
    }
}

impl UnaryExpr {
    fn evaluate(&self, library: &dyn Library) -> EvalResult<Value> {
        let value = self.operand.evaluate(library)?;
        let operand_kind = self.operand.kind();
        let kind = cached(&self.kind, operand_kind.is_some(), || {
            unary_type(self.op, operand_kind.unwrap_or(value.kind()))
        })?;
        conform(evaluate_unary(self.op, value)?, kind)
    }
}

impl BinaryExpr {
    fn evaluate(&self, library: &dyn Library) -> EvalResult<Value> {
        let left = self.lhs.evaluate(library)?;

        // Short-circuit: the right side runs only if it can change the result.
        match (self.op, &left) {
            (BinaryOp::And, Value::Boolean(false)) => return Ok(Value::Boolean(false)),
            (BinaryOp::Or, Value::Boolean(true)) => return Ok(Value::Boolean(true)),
            (BinaryOp::And | BinaryOp::Or, Value::Null) => {
                return Err(null_operand(self.op.as_symbol()))
            }
            _ => {}
        }

        let right = self.rhs.evaluate(library)?;
        let (lk, rk) = (self.lhs.kind(), self.rhs.kind());
        let types = cached(&self.types, lk.is_some() && rk.is_some(), || {
            binary_types(
                self.op,
                lk.unwrap_or(left.kind()),
                rk.unwrap_or(right.kind()),
            )
        })?;
        conform(evaluate_binary(self.op, left, right, types.common)?, types.result)
    }
}

impl ConditionalExpr {
    fn evaluate(&self, library: &dyn Library) -> EvalResult<Value> {
        let cond = self.cond.evaluate(library)?;
        let chosen = match cond {
            Value::Boolean(true) => &self.then,
            Value::Boolean(false) => &self.otherwise,
            Value::Null => return Err(null_operand("?:")),
            other => {
                return Err(EvalError::TypeMismatch {
                    expected: ScalarKind::Boolean,
                    found: other.kind(),
                })
            }
        };
        let value = chosen.evaluate(library)?;

        // An unknown branch kind contributes the chosen value's kind, or
        // `any` for the branch that was not taken.
        let branch_kind = |branch: &Expr| {
            branch.kind().unwrap_or(if std::ptr::eq(branch, chosen) {
                value.kind()
            } else {
                ScalarKind::Any
            })
        };
        let known = self.then.kind().is_some() && self.otherwise.kind().is_some();
        let kind = cached(&self.kind, known, || {
            conditional_type(
                ScalarKind::Boolean,
                branch_kind(&self.then),
                branch_kind(&self.otherwise),
            )
        })?;
        conform(value, kind)
    }
}

impl CallExpr {
    fn evaluate(&self, library: &dyn Library) -> EvalResult<Value> {
        let mut args = Vec::with_capacity(self.args.len());
        for arg in &self.args {
            args.push(arg.evaluate(library)?);
        }

        let known = self.args.iter().all(|arg| arg.kind().is_some());
        let function = cached(&self.function, known, || {
            let kinds: Vec<ScalarKind> = self
                .args
                .iter()
                .zip(&args)
                .map(|(arg, value)| arg.kind().unwrap_or(value.kind()))
                .collect();
            library
                .lookup(&self.name, &kinds)
                .ok_or_else(|| function_not_found(&self.name, &kinds))
        })?;

        call_function(&function, args)
    }
}

/// Coerce `args` to the declared parameters, invoke, and check the result
/// against the declared return kind.
pub(crate) fn call_function(function: &Function, args: Vec<Value>) -> EvalResult<Value> {
    let mut coerced = Vec::with_capacity(args.len());
    for (i, arg) in args.into_iter().enumerate() {
        let param = function.param(i).unwrap_or(ScalarKind::Any);
        coerced.push(coerce(arg, param)?);
    }

    let result = function
        .call(&coerced)
        .map_err(|reason| function_failed(function.name(), reason))?;

    let returns = function.returns();
    if result.is_null() || returns == ScalarKind::Any || result.kind() == returns {
        Ok(result)
    } else {
        Err(function_failed(
            function.name(),
            format!("returned {}, declared {returns}", result.kind()),
        ))
    }
}

impl SymbolExpr {
    fn evaluate(&self, library: &dyn Library) -> EvalResult<Value> {
        let resolution = library
            .resolve(&self.name)
            .ok_or_else(|| unresolved_symbol(&self.name))?;
        let value = resolution.value;
        if value.is_null() {
            return Ok(value);
        }

        let kind = *self.kind.get_or_init(|| value.kind());
        if kind == value.kind() || kind == ScalarKind::Any {
            Ok(value)
        } else {
            Err(EvalError::TypeMismatch {
                expected: kind,
                found: value.kind(),
            })
        }
    }
}
