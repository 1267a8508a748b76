//! Bottom-up expression construction with constant folding.

use std::sync::OnceLock;

use dialect_ir::{BinaryOp, Document, NodeId, NodeKind, UnaryOp};
use dialect_stack::ensure_sufficient_stack;
use dialect_types::{parse, ScalarKind, Value};

use crate::errors::{function_not_found, EvalError, EvalResult};
use crate::expr::{BinaryExpr, CallExpr, ConditionalExpr, Constant, Expr, SymbolExpr, UnaryExpr};
use crate::library::Library;
use crate::typing::{binary_types, conditional_type, unary_type};

/// Builds typed expressions against a [`Library`].
///
/// Every constructor checks operator legality on the kinds known so far and
/// folds the new node when it is static and calls no function. Subtrees with
/// calls are folded by [`ExprBuilder::finish`] once the whole expression is
/// known, so a call on the skipped side of `&&`, `||` or `?:` never runs.
#[derive(Copy, Clone)]
pub struct ExprBuilder<'lib> {
    library: &'lib dyn Library,
}

impl<'lib> ExprBuilder<'lib> {
    pub fn new(library: &'lib dyn Library) -> Self {
        ExprBuilder { library }
    }

    pub fn library(&self) -> &'lib dyn Library {
        self.library
    }

    #[allow(clippy::unused_self)]
    pub fn constant(&self, value: Value) -> Expr {
        Expr::constant(value)
    }

    /// Parse `raw` as a literal of `kind`; `any` infers the kind.
    #[allow(clippy::unused_self)]
    pub fn literal(&self, kind: ScalarKind, raw: &str) -> EvalResult<Expr> {
        let value = parse(kind, raw)?;
        let kind = if kind == ScalarKind::Any {
            value.kind()
        } else {
            kind
        };
        Ok(Expr::Constant(Constant { value, kind }))
    }

    pub fn unary(&self, op: UnaryOp, operand: Expr) -> EvalResult<Expr> {
        let kind = OnceLock::new();
        if let Some(operand_kind) = operand.kind() {
            let _ = kind.set(unary_type(op, operand_kind)?);
        }
        Ok(self.fold(Expr::Unary(Box::new(UnaryExpr { op, operand, kind }))))
    }

    pub fn binary(&self, op: BinaryOp, lhs: Expr, rhs: Expr) -> EvalResult<Expr> {
        let types = OnceLock::new();
        if let (Some(l), Some(r)) = (lhs.kind(), rhs.kind()) {
            let _ = types.set(binary_types(op, l, r)?);
        }
        Ok(self.fold(Expr::Binary(Box::new(BinaryExpr {
            op,
            lhs,
            rhs,
            types,
        }))))
    }

    pub fn conditional(&self, cond: Expr, then: Expr, otherwise: Expr) -> EvalResult<Expr> {
        if let Some(cond_kind) = cond.kind() {
            // Validates the condition even while a branch is deferred.
            conditional_type(cond_kind, ScalarKind::Any, ScalarKind::Any)?;
        }
        let kind = OnceLock::new();
        if let (Some(c), Some(t), Some(e)) = (cond.kind(), then.kind(), otherwise.kind()) {
            let _ = kind.set(conditional_type(c, t, e)?);
        }
        Ok(self.fold(Expr::Conditional(Box::new(ConditionalExpr {
            cond,
            then,
            otherwise,
            kind,
        }))))
    }

    /// Call `name`. The overload is selected now if every argument kind is
    /// known, otherwise on first evaluation.
    pub fn call(&self, name: &str, args: Vec<Expr>) -> EvalResult<Expr> {
        let function = OnceLock::new();
        let kinds: Option<Vec<ScalarKind>> = args.iter().map(Expr::kind).collect();
        if let Some(kinds) = kinds {
            let selected = self
                .library
                .lookup(name, &kinds)
                .ok_or_else(|| function_not_found(name, &kinds))?;
            let _ = function.set(selected);
        }
        Ok(self.fold(Expr::Call(Box::new(CallExpr {
            name: name.to_string(),
            args,
            function,
        }))))
    }

    /// Resolve a bare name. Fixed symbols become constants; variables keep
    /// their kind; unknown names are deferred to evaluation.
    pub fn symbol(&self, name: &str) -> Expr {
        let kind = OnceLock::new();
        match self.library.resolve(name) {
            Some(resolution) if resolution.fixed => {
                return Expr::constant(resolution.value);
            }
            Some(resolution) if !resolution.value.is_null() => {
                let _ = kind.set(resolution.value.kind());
            }
            _ => {}
        }
        Expr::Symbol(SymbolExpr {
            name: name.to_string(),
            kind,
        })
    }

    /// Fold a node under construction. Calls wait for [`ExprBuilder::finish`].
    fn fold(&self, expr: Expr) -> Expr {
        if expr.has_call() {
            return expr;
        }
        self.fold_now(expr)
    }

    /// Fold a complete expression.
    ///
    /// A static tree becomes one constant, evaluated with short-circuiting.
    /// Otherwise the static subtrees that are always evaluated are folded:
    /// operands, call arguments and conditions, but not the right side of
    /// `&&`/`||` or the branches of `?:`.
    pub fn finish(&self, mut expr: Expr) -> Expr {
        if expr.is_static() {
            return self.fold_now(expr);
        }
        match &mut expr {
            Expr::Unary(u) => self.finish_in_place(&mut u.operand),
            Expr::Binary(b) => {
                self.finish_in_place(&mut b.lhs);
                if !b.op.is_logical() {
                    self.finish_in_place(&mut b.rhs);
                }
            }
            Expr::Conditional(c) => self.finish_in_place(&mut c.cond),
            Expr::Call(c) => {
                for arg in &mut c.args {
                    self.finish_in_place(arg);
                }
            }
            Expr::Constant(_) | Expr::Symbol(_) => {}
        }
        expr
    }

    fn finish_in_place(&self, slot: &mut Expr) {
        let expr = std::mem::replace(slot, Expr::constant(Value::Null));
        *slot = ensure_sufficient_stack(|| self.finish(expr));
    }

    /// Replace a static node by its value. A failing evaluation keeps the
    /// node, so the error is reported only if it is evaluated.
    fn fold_now(&self, expr: Expr) -> Expr {
        if expr.is_constant() || !expr.is_static() {
            return expr;
        }
        match expr.evaluate(self.library) {
            Ok(value) => {
                let kind = expr.kind().unwrap_or(value.kind());
                tracing::trace!(%value, %kind, "folded constant");
                Expr::Constant(Constant { value, kind })
            }
            Err(err) => {
                tracing::trace!(%err, "folding failed, keeping node");
                expr
            }
        }
    }

    /// Build and [finish](ExprBuilder::finish) the expression rooted at `id`.
    pub fn from_node(&self, doc: &Document, id: NodeId) -> EvalResult<Expr> {
        let expr = self.build_child(doc, id)?;
        Ok(self.finish(expr))
    }

    fn build_child(&self, doc: &Document, id: NodeId) -> EvalResult<Expr> {
        ensure_sufficient_stack(|| self.build_node(doc, id))
    }

    fn build_node(&self, doc: &Document, id: NodeId) -> EvalResult<Expr> {
        let node = doc.get(id);
        match &node.kind {
            NodeKind::Scalar { kind, raw } => self.literal(*kind, raw),
            NodeKind::Path(text) => Ok(Expr::constant(Value::Path(text.clone()))),
            NodeKind::Cardinality { min, max } => {
                let text = match max {
                    Some(max) => format!("{min}..{max}"),
                    None => format!("{min}..*"),
                };
                self.literal(ScalarKind::Cardinality, &text)
            }
            NodeKind::Unary { op, operand } => {
                let operand = self.build_child(doc, *operand)?;
                self.unary(*op, operand)
            }
            NodeKind::Binary { op, lhs, rhs } => {
                let lhs = self.build_child(doc, *lhs)?;
                let rhs = self.build_child(doc, *rhs)?;
                self.binary(*op, lhs, rhs)
            }
            NodeKind::Conditional {
                cond,
                then,
                otherwise,
            } => {
                let cond = self.build_child(doc, *cond)?;
                let then = self.build_child(doc, *then)?;
                let otherwise = self.build_child(doc, *otherwise)?;
                self.conditional(cond, then, otherwise)
            }
            NodeKind::Call { name, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.build_child(doc, *arg))
                    .collect::<EvalResult<Vec<_>>>()?;
                self.call(name, args)
            }
            NodeKind::Symbol(name) => Ok(self.symbol(name)),
            kind @ (NodeKind::Object { .. } | NodeKind::Array { .. } | NodeKind::Pair { .. }) => {
                Err(EvalError::NotAnExpression {
                    found: kind.describe(),
                })
            }
        }
    }
}
