//! Expression evaluator for Dialect values.
//!
//! Expressions are built bottom-up by [`ExprBuilder`], which checks operator
//! legality on the operand kinds and folds every static node into a
//! constant. Names resolve through a [`Library`]; [`FunctionRegistry`] is
//! the standard one and [`FunctionRegistry::with_builtins`] preloads the
//! builtin functions.
//!
//! # Architecture
//!
//! - `typing`: operator legality and result kinds
//! - `operators` / `unary_operators`: value-level operator semantics
//! - `expr`: typed nodes and evaluation
//! - `builder`: construction, folding, conversion from tree nodes
//! - `library` / `builtins`: function and symbol resolution

mod builder;
mod builtins;
pub mod errors;
mod expr;
mod library;
mod operators;
mod typing;
mod unary_operators;

#[cfg(test)]
mod tests;

pub use builder::ExprBuilder;
pub use errors::{EvalError, EvalResult};
pub use expr::{BinaryExpr, CallExpr, ConditionalExpr, Constant, Expr, SymbolExpr, UnaryExpr};
pub use library::{
    Function, FunctionBody, FunctionRegistry, Library, RegistryError, Resolution, VariableGetter,
};
pub use operators::evaluate_binary;
pub use typing::{binary_types, conditional_type, unary_type, OperandTypes};
pub use unary_operators::evaluate_unary;
