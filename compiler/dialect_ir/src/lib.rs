//! Dialect IR - shared leaf types for the Dialect pipeline.
//!
//! This crate contains the data structures every other phase agrees on:
//! - `Pos` source positions (line, column)
//! - `ScalarKind` tags for the value language
//! - `BinaryOp` / `UnaryOp` operator enums
//! - The generic document tree handed over by the (external) parser
//!
//! # Design Philosophy
//!
//! - **Flatten Everything**: tree nodes live in one arena, children are
//!   `NodeId(u32)` indices rather than boxed nodes
//! - **No back-pointers**: parents are derived on demand with
//!   [`Document::parents`] instead of being stored in every node

mod kind;
mod operators;
mod pos;
mod tree;

pub use kind::ScalarKind;
pub use operators::{BinaryOp, UnaryOp};
pub use pos::Pos;
pub use tree::{Document, Node, NodeId, NodeKind, ParentMap};
