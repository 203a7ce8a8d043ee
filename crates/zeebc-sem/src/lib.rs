//! zeebc-sem - The ZeeBASIC type system and its semantic rules.
//!
//! Type checking happens while the parser builds the tree: every
//! expression node's type is resolved before the node is handed to its
//! parent. This crate therefore sits below the parser and exposes pure
//! decision functions: the binary-operation table with its implicit-cast
//! selection, the unary rules, the assignment conversions, and the
//! built-in function signatures.

pub mod ops;
pub mod rules;
pub mod types;

pub use ops::{BinaryOp, UnaryOp};
pub use rules::{check_assignment, check_binary, check_builtin, check_unary, BinaryRule, CastSide};
pub use types::{BaseType, Type};
