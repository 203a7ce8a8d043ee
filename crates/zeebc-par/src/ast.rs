//! The abstract syntax tree.
//!
//! Statements and expressions are tagged sum types; every expression
//! carries its resolved [`Type`] and source [`Range`] from the moment it
//! is built. Ownership is strictly tree-shaped: parents box their
//! children and nothing points back up.

use zeebc_sem::{BaseType, BinaryOp, Type, UnaryOp};
use zeebc_util::{Lexeme, Range};

use crate::symbols::{SymbolId, SymbolTable};

/// A fully parsed and type-checked program.
#[derive(Debug)]
pub struct Program<'a> {
    /// Every variable the program mentions, in first-mention order.
    pub symbols: SymbolTable<'a>,
    /// Top-level statements in source order.
    pub statements: Vec<Stmt<'a>>,
}

/// A top-level statement.
#[derive(Debug)]
pub enum Stmt<'a> {
    /// `name = expr`
    Assignment {
        symbol: SymbolId,
        expr: Expr<'a>,
        range: Range,
    },
    /// `PRINT [expr]`
    Print {
        expr: Option<Expr<'a>>,
        range: Range,
    },
}

/// A typed expression node.
#[derive(Debug)]
pub struct Expr<'a> {
    pub kind: ExprKind<'a>,
    /// Resolved type; never `Unknown` once the node leaves the parser.
    pub ty: Type,
    pub range: Range,
}

impl<'a> Expr<'a> {
    /// Wrap this expression in an implicit cast to `to`.
    pub fn cast_to(self, to: BaseType) -> Expr<'a> {
        Expr {
            ty: Type::new(to),
            range: self.range,
            kind: ExprKind::Cast {
                to,
                operand: Box::new(self),
            },
        }
    }
}

/// The expression variants.
#[derive(Debug)]
pub enum ExprKind<'a> {
    BooleanLiteral(bool),
    IntegerLiteral(i64),
    /// The literal text is kept verbatim and later emitted as a C double
    /// literal unchanged.
    RealLiteral(Lexeme<'a>),
    /// The text between the quotes.
    StringLiteral(Lexeme<'a>),
    Identifier(SymbolId),
    Unary {
        op: UnaryOp,
        operand: Box<Expr<'a>>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr<'a>>,
        rhs: Box<Expr<'a>>,
    },
    /// An implicit conversion inserted by the semantic rules.
    Cast {
        to: BaseType,
        operand: Box<Expr<'a>>,
    },
    /// A built-in function call (currently only `STR$`).
    FunctionCall {
        name: Lexeme<'a>,
        args: Vec<Expr<'a>>,
    },
}
