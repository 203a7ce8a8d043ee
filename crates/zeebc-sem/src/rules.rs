//! The semantic decision tables.
//!
//! The binary-operation rules are data: a table keyed on the operand base
//! types with an optional operator column, scanned top to bottom, first
//! match wins. A `None` operator matches any operator not claimed by an
//! earlier row for the same type pair, so one wildcard row closes out each
//! type pair.

use zeebc_util::{Diagnostic, Lexeme, Range, Result};

use crate::ops::{BinaryOp, UnaryOp};
use crate::types::{BaseType, Type};

/// Which operand of a binary expression receives an implicit cast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastSide {
    Left,
    Right,
}

/// Outcome of a permitted binary operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BinaryRule {
    /// Implicit conversion to apply to one operand, if any.
    pub cast: Option<(CastSide, BaseType)>,
    /// The expression's resolved type.
    pub result: Type,
}

#[derive(Clone, Copy)]
enum Action {
    Allow {
        cast: Option<(CastSide, BaseType)>,
    },
    Reject(&'static str),
}

struct OpRule {
    lhs: BaseType,
    rhs: BaseType,
    /// `None` matches any operator (wildcard row).
    op: Option<BinaryOp>,
    action: Action,
}

const fn allow(lhs: BaseType, rhs: BaseType, op: BinaryOp) -> OpRule {
    OpRule {
        lhs,
        rhs,
        op: Some(op),
        action: Action::Allow { cast: None },
    }
}

const fn allow_rest(lhs: BaseType, rhs: BaseType) -> OpRule {
    OpRule {
        lhs,
        rhs,
        op: None,
        action: Action::Allow { cast: None },
    }
}

const fn reject(lhs: BaseType, rhs: BaseType, op: Option<BinaryOp>, message: &'static str) -> OpRule {
    OpRule {
        lhs,
        rhs,
        op,
        action: Action::Reject(message),
    }
}

const fn promote(lhs: BaseType, rhs: BaseType, side: CastSide, to: BaseType) -> OpRule {
    OpRule {
        lhs,
        rhs,
        op: None,
        action: Action::Allow {
            cast: Some((side, to)),
        },
    }
}

use BaseType::{Boolean, Integer, Real, String};
use BinaryOp::{
    Add, BitwiseAnd, BitwiseOr, BitwiseXor, Divide, Equals, Greater, GreaterEquals, IntDivide,
    Less, LessEquals, Modulus, Multiply, NotEquals, Subtract,
};

const OPERATION_TABLE: &[OpRule] = &[
    //
    // no implicit conversions
    //

    // Boolean|Boolean - bitwise and comparison allowed
    allow(Boolean, Boolean, BitwiseAnd),
    allow(Boolean, Boolean, BitwiseOr),
    allow(Boolean, Boolean, BitwiseXor),
    allow(Boolean, Boolean, Equals),
    allow(Boolean, Boolean, NotEquals),
    allow(Boolean, Boolean, Less),
    allow(Boolean, Boolean, LessEquals),
    allow(Boolean, Boolean, Greater),
    allow(Boolean, Boolean, GreaterEquals),
    reject(Boolean, Boolean, None, "Operation not allowed on boolean types"),
    // Integer|Integer - all allowed
    allow_rest(Integer, Integer),
    // Real|Real - no bitwise allowed
    allow(Real, Real, Add),
    allow(Real, Real, Subtract),
    allow(Real, Real, Multiply),
    allow(Real, Real, Divide),
    allow(Real, Real, IntDivide),
    allow(Real, Real, Modulus),
    allow(Real, Real, Equals),
    allow(Real, Real, NotEquals),
    allow(Real, Real, Less),
    allow(Real, Real, LessEquals),
    allow(Real, Real, Greater),
    allow(Real, Real, GreaterEquals),
    reject(Real, Real, None, "Bitwise operation not allowed on real types"),
    // String|String - only add allowed
    allow(String, String, Add),
    reject(String, String, None, "Operation not allowed on string types"),
    //
    // implicit conversions
    //

    // Boolean|Integer - not allowed either way
    reject(Boolean, Integer, None, "Implicit cast between integer and boolean not allowed"),
    reject(Integer, Boolean, None, "Implicit cast between integer and boolean not allowed"),
    // Integer|Real - cast up to real (except for bitwise)
    reject(Integer, Real, Some(BitwiseOr), "Bitwise operation not allowed on real types"),
    reject(Integer, Real, Some(BitwiseAnd), "Bitwise operation not allowed on real types"),
    reject(Integer, Real, Some(BitwiseXor), "Bitwise operation not allowed on real types"),
    reject(Real, Integer, Some(BitwiseOr), "Bitwise operation not allowed on real types"),
    reject(Real, Integer, Some(BitwiseAnd), "Bitwise operation not allowed on real types"),
    reject(Real, Integer, Some(BitwiseXor), "Bitwise operation not allowed on real types"),
    promote(Integer, Real, CastSide::Left, Real),
    promote(Real, Integer, CastSide::Right, Real),
    // Boolean|Real - not allowed either way
    reject(Boolean, Real, None, "Implicit cast between real and boolean not allowed"),
    reject(Real, Boolean, None, "Implicit cast between real and boolean not allowed"),
    // String|anything else - not allowed either way
    reject(String, Boolean, None, "Unable to implicitly cast type to string"),
    reject(String, Integer, None, "Unable to implicitly cast type to string"),
    reject(String, Real, None, "Unable to implicitly cast type to string"),
    reject(Boolean, String, None, "Unable to implicitly cast type to string"),
    reject(Integer, String, None, "Unable to implicitly cast type to string"),
    reject(Real, String, None, "Unable to implicitly cast type to string"),
];

/// Resolve a binary operation over already-typed operands.
///
/// On success the returned [`BinaryRule`] says which operand (if any) must
/// be wrapped in an implicit cast and what the expression's type is. On
/// failure the diagnostic carries `range` (the whole expression) and the
/// table's message.
pub fn check_binary(lhs: Type, op: BinaryOp, rhs: Type, range: Range) -> Result<BinaryRule> {
    for rule in OPERATION_TABLE {
        if rule.lhs != lhs.base || rule.rhs != rhs.base {
            continue;
        }
        if let Some(rule_op) = rule.op {
            if rule_op != op {
                continue;
            }
        }

        return match rule.action {
            Action::Allow { cast } => Ok(BinaryRule {
                cast,
                result: result_type(op, lhs, cast),
            }),
            Action::Reject(message) => Err(Diagnostic::new(range, message)),
        };
    }

    unreachable!("operation table is total over resolved operand types")
}

/// Result typing for a permitted binary operation: `/` always yields Real,
/// `\` always yields Integer, comparisons yield Boolean, everything else
/// takes the (possibly promoted) left operand's type.
fn result_type(op: BinaryOp, lhs: Type, cast: Option<(CastSide, BaseType)>) -> Type {
    if op == BinaryOp::Divide {
        return Type::new(BaseType::Real);
    }
    if op == BinaryOp::IntDivide {
        return Type::new(BaseType::Integer);
    }
    if op.is_comparison() {
        return Type::new(BaseType::Boolean);
    }
    match cast {
        Some((CastSide::Left, to)) => Type::new(to),
        _ => lhs,
    }
}

/// Resolve a unary operation. Negate is allowed on Integer and Real,
/// BitwiseNot on Boolean and Integer; the result type equals the operand
/// type.
pub fn check_unary(op: UnaryOp, operand: Type, range: Range) -> Result<Type> {
    match operand.base {
        BaseType::Boolean => {
            if op == UnaryOp::Negate {
                Err(Diagnostic::new(range, "Operator not allowed for boolean type."))
            } else {
                Ok(operand)
            }
        }
        BaseType::Integer => Ok(operand),
        BaseType::Real => {
            if op == UnaryOp::BitwiseNot {
                Err(Diagnostic::new(range, "Operator not allowed for real type."))
            } else {
                Ok(operand)
            }
        }
        BaseType::String => Err(Diagnostic::new(range, "Operator not allowed for string type.")),
        BaseType::Unknown => unreachable!("unary operand type must be resolved"),
    }
}

/// Resolve an assignment of a `value`-typed expression to a `target`-typed
/// variable.
///
/// Returns the base type the value must be cast to, or `None` when the
/// types already agree. Only three conversions exist: Boolean→Integer,
/// Real→Integer and Integer→Real.
pub fn check_assignment(target: Type, value: Type, range: Range) -> Result<Option<BaseType>> {
    if target.base == value.base {
        return Ok(None);
    }

    match (value.base, target.base) {
        (BaseType::Boolean, BaseType::Integer) => Ok(Some(BaseType::Integer)),
        (BaseType::Real, BaseType::Integer) => Ok(Some(BaseType::Integer)),
        (BaseType::Integer, BaseType::Real) => Ok(Some(BaseType::Real)),
        _ => Err(Diagnostic::new(range, "Unable to implicitly cast type")),
    }
}

/// Resolve a call to a built-in function. `STR$` is the only built-in:
/// it takes exactly one Integer and produces a String.
pub fn check_builtin(name: Lexeme<'_>, args: &[Type], range: Range) -> Result<Type> {
    if name == "STR$" {
        if args.len() != 1 {
            return Err(Diagnostic::new(range, "Bad arguments for built-in function"));
        }
        if args[0].base != BaseType::Integer {
            return Err(Diagnostic::new(
                range,
                "Expected integer argument for built-in function",
            ));
        }
        Ok(Type::new(BaseType::String))
    } else {
        Err(Diagnostic::new(range, "Unknown built-in function"))
    }
}
