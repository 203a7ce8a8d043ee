//! Expression parsing by precedence climbing.
//!
//! `parse_expression(min_prec)` parses a primary, then keeps absorbing
//! binary operators whose precedence is strictly greater than `min_prec`,
//! recursing with the operator's own precedence for the right-hand side.
//! The strict comparison makes every binary operator left-associative.
//! Parenthesized expressions restart at [`prec::MIN`].
//!
//! Typing happens on the way up: each completed node is checked against
//! the semantic rules before its parent sees it, and implicit numeric
//! promotions are materialized as `Cast` nodes.

use zeebc_lex::TokenId;
use zeebc_sem::{
    check_binary, check_builtin, check_unary, BaseType, BinaryOp, CastSide, Type, UnaryOp,
};
use zeebc_util::{Diagnostic, Result};

use crate::ast::{Expr, ExprKind};
use crate::Parser;

/// Operator precedence levels; higher binds tighter.
pub mod prec {
    /// Start of an expression.
    pub const MIN: u8 = 0;
    /// `OR`
    pub const OR: u8 = 1;
    /// `XOR`
    pub const XOR: u8 = 2;
    /// `AND`
    pub const AND: u8 = 3;
    /// `=` `<>`
    pub const EQUALITY: u8 = 4;
    /// `<` `<=` `>` `>=`
    pub const RELATIONAL: u8 = 5;
    /// `+` `-`
    pub const ADDITIVE: u8 = 7;
    /// `*` `/` `\` `MOD`
    pub const MULTIPLICATIVE: u8 = 8;
    /// unary `-`, unary `NOT`
    pub const UNARY: u8 = 10;
}

/// Map a token to its binary operator and precedence.
fn binary_op(id: TokenId) -> Option<(BinaryOp, u8)> {
    Some(match id {
        TokenId::KeyOr => (BinaryOp::BitwiseOr, prec::OR),
        TokenId::KeyXor => (BinaryOp::BitwiseXor, prec::XOR),
        TokenId::KeyAnd => (BinaryOp::BitwiseAnd, prec::AND),
        TokenId::SymEqual => (BinaryOp::Equals, prec::EQUALITY),
        TokenId::SymNotEqual => (BinaryOp::NotEquals, prec::EQUALITY),
        TokenId::SymLess => (BinaryOp::Less, prec::RELATIONAL),
        TokenId::SymLessEquals => (BinaryOp::LessEquals, prec::RELATIONAL),
        TokenId::SymGreater => (BinaryOp::Greater, prec::RELATIONAL),
        TokenId::SymGreaterEquals => (BinaryOp::GreaterEquals, prec::RELATIONAL),
        TokenId::SymAdd => (BinaryOp::Add, prec::ADDITIVE),
        TokenId::SymSubtract => (BinaryOp::Subtract, prec::ADDITIVE),
        TokenId::SymMultiply => (BinaryOp::Multiply, prec::MULTIPLICATIVE),
        TokenId::SymDivide => (BinaryOp::Divide, prec::MULTIPLICATIVE),
        TokenId::SymIntDivide => (BinaryOp::IntDivide, prec::MULTIPLICATIVE),
        TokenId::KeyMod => (BinaryOp::Modulus, prec::MULTIPLICATIVE),
        _ => return None,
    })
}

impl<'r, 'src> Parser<'r, 'src> {
    /// True if the current token can begin an expression.
    pub(crate) fn starts_expression(&mut self) -> Result<bool> {
        Ok(matches!(
            self.token(0)?.id,
            TokenId::Integer
                | TokenId::Real
                | TokenId::String
                | TokenId::KeyTrue
                | TokenId::KeyFalse
                | TokenId::UntypedName
                | TokenId::TypedName
                | TokenId::KeyStrS
                | TokenId::SymOpenParen
                | TokenId::SymSubtract
                | TokenId::KeyNot
        ))
    }

    /// Parse an expression, consuming operators that bind tighter than
    /// `min_prec`.
    pub(crate) fn parse_expression(&mut self, min_prec: u8) -> Result<Expr<'src>> {
        let mut lhs = self.parse_primary()?;

        loop {
            let token = self.token(0)?;
            let Some((op, op_prec)) = binary_op(token.id) else {
                break;
            };
            if op_prec <= min_prec {
                break;
            }
            self.eat();

            let rhs = self.parse_expression(op_prec)?;
            lhs = make_binary(op, lhs, rhs)?;
        }

        Ok(lhs)
    }

    /// Parse a primary expression: a literal, an identifier, a built-in
    /// call, a parenthesized expression, or a unary operation.
    fn parse_primary(&mut self) -> Result<Expr<'src>> {
        let token = self.token(0)?;
        match token.id {
            TokenId::KeyTrue | TokenId::KeyFalse => {
                self.eat();
                Ok(Expr {
                    kind: ExprKind::BooleanLiteral(token.id == TokenId::KeyTrue),
                    ty: Type::new(BaseType::Boolean),
                    range: token.range,
                })
            }

            TokenId::Integer => {
                self.eat();
                let value: i64 = token
                    .text
                    .as_str()
                    .parse()
                    .map_err(|_| Diagnostic::new(token.range, "Integer literal out of range"))?;
                Ok(Expr {
                    kind: ExprKind::IntegerLiteral(value),
                    ty: Type::new(BaseType::Integer),
                    range: token.range,
                })
            }

            TokenId::Real => {
                self.eat();
                Ok(Expr {
                    kind: ExprKind::RealLiteral(token.text),
                    ty: Type::new(BaseType::Real),
                    range: token.range,
                })
            }

            TokenId::String => {
                self.eat();
                Ok(Expr {
                    kind: ExprKind::StringLiteral(token.text),
                    ty: Type::new(BaseType::String),
                    range: token.range,
                })
            }

            TokenId::UntypedName | TokenId::TypedName => {
                self.eat();
                let ty = Type::new(BaseType::from_name_sigil(token.text));
                let symbol = self
                    .symbols
                    .find_or_create(token.text, token.range, ty)?;
                Ok(Expr {
                    kind: ExprKind::Identifier(symbol),
                    ty,
                    range: token.range,
                })
            }

            TokenId::KeyStrS => self.parse_function_call(),

            TokenId::SymOpenParen => {
                self.eat();
                if !self.starts_expression()? {
                    return Err(Diagnostic::new(
                        self.token(0)?.range,
                        "Expected expression",
                    ));
                }
                let expr = self.parse_expression(prec::MIN)?;
                let close = self.expect(TokenId::SymCloseParen, ")")?;
                self.eat();
                Ok(Expr {
                    range: token.range.merge(close.range),
                    ..expr
                })
            }

            TokenId::SymSubtract => self.parse_unary(UnaryOp::Negate),
            TokenId::KeyNot => self.parse_unary(UnaryOp::BitwiseNot),

            _ => Err(Diagnostic::new(token.range, "Expected expression")),
        }
    }

    /// Parse a unary operation. The operand binds at [`prec::UNARY`], so
    /// `-a * b` is `(-a) * b`.
    fn parse_unary(&mut self, op: UnaryOp) -> Result<Expr<'src>> {
        let op_token = self.token(0)?;
        self.eat();

        if !self.starts_expression()? {
            return Err(Diagnostic::new(
                self.token(0)?.range,
                "Expected expression after unary operator",
            ));
        }
        let operand = self.parse_expression(prec::UNARY)?;

        let ty = check_unary(op, operand.ty, op_token.range)?;
        Ok(Expr {
            range: op_token.range.merge(operand.range),
            ty,
            kind: ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
        })
    }

    /// Parse a built-in function call. A call without `(` is a
    /// zero-argument call, which the arity check then rejects.
    fn parse_function_call(&mut self) -> Result<Expr<'src>> {
        let name_token = self.token(0)?;
        self.eat();

        let mut args = Vec::new();
        if self.token(0)?.id == TokenId::SymOpenParen {
            self.eat();

            loop {
                if !self.starts_expression()? {
                    return Err(Diagnostic::new(
                        self.token(0)?.range,
                        "Expected argument for function call",
                    ));
                }
                args.push(self.parse_expression(prec::MIN)?);

                if self.token(0)?.id != TokenId::SymComma {
                    break;
                }
                self.eat();
            }

            self.expect(TokenId::SymCloseParen, ")")?;
            self.eat();
        }

        let arg_types: Vec<Type> = args.iter().map(|arg| arg.ty).collect();
        let ty = check_builtin(name_token.text, &arg_types, name_token.range)?;

        Ok(Expr {
            kind: ExprKind::FunctionCall {
                name: name_token.text,
                args,
            },
            ty,
            range: name_token.range,
        })
    }
}

/// Combine two typed operands into a binary node, applying the implicit
/// promotion the operation table selects.
fn make_binary<'a>(op: BinaryOp, lhs: Expr<'a>, rhs: Expr<'a>) -> Result<Expr<'a>> {
    let range = lhs.range.merge(rhs.range);
    let rule = check_binary(lhs.ty, op, rhs.ty, range)?;

    let (lhs, rhs) = match rule.cast {
        Some((CastSide::Left, to)) => (lhs.cast_to(to), rhs),
        Some((CastSide::Right, to)) => (lhs, rhs.cast_to(to)),
        None => (lhs, rhs),
    };

    Ok(Expr {
        kind: ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        ty: rule.result,
        range,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Program, Stmt};
    use zeebc_lex::{Lexer, SourceReader};

    /// Parse `PRINT <source>` and return the expression.
    fn parse_expr(source: &str) -> Result<Expr<'static>> {
        // leak so the expression can outlive this helper in tests
        let text: &'static str = Box::leak(format!("PRINT {source}\n").into_boxed_str());
        let mut reader = SourceReader::new(text);
        let program: Program<'static> = Parser::new(Lexer::new(&mut reader)).run()?;
        let Some(Stmt::Print { expr: Some(expr), .. }) = program.statements.into_iter().next()
        else {
            panic!("expected a print statement");
        };
        Ok(expr)
    }

    fn expr_ok(source: &str) -> Expr<'static> {
        parse_expr(source).expect("parse error")
    }

    fn assert_binary<'e>(
        expr: &'e Expr<'static>,
        op: BinaryOp,
    ) -> (&'e Expr<'static>, &'e Expr<'static>) {
        match &expr.kind {
            ExprKind::Binary { op: actual, lhs, rhs } => {
                assert_eq!(*actual, op, "expected operator {op:?}");
                (lhs, rhs)
            }
            other => panic!("expected Binary({op:?}), got {other:?}"),
        }
    }

    // ------------------------------------------------------------------
    // literals and primaries
    // ------------------------------------------------------------------

    #[test]
    fn test_integer_literal() {
        let expr = expr_ok("42");
        assert!(matches!(expr.kind, ExprKind::IntegerLiteral(42)));
        assert_eq!(expr.ty.base, BaseType::Integer);
    }

    #[test]
    fn test_boolean_literals() {
        assert!(matches!(expr_ok("TRUE").kind, ExprKind::BooleanLiteral(true)));
        assert!(matches!(expr_ok("false").kind, ExprKind::BooleanLiteral(false)));
    }

    #[test]
    fn test_real_literal_keeps_text() {
        let expr = expr_ok("2.50");
        let ExprKind::RealLiteral(text) = expr.kind else {
            panic!("expected real literal");
        };
        assert_eq!(text.as_str(), "2.50");
        assert_eq!(expr.ty.base, BaseType::Real);
    }

    #[test]
    fn test_string_literal_unquoted() {
        let expr = expr_ok("\"Hi \"");
        let ExprKind::StringLiteral(text) = expr.kind else {
            panic!("expected string literal");
        };
        assert_eq!(text.as_str(), "Hi ");
        assert_eq!(expr.ty.base, BaseType::String);
    }

    #[test]
    fn test_identifier_takes_sigil_type() {
        assert_eq!(expr_ok("s$").ty.base, BaseType::String);
        assert_eq!(expr_ok("ok?").ty.base, BaseType::Boolean);
        assert_eq!(expr_ok("x!").ty.base, BaseType::Real);
        assert_eq!(expr_ok("n").ty.base, BaseType::Integer);
    }

    // ------------------------------------------------------------------
    // precedence and associativity
    // ------------------------------------------------------------------

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        let expr = expr_ok("1 + 2 * 3");
        let (lhs, rhs) = assert_binary(&expr, BinaryOp::Add);
        assert!(matches!(lhs.kind, ExprKind::IntegerLiteral(1)));
        assert_binary(rhs, BinaryOp::Multiply);
    }

    #[test]
    fn test_left_associativity() {
        let expr = expr_ok("1 - 2 - 3");
        let (lhs, rhs) = assert_binary(&expr, BinaryOp::Subtract);
        assert_binary(lhs, BinaryOp::Subtract);
        assert!(matches!(rhs.kind, ExprKind::IntegerLiteral(3)));
    }

    #[test]
    fn test_precedence_ladder() {
        // a? OR b? AND 1 = 2  parses as  a? OR (b? AND (1 = 2))
        let expr = expr_ok("a? OR b? AND 1 = 2");
        let (_, rhs) = assert_binary(&expr, BinaryOp::BitwiseOr);
        let (_, cmp) = assert_binary(rhs, BinaryOp::BitwiseAnd);
        assert_binary(cmp, BinaryOp::Equals);
    }

    #[test]
    fn test_every_adjacent_precedence_pair() {
        // prec(a) < prec(b)  =>  x a y b z  parses as  x a (y b z)
        let expr = expr_ok("a? = b? < c?");
        let (_, rhs) = assert_binary(&expr, BinaryOp::Equals);
        assert_binary(rhs, BinaryOp::Less);

        let expr = expr_ok("1 < 2 + 3");
        let (_, rhs) = assert_binary(&expr, BinaryOp::Less);
        assert_binary(rhs, BinaryOp::Add);

        let expr = expr_ok("1 + 2 * 3");
        let (_, rhs) = assert_binary(&expr, BinaryOp::Add);
        assert_binary(rhs, BinaryOp::Multiply);

        // prec(a) >= prec(b)  =>  x a y b z  parses as  (x a y) b z
        let expr = expr_ok("1 * 2 + 3");
        let (lhs, _) = assert_binary(&expr, BinaryOp::Add);
        assert_binary(lhs, BinaryOp::Multiply);

        let expr = expr_ok("1 + 2 < 3");
        let (lhs, _) = assert_binary(&expr, BinaryOp::Less);
        assert_binary(lhs, BinaryOp::Add);

        let expr = expr_ok("1 < 2 = 3 > 4");
        // relational binds tighter than equality
        let (lhs, rhs) = assert_binary(&expr, BinaryOp::Equals);
        assert_binary(lhs, BinaryOp::Less);
        assert_binary(rhs, BinaryOp::Greater);
    }

    #[test]
    fn test_xor_sits_between_or_and_and() {
        let expr = expr_ok("a? OR b? XOR c? AND d?");
        let (_, rhs) = assert_binary(&expr, BinaryOp::BitwiseOr);
        let (_, and) = assert_binary(rhs, BinaryOp::BitwiseXor);
        assert_binary(and, BinaryOp::BitwiseAnd);
    }

    #[test]
    fn test_parentheses_reset_precedence() {
        let expr = expr_ok("(1 + 2) * 3");
        let (lhs, rhs) = assert_binary(&expr, BinaryOp::Multiply);
        assert_binary(lhs, BinaryOp::Add);
        assert!(matches!(rhs.kind, ExprKind::IntegerLiteral(3)));
    }

    #[test]
    fn test_multiplicative_family_shares_a_level() {
        let expr = expr_ok("8 \\ 2 MOD 3");
        let (lhs, _) = assert_binary(&expr, BinaryOp::Modulus);
        assert_binary(lhs, BinaryOp::IntDivide);
    }

    // ------------------------------------------------------------------
    // unary operators
    // ------------------------------------------------------------------

    #[test]
    fn test_unary_negate() {
        let expr = expr_ok("-5");
        assert!(matches!(expr.kind, ExprKind::Unary { op: UnaryOp::Negate, .. }));
        assert_eq!(expr.ty.base, BaseType::Integer);
    }

    #[test]
    fn test_unary_binds_tighter_than_binary() {
        let expr = expr_ok("-a * b");
        let (lhs, _) = assert_binary(&expr, BinaryOp::Multiply);
        assert!(matches!(lhs.kind, ExprKind::Unary { op: UnaryOp::Negate, .. }));
    }

    #[test]
    fn test_not_on_boolean() {
        let expr = expr_ok("NOT ok?");
        assert!(matches!(expr.kind, ExprKind::Unary { op: UnaryOp::BitwiseNot, .. }));
        assert_eq!(expr.ty.base, BaseType::Boolean);
    }

    #[test]
    fn test_nested_unary() {
        let expr = expr_ok("- -1");
        let ExprKind::Unary { operand, .. } = &expr.kind else {
            panic!("expected unary");
        };
        assert!(matches!(operand.kind, ExprKind::Unary { .. }));
    }

    #[test]
    fn test_unary_type_errors() {
        assert_eq!(
            parse_expr("-ok?").unwrap_err().message,
            "Operator not allowed for boolean type."
        );
        assert_eq!(
            parse_expr("NOT x!").unwrap_err().message,
            "Operator not allowed for real type."
        );
        assert_eq!(
            parse_expr("-s$").unwrap_err().message,
            "Operator not allowed for string type."
        );
    }

    // ------------------------------------------------------------------
    // typing and promotion
    // ------------------------------------------------------------------

    #[test]
    fn test_integer_real_promotion_inserts_cast() {
        let expr = expr_ok("1 + 2.5");
        assert_eq!(expr.ty.base, BaseType::Real);
        let (lhs, rhs) = assert_binary(&expr, BinaryOp::Add);
        assert!(matches!(lhs.kind, ExprKind::Cast { to: BaseType::Real, .. }));
        assert!(matches!(rhs.kind, ExprKind::RealLiteral(_)));
    }

    #[test]
    fn test_real_integer_promotion_casts_right() {
        let expr = expr_ok("2.5 - 1");
        let (lhs, rhs) = assert_binary(&expr, BinaryOp::Subtract);
        assert!(matches!(lhs.kind, ExprKind::RealLiteral(_)));
        assert!(matches!(rhs.kind, ExprKind::Cast { to: BaseType::Real, .. }));
    }

    #[test]
    fn test_comparison_is_boolean() {
        assert_eq!(expr_ok("1 < 2").ty.base, BaseType::Boolean);
        assert_eq!(expr_ok("1.5 = 1.5").ty.base, BaseType::Boolean);
    }

    #[test]
    fn test_division_is_real() {
        assert_eq!(expr_ok("1 / 2").ty.base, BaseType::Real);
    }

    #[test]
    fn test_integer_division_is_integer() {
        assert_eq!(expr_ok("7 \\ 2").ty.base, BaseType::Integer);
        assert_eq!(expr_ok("7.5 \\ 2.5").ty.base, BaseType::Integer);
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(expr_ok("\"a\" + \"b\"").ty.base, BaseType::String);
    }

    #[test]
    fn test_binary_type_errors() {
        assert_eq!(
            parse_expr("TRUE + FALSE").unwrap_err().message,
            "Operation not allowed on boolean types"
        );
        assert_eq!(
            parse_expr("1.5 AND 2.5").unwrap_err().message,
            "Bitwise operation not allowed on real types"
        );
        assert_eq!(
            parse_expr("\"a\" * \"b\"").unwrap_err().message,
            "Operation not allowed on string types"
        );
        assert_eq!(
            parse_expr("1 + \"a\"").unwrap_err().message,
            "Unable to implicitly cast type to string"
        );
        assert_eq!(
            parse_expr("TRUE AND 1").unwrap_err().message,
            "Implicit cast between integer and boolean not allowed"
        );
    }

    // ------------------------------------------------------------------
    // STR$
    // ------------------------------------------------------------------

    #[test]
    fn test_str_call() {
        let expr = expr_ok("STR$(10)");
        assert_eq!(expr.ty.base, BaseType::String);
        let ExprKind::FunctionCall { name, args } = &expr.kind else {
            panic!("expected function call");
        };
        assert_eq!(*name, "STR$");
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_str_in_concatenation() {
        let expr = expr_ok("\"Hi \" + STR$(10)");
        assert_eq!(expr.ty.base, BaseType::String);
    }

    #[test]
    fn test_str_without_parens_fails_arity() {
        assert_eq!(
            parse_expr("STR$").unwrap_err().message,
            "Bad arguments for built-in function"
        );
    }

    #[test]
    fn test_str_rejects_non_integer() {
        assert_eq!(
            parse_expr("STR$(\"x\")").unwrap_err().message,
            "Expected integer argument for built-in function"
        );
        assert_eq!(
            parse_expr("STR$(1, 2)").unwrap_err().message,
            "Bad arguments for built-in function"
        );
    }

    #[test]
    fn test_str_empty_parens() {
        assert_eq!(
            parse_expr("STR$()").unwrap_err().message,
            "Expected argument for function call"
        );
    }

    // ------------------------------------------------------------------
    // errors
    // ------------------------------------------------------------------

    #[test]
    fn test_unbalanced_parenthesis() {
        assert_eq!(parse_expr("(1 + 2").unwrap_err().message, "Expected )");
    }

    #[test]
    fn test_missing_operand() {
        assert_eq!(
            parse_expr("1 +").unwrap_err().message,
            "Expected expression"
        );
    }

    #[test]
    fn test_missing_operand_after_unary() {
        assert_eq!(
            parse_expr("-").unwrap_err().message,
            "Expected expression after unary operator"
        );
    }
}
