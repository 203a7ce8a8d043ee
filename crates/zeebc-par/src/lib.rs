//! zeebc-par - Parser for ZeeBASIC source.
//!
//! The parser owns the lexer and a small token buffer, consumes the token
//! stream statement by statement, and produces a [`Program`] whose
//! expression nodes are already typed: the semantic rules from
//! [`zeebc_sem`] run while the tree is built, so the first type error
//! aborts the parse exactly where the source goes wrong.

pub mod ast;
pub mod expr;
pub mod symbols;

pub use ast::{Expr, ExprKind, Program, Stmt};
pub use symbols::{Symbol, SymbolId, SymbolTable};

use zeebc_lex::{Lexer, Token, TokenId};
use zeebc_sem::{check_assignment, BaseType, Type};
use zeebc_util::{Diagnostic, Result};

/// The statement parser.
///
/// # Example
///
/// ```
/// use zeebc_lex::{Lexer, SourceReader};
/// use zeebc_par::Parser;
///
/// let mut reader = SourceReader::new("PRINT 1 + 2\n");
/// let program = Parser::new(Lexer::new(&mut reader)).run().unwrap();
/// assert_eq!(program.statements.len(), 1);
/// ```
pub struct Parser<'r, 'src> {
    lexer: Lexer<'r, 'src>,
    /// Token buffer; index 0 is the current token.
    tokens: Vec<Token<'src>>,
    symbols: SymbolTable<'src>,
}

impl<'r, 'src> Parser<'r, 'src> {
    /// Create a parser over the given lexer.
    pub fn new(lexer: Lexer<'r, 'src>) -> Self {
        Self {
            lexer,
            tokens: Vec::new(),
            symbols: SymbolTable::new(),
        }
    }

    /// Parse the whole token stream into a [`Program`].
    ///
    /// Statements are separated by newlines or `:`; blank separators are
    /// skipped, and end-of-input closes the final statement.
    pub fn run(mut self) -> Result<Program<'src>> {
        let mut statements = Vec::new();

        loop {
            while matches!(
                self.token(0)?.id,
                TokenId::EndOfLine | TokenId::SymColon
            ) {
                self.eat();
            }

            if self.token(0)?.id == TokenId::EndOfCode {
                break;
            }

            statements.push(self.parse_statement()?);
        }

        Ok(Program {
            symbols: self.symbols,
            statements,
        })
    }

    /// The token `lookahead` positions ahead, pulling from the lexer as
    /// needed. Lex errors surface here.
    pub(crate) fn token(&mut self, lookahead: usize) -> Result<Token<'src>> {
        while self.tokens.len() <= lookahead {
            let token = self.lexer.next_token()?;
            self.tokens.push(token);
        }
        Ok(self.tokens[lookahead])
    }

    /// Discard the current token.
    pub(crate) fn eat(&mut self) {
        debug_assert!(!self.tokens.is_empty(), "eat before token()");
        if !self.tokens.is_empty() {
            self.tokens.remove(0);
        }
    }

    /// Require the current token to be `id`, erroring with `Expected
    /// <what>` otherwise. The token is not consumed.
    pub(crate) fn expect(&mut self, id: TokenId, what: &str) -> Result<Token<'src>> {
        let token = self.token(0)?;
        if token.id != id {
            return Err(Diagnostic::new(token.range, format!("Expected {what}")));
        }
        Ok(token)
    }

    /// Consume the statement terminator: a newline or `:`. End-of-input
    /// also terminates a statement but stays in the buffer.
    fn eat_end_of_line(&mut self) -> Result<()> {
        let token = self.token(0)?;
        match token.id {
            TokenId::EndOfLine | TokenId::SymColon => {
                self.eat();
                Ok(())
            }
            TokenId::EndOfCode => Ok(()),
            _ => Err(Diagnostic::new(token.range, "Expected end-of-line")),
        }
    }

    fn parse_statement(&mut self) -> Result<Stmt<'src>> {
        let token = self.token(0)?;
        match token.id {
            TokenId::KeyPrint => self.parse_print(),
            TokenId::UntypedName | TokenId::TypedName => self.parse_assignment(),
            _ => Err(Diagnostic::new(token.range, "Expected statement")),
        }
    }

    /// `PRINT [expr]`; the expression is optional.
    fn parse_print(&mut self) -> Result<Stmt<'src>> {
        let print_token = self.token(0)?;
        self.eat();

        let expr = if self.starts_expression()? {
            Some(self.parse_expression(expr::prec::MIN)?)
        } else {
            None
        };

        self.eat_end_of_line()?;

        let range = match &expr {
            Some(expr) => print_token.range.merge(expr.range),
            None => print_token.range,
        };
        Ok(Stmt::Print { expr, range })
    }

    /// `name = expr`. The left-hand side names (and on first mention
    /// creates) the symbol; the right-hand side gets an implicit cast
    /// where the assignment rules permit one.
    fn parse_assignment(&mut self) -> Result<Stmt<'src>> {
        let name_token = self.token(0)?;
        let ty = Type::new(BaseType::from_name_sigil(name_token.text));
        let symbol = self
            .symbols
            .find_or_create(name_token.text, name_token.range, ty)?;
        self.eat();

        let eq = self.token(0)?;
        if eq.id != TokenId::SymEqual {
            return Err(Diagnostic::new(
                eq.range,
                "Expected equals after variable name for assignment",
            ));
        }
        let eq_range = eq.range;
        self.eat();

        if !self.starts_expression()? {
            return Err(Diagnostic::new(
                self.token(0)?.range,
                "Expected expression for assignment",
            ));
        }
        let expr = self.parse_expression(expr::prec::MIN)?;
        self.eat_end_of_line()?;

        // conversion failures point at the '=' of the assignment
        let target = self.symbols.get(symbol).ty;
        let expr = match check_assignment(target, expr.ty, eq_range)? {
            Some(to) => expr.cast_to(to),
            None => expr,
        };

        let range = name_token.range.merge(expr.range);
        Ok(Stmt::Assignment {
            symbol,
            expr,
            range,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zeebc_lex::SourceReader;
    use zeebc_sem::BinaryOp;
    use zeebc_util::Range;

    fn parse(source: &str) -> Result<Program<'_>> {
        let mut reader = SourceReader::new(source);
        Parser::new(Lexer::new(&mut reader)).run()
    }

    fn parse_ok(source: &str) -> Program<'_> {
        parse(source).expect("parse error")
    }

    // ------------------------------------------------------------------
    // statements
    // ------------------------------------------------------------------

    #[test]
    fn test_print_with_expression() {
        let program = parse_ok("PRINT 1 + 2\n");
        assert_eq!(program.statements.len(), 1);
        let Stmt::Print { expr: Some(expr), .. } = &program.statements[0] else {
            panic!("expected print statement");
        };
        assert!(matches!(expr.kind, ExprKind::Binary { op: BinaryOp::Add, .. }));
        assert_eq!(expr.ty.base, BaseType::Integer);
    }

    #[test]
    fn test_print_without_expression() {
        let program = parse_ok("PRINT\n");
        assert!(matches!(&program.statements[0], Stmt::Print { expr: None, .. }));
    }

    #[test]
    fn test_assignment_creates_symbol() {
        let program = parse_ok("total = 41 + 1\n");
        let Stmt::Assignment { symbol, expr, .. } = &program.statements[0] else {
            panic!("expected assignment");
        };
        let symbol = program.symbols.get(*symbol);
        assert_eq!(symbol.name.as_str(), "total");
        assert_eq!(symbol.ty.base, BaseType::Integer);
        assert_eq!(expr.ty.base, BaseType::Integer);
    }

    #[test]
    fn test_sigils_type_the_assignment_target() {
        let program = parse_ok("s$ = \"x\"\nok? = TRUE\nr! = 1.5\nn% = 2\n");
        let types: Vec<_> = program.symbols.iter().map(|(_, s)| s.ty.base).collect();
        assert_eq!(
            types,
            vec![BaseType::String, BaseType::Boolean, BaseType::Real, BaseType::Integer]
        );
    }

    #[test]
    fn test_statements_separated_by_colon() {
        let program = parse_ok("a = 1 : PRINT a\n");
        assert_eq!(program.statements.len(), 2);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let program = parse_ok("\n\nPRINT 1\n\n\nPRINT 2\n");
        assert_eq!(program.statements.len(), 2);
    }

    #[test]
    fn test_last_statement_without_newline() {
        let program = parse_ok("PRINT 1");
        assert_eq!(program.statements.len(), 1);
    }

    #[test]
    fn test_empty_program() {
        let program = parse_ok("");
        assert!(program.statements.is_empty());
        assert!(program.symbols.is_empty());
    }

    #[test]
    fn test_statement_order_is_source_order() {
        let program = parse_ok("a = 1\nb = 2\nPRINT a\n");
        assert_eq!(program.statements.len(), 3);
        assert!(matches!(program.statements[2], Stmt::Print { .. }));
    }

    // ------------------------------------------------------------------
    // symbol unification
    // ------------------------------------------------------------------

    #[test]
    fn test_case_variants_share_a_symbol() {
        let program = parse_ok("Count = 1\nPRINT COUNT\n");
        assert_eq!(program.symbols.len(), 1);
        let (_, symbol) = program.symbols.iter().next().unwrap();
        assert_eq!(symbol.name.as_str(), "Count");
    }

    #[test]
    fn test_symbols_in_first_mention_order() {
        let program = parse_ok("z = 1\na = z\nm$ = \"x\"\n");
        let names: Vec<_> = program.symbols.iter().map(|(_, s)| s.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a", "m$"]);
    }

    #[test]
    fn test_read_before_write_creates_symbol() {
        let program = parse_ok("PRINT x\n");
        assert_eq!(program.symbols.len(), 1);
        let (_, symbol) = program.symbols.iter().next().unwrap();
        assert_eq!(symbol.ty.base, BaseType::Integer);
    }

    // ------------------------------------------------------------------
    // assignment conversions
    // ------------------------------------------------------------------

    #[test]
    fn test_real_to_integer_assignment_casts() {
        let program = parse_ok("n = 1.5\n");
        let Stmt::Assignment { expr, .. } = &program.statements[0] else {
            panic!("expected assignment");
        };
        assert!(matches!(expr.kind, ExprKind::Cast { to: BaseType::Integer, .. }));
        assert_eq!(expr.ty.base, BaseType::Integer);
    }

    #[test]
    fn test_integer_to_real_assignment_casts() {
        let program = parse_ok("r! = 2\n");
        let Stmt::Assignment { expr, .. } = &program.statements[0] else {
            panic!("expected assignment");
        };
        assert!(matches!(expr.kind, ExprKind::Cast { to: BaseType::Real, .. }));
    }

    #[test]
    fn test_boolean_to_integer_assignment_casts() {
        let program = parse_ok("n = TRUE\n");
        let Stmt::Assignment { expr, .. } = &program.statements[0] else {
            panic!("expected assignment");
        };
        assert!(matches!(expr.kind, ExprKind::Cast { to: BaseType::Integer, .. }));
    }

    #[test]
    fn test_disallowed_assignment_reports_on_equals() {
        let err = parse("b? = 1\n").unwrap_err();
        assert_eq!(err.message, "Unable to implicitly cast type");
        assert_eq!(err.range, Range::at(1, 4));
    }

    // ------------------------------------------------------------------
    // errors
    // ------------------------------------------------------------------

    #[test]
    fn test_missing_equals() {
        let err = parse("a 1\n").unwrap_err();
        assert_eq!(err.message, "Expected equals after variable name for assignment");
    }

    #[test]
    fn test_missing_expression_after_equals() {
        let err = parse("a =\n").unwrap_err();
        assert_eq!(err.message, "Expected expression for assignment");
    }

    #[test]
    fn test_missing_end_of_line() {
        let err = parse("PRINT 1 2\n").unwrap_err();
        assert_eq!(err.message, "Expected end-of-line");
    }

    #[test]
    fn test_unknown_statement_start() {
        let err = parse("123\n").unwrap_err();
        assert_eq!(err.message, "Expected statement");
    }

    #[test]
    fn test_lex_error_surfaces_through_parser() {
        let err = parse("PRINT ~1\n").unwrap_err();
        assert_eq!(err.message, "Unexpected character encountered");
        assert_eq!(err.range, Range::at(1, 7));
    }

    #[test]
    fn test_integer_literal_out_of_range() {
        let err = parse("PRINT 9223372036854775808\n").unwrap_err();
        assert_eq!(err.message, "Integer literal out of range");
        // the maximum value still parses
        assert!(parse("PRINT 9223372036854775807\n").is_ok());
    }
}
