//! Totality and stress tests for the lexer.
//!
//! The lexer must be total: for every input byte sequence it either
//! reaches `EndOfCode` or raises exactly one diagnostic, and it must do so
//! in a bounded number of steps.

use proptest::prelude::*;

use crate::lexer::Lexer;
use crate::reader::SourceReader;
use crate::token::TokenId;

/// Drive the lexer to completion, returning the number of tokens produced
/// before `EndOfCode` or the first diagnostic.
fn drive(source: &str) -> usize {
    let mut reader = SourceReader::new(source);
    let mut lexer = Lexer::new(&mut reader);
    let mut count = 0;

    // every iteration consumes at least one source byte, so this bound can
    // only be hit by a non-terminating lexer
    let limit = source.len() + 2;
    for _ in 0..=limit {
        match lexer.next_token() {
            Ok(token) if token.id == TokenId::EndOfCode => return count,
            Ok(_) => count += 1,
            Err(_) => return count,
        }
    }
    panic!("lexer failed to terminate on {source:?}");
}

proptest! {
    #[test]
    fn lexer_is_total_on_ascii(source in "[ -~\t\n]{0,64}") {
        drive(&source);
    }

    #[test]
    fn lexer_is_total_on_arbitrary_text(source in ".{0,64}") {
        drive(&source);
    }

    #[test]
    fn lexer_is_total_on_program_shaped_text(
        source in "(PRINT|print|[a-z][a-z0-9_]{0,4}[$%!?]? ?=? ?)([0-9]{1,3}(\\.[0-9]{0,3})?|\"[a-z ]{0,8}\"|[a-z]{1,4})( ?[-+*/\\\\<>=:;,.()] ?[0-9a-z\"$]{0,4}){0,3}\n?"
    ) {
        drive(&source);
    }
}

#[test]
fn test_unterminated_string_terminates() {
    // the unterminated-string case must not loop reading end-of-input
    drive("\"never closed");
    drive("s$ = \"abc");
}

#[test]
fn test_long_token_runs() {
    let names = "abc ".repeat(2000);
    assert_eq!(drive(&names), 2000);

    let digits = "9".repeat(4096);
    assert_eq!(drive(&digits), 1);
}
