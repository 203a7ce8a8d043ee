//! Token definitions and the keyword/symbol tables.
//!
//! [`TokenId`] is a closed enumeration: every keyword and punctuation
//! symbol of the language has its own id, so later phases match on ids and
//! never re-inspect text. A token's text is a [`Lexeme`] view of the source
//! (for string literals, without the surrounding quotes).

use zeebc_util::{Lexeme, Range};

/// Identifies the lexical class of a [`Token`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenId {
    /// Marks the end of all code; returned repeatedly once reached.
    EndOfCode,

    /// A single newline. Consecutive newlines yield one token each.
    EndOfLine,

    // literals
    Integer,
    Real,
    String,

    // user-defined names
    UntypedName,
    TypedName,

    // keywords
    KeyAbs,
    KeyAnd,
    KeyAs,
    KeyAsc,
    KeyAtn,
    KeyBinS,
    KeyBoolean,
    KeyCall,
    KeyCase,
    KeyChrS,
    KeyCommandS,
    KeyConst,
    KeyCos,
    KeyData,
    KeyDateS,
    KeyDeclare,
    KeyDim,
    KeyDo,
    KeyElse,
    KeyElseif,
    KeyEnd,
    KeyEnvironS,
    KeyExit,
    KeyExp,
    KeyFalse,
    KeyFix,
    KeyFor,
    KeyFunction,
    KeyGosub,
    KeyHexS,
    KeyIf,
    KeyInkeyS,
    KeyInput,
    KeyInstr,
    KeyInt,
    KeyInteger,
    KeyIs,
    KeyLbound,
    KeyLcaseS,
    KeyLeftS,
    KeyLen,
    KeyLog,
    KeyLoop,
    KeyLtrimS,
    KeyMidS,
    KeyMod,
    KeyNext,
    KeyNot,
    KeyOctS,
    KeyOr,
    KeyPrint,
    KeyRandomize,
    KeyRead,
    KeyReal,
    KeyRedim,
    KeyRestore,
    KeyReturn,
    KeyRightS,
    KeyRnd,
    KeyRtrimS,
    KeySelect,
    KeyShared,
    KeySgn,
    KeySin,
    KeySleep,
    KeySpaceS,
    KeySqr,
    KeyStatic,
    KeyStep,
    KeyStrS,
    KeyString,
    KeyStringS,
    KeySub,
    KeySwap,
    KeyTan,
    KeyTimeS,
    KeyTimer,
    KeyThen,
    KeyTo,
    KeyTrue,
    KeyType,
    KeyUbound,
    KeyUcaseS,
    KeyUntil,
    KeyVal,
    KeyWhile,
    KeyXor,

    // symbols
    SymAdd,
    SymSubtract,
    SymMultiply,
    SymDivide,
    SymIntDivide,
    SymLess,
    SymLessEquals,
    SymGreater,
    SymGreaterEquals,
    SymEqual,
    SymNotEqual,
    SymColon,
    SymComma,
    SymSemicolon,
    SymOpenParen,
    SymCloseParen,
    SymPeriod,
}

/// One lexical unit of the source.
#[derive(Clone, Copy, Debug)]
pub struct Token<'a> {
    /// Lexical class.
    pub id: TokenId,
    /// Source extent; [`Range::DUMMY`] for `EndOfCode`.
    pub range: Range,
    /// The lexeme text. String tokens exclude the surrounding quotes.
    pub text: Lexeme<'a>,
}

/// The complete keyword table, matched case-insensitively against names.
pub const KEYWORDS: &[(&str, TokenId)] = &[
    ("ABS", TokenId::KeyAbs),
    ("AND", TokenId::KeyAnd),
    ("AS", TokenId::KeyAs),
    ("ASC", TokenId::KeyAsc),
    ("ATN", TokenId::KeyAtn),
    ("BIN$", TokenId::KeyBinS),
    ("BOOLEAN", TokenId::KeyBoolean),
    ("CALL", TokenId::KeyCall),
    ("CASE", TokenId::KeyCase),
    ("CHR$", TokenId::KeyChrS),
    ("COMMAND$", TokenId::KeyCommandS),
    ("CONST", TokenId::KeyConst),
    ("COS", TokenId::KeyCos),
    ("DATA", TokenId::KeyData),
    ("DATE$", TokenId::KeyDateS),
    ("DECLARE", TokenId::KeyDeclare),
    ("DIM", TokenId::KeyDim),
    ("DO", TokenId::KeyDo),
    ("ELSE", TokenId::KeyElse),
    ("ELSEIF", TokenId::KeyElseif),
    ("END", TokenId::KeyEnd),
    ("ENVIRON$", TokenId::KeyEnvironS),
    ("EXIT", TokenId::KeyExit),
    ("EXP", TokenId::KeyExp),
    ("FALSE", TokenId::KeyFalse),
    ("FIX", TokenId::KeyFix),
    ("FOR", TokenId::KeyFor),
    ("FUNCTION", TokenId::KeyFunction),
    ("GOSUB", TokenId::KeyGosub),
    ("HEX$", TokenId::KeyHexS),
    ("IF", TokenId::KeyIf),
    ("INKEY$", TokenId::KeyInkeyS),
    ("INPUT", TokenId::KeyInput),
    ("INSTR", TokenId::KeyInstr),
    ("INT", TokenId::KeyInt),
    ("INTEGER", TokenId::KeyInteger),
    ("IS", TokenId::KeyIs),
    ("LBOUND", TokenId::KeyLbound),
    ("LCASE$", TokenId::KeyLcaseS),
    ("LEFT$", TokenId::KeyLeftS),
    ("LEN", TokenId::KeyLen),
    ("LOG", TokenId::KeyLog),
    ("LOOP", TokenId::KeyLoop),
    ("LTRIM$", TokenId::KeyLtrimS),
    ("MID$", TokenId::KeyMidS),
    ("MOD", TokenId::KeyMod),
    ("NEXT", TokenId::KeyNext),
    ("NOT", TokenId::KeyNot),
    ("OCT$", TokenId::KeyOctS),
    ("OR", TokenId::KeyOr),
    ("PRINT", TokenId::KeyPrint),
    ("RANDOMIZE", TokenId::KeyRandomize),
    ("READ", TokenId::KeyRead),
    ("REAL", TokenId::KeyReal),
    ("REDIM", TokenId::KeyRedim),
    ("RESTORE", TokenId::KeyRestore),
    ("RETURN", TokenId::KeyReturn),
    ("RIGHT$", TokenId::KeyRightS),
    ("RND", TokenId::KeyRnd),
    ("RTRIM$", TokenId::KeyRtrimS),
    ("SELECT", TokenId::KeySelect),
    ("SHARED", TokenId::KeyShared),
    ("SGN", TokenId::KeySgn),
    ("SIN", TokenId::KeySin),
    ("SLEEP", TokenId::KeySleep),
    ("SPACE$", TokenId::KeySpaceS),
    ("SQR", TokenId::KeySqr),
    ("STATIC", TokenId::KeyStatic),
    ("STEP", TokenId::KeyStep),
    ("STR$", TokenId::KeyStrS),
    ("STRING", TokenId::KeyString),
    ("STRING$", TokenId::KeyStringS),
    ("SUB", TokenId::KeySub),
    ("SWAP", TokenId::KeySwap),
    ("TAN", TokenId::KeyTan),
    ("TIME$", TokenId::KeyTimeS),
    ("TIMER", TokenId::KeyTimer),
    ("THEN", TokenId::KeyThen),
    ("TO", TokenId::KeyTo),
    ("TRUE", TokenId::KeyTrue),
    ("TYPE", TokenId::KeyType),
    ("UBOUND", TokenId::KeyUbound),
    ("UCASE$", TokenId::KeyUcaseS),
    ("UNTIL", TokenId::KeyUntil),
    ("VAL", TokenId::KeyVal),
    ("WHILE", TokenId::KeyWhile),
    ("XOR", TokenId::KeyXor),
];

/// The complete symbol table.
pub const SYMBOLS: &[(&str, TokenId)] = &[
    ("+", TokenId::SymAdd),
    ("-", TokenId::SymSubtract),
    ("*", TokenId::SymMultiply),
    ("/", TokenId::SymDivide),
    ("\\", TokenId::SymIntDivide),
    ("<", TokenId::SymLess),
    ("<=", TokenId::SymLessEquals),
    (">", TokenId::SymGreater),
    (">=", TokenId::SymGreaterEquals),
    ("=", TokenId::SymEqual),
    ("<>", TokenId::SymNotEqual),
    (":", TokenId::SymColon),
    (",", TokenId::SymComma),
    (";", TokenId::SymSemicolon),
    ("(", TokenId::SymOpenParen),
    (")", TokenId::SymCloseParen),
    (".", TokenId::SymPeriod),
];

/// Look up a name in the keyword table, case-insensitively.
pub fn keyword_id(text: &str) -> Option<TokenId> {
    KEYWORDS
        .iter()
        .find(|(keyword, _)| keyword.eq_ignore_ascii_case(text))
        .map(|&(_, id)| id)
}

/// Map a completed symbol lexeme to its id.
///
/// The state machine only completes lexemes present in [`SYMBOLS`], so
/// every input is found.
pub(crate) fn symbol_id(text: &str) -> TokenId {
    match SYMBOLS.iter().find(|(symbol, _)| *symbol == text) {
        Some(&(_, id)) => id,
        None => unreachable!("symbol state completed a non-symbol lexeme"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup_is_case_insensitive() {
        assert_eq!(keyword_id("PRINT"), Some(TokenId::KeyPrint));
        assert_eq!(keyword_id("print"), Some(TokenId::KeyPrint));
        assert_eq!(keyword_id("Print"), Some(TokenId::KeyPrint));
        assert_eq!(keyword_id("str$"), Some(TokenId::KeyStrS));
    }

    #[test]
    fn test_non_keywords_miss() {
        assert_eq!(keyword_id("PRINTER"), None);
        assert_eq!(keyword_id("x"), None);
        assert_eq!(keyword_id(""), None);
        // a sigil makes it a different name
        assert_eq!(keyword_id("PRINT$"), None);
        assert_eq!(keyword_id("STR"), None);
    }

    #[test]
    fn test_keyword_table_is_complete() {
        assert_eq!(KEYWORDS.len(), 85);
    }

    #[test]
    fn test_symbol_lookup() {
        assert_eq!(symbol_id("+"), TokenId::SymAdd);
        assert_eq!(symbol_id("<="), TokenId::SymLessEquals);
        assert_eq!(symbol_id("<>"), TokenId::SymNotEqual);
        assert_eq!(symbol_id("\\"), TokenId::SymIntDivide);
        assert_eq!(SYMBOLS.len(), 17);
    }
}
