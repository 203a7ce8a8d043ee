//! The character-driven state machine lexer.
//!
//! Tokenization runs a small DFA: the first character of a pending token
//! selects a [`State`], and every following character either extends the
//! token, completes it, or does both. Whitespace and comment tokens are
//! recognized the same way and then discarded, so callers only ever see
//! meaningful tokens.

use zeebc_util::{Diagnostic, Lexeme, Range, Result};

use crate::reader::SourceReader;
use crate::token::{keyword_id, symbol_id, Token, TokenId};

/// The lexer's DFA states. Whitespace and Comment tokens are consumed and
/// discarded; all other states produce a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Whitespace,
    Comment,
    Integer,
    Real,
    String,
    Name,
    Symbol,
    EndOfLine,
}

/// What to do with the character under inspection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    /// The character belongs to the current token; keep going.
    Consume,
    /// The current token ended before this character.
    Complete,
    /// The character belongs to the current token and ends it.
    ConsumeAndComplete,
}

/// Streams [`Token`]s from a [`SourceReader`].
///
/// The stream is finite and restartable only by constructing a new lexer
/// over a new reader. After the input is exhausted it keeps returning the
/// `EndOfCode` token.
///
/// # Example
///
/// ```
/// use zeebc_lex::{Lexer, SourceReader, TokenId};
///
/// let mut reader = SourceReader::new("PRINT 1");
/// let mut lexer = Lexer::new(&mut reader);
///
/// assert_eq!(lexer.next_token().unwrap().id, TokenId::KeyPrint);
/// assert_eq!(lexer.next_token().unwrap().id, TokenId::Integer);
/// assert_eq!(lexer.next_token().unwrap().id, TokenId::EndOfCode);
/// assert_eq!(lexer.next_token().unwrap().id, TokenId::EndOfCode);
/// ```
pub struct Lexer<'r, 'src> {
    reader: &'r mut SourceReader<'src>,

    /// One-byte lookahead; 0 when nothing is buffered or at end of input.
    ch: u8,

    /// Byte offset of the buffered character.
    ch_offset: usize,

    /// Line of the buffered character (1-based).
    ch_line: u32,

    /// Column of the buffered character (1-based).
    ch_col: u32,
}

impl<'r, 'src> Lexer<'r, 'src> {
    /// Create a lexer reading from `reader`.
    pub fn new(reader: &'r mut SourceReader<'src>) -> Self {
        Self {
            reader,
            ch: 0,
            ch_offset: 0,
            ch_line: 1,
            ch_col: 1,
        }
    }

    /// Produce the next meaningful token.
    ///
    /// Whitespace and comments are consumed silently. Once the input is
    /// exhausted every further call returns the `EndOfCode` token.
    ///
    /// # Errors
    ///
    /// Returns a [`Diagnostic`] for a character no token can start with,
    /// and for a newline or end-of-input inside a string literal.
    pub fn next_token(&mut self) -> Result<Token<'src>> {
        loop {
            if self.ch == 0 {
                self.advance();
                if self.ch == 0 {
                    return Ok(Token {
                        id: TokenId::EndOfCode,
                        range: Range::DUMMY,
                        text: Lexeme::EMPTY,
                    });
                }
            }

            // start a new token at the buffered character
            let start_offset = self.ch_offset;
            let mut range = Range::at(self.ch_line, self.ch_col);
            let mut state = self.start_state()?;
            let mut end_offset = start_offset + 1;

            self.advance();
            loop {
                let step = self.step(&mut state, start_offset, end_offset, range)?;
                if step == Step::Complete {
                    break;
                }
                end_offset = self.ch_offset + 1;
                range.extend();
                self.advance();
                if step == Step::ConsumeAndComplete {
                    break;
                }
            }

            if state == State::Whitespace || state == State::Comment {
                continue;
            }

            return Ok(self.construct(state, range, start_offset, end_offset));
        }
    }

    /// Pull the next character into the lookahead buffer, recording its
    /// own position before the reader moves past it.
    fn advance(&mut self) {
        let (line, column) = self.reader.position();
        self.ch_offset = self.reader.offset();
        self.ch_line = line;
        self.ch_col = column;
        self.ch = self.reader.read_next_char();
    }

    /// Select the DFA state for a token starting with the buffered
    /// character.
    fn start_state(&self) -> Result<State> {
        match self.ch {
            b' ' | b'\t' => Ok(State::Whitespace),
            b'\'' => Ok(State::Comment),
            b'a'..=b'z' | b'A'..=b'Z' => Ok(State::Name),
            b'0'..=b'9' => Ok(State::Integer),
            b'.' => Ok(State::Real),
            b'\n' => Ok(State::EndOfLine),
            b'"' => Ok(State::String),
            b'+' | b'-' | b'*' | b'/' | b'\\' | b'<' | b'>' | b'=' | b':' | b',' | b';'
            | b'(' | b')' => Ok(State::Symbol),
            _ => Err(Diagnostic::new(
                Range::at(self.ch_line, self.ch_col),
                "Unexpected character encountered",
            )),
        }
    }

    /// Decide what the buffered character does to the token in progress.
    ///
    /// `start_offset..end_offset` is the token text consumed so far and
    /// `range` its source extent; both are needed for the transition rules
    /// (a `Real` whose sole character is `.` becomes a symbol) and for
    /// error reporting.
    fn step(
        &mut self,
        state: &mut State,
        start_offset: usize,
        end_offset: usize,
        range: Range,
    ) -> Result<Step> {
        let ch = self.ch;
        let step = match *state {
            State::Whitespace => {
                if ch == b' ' || ch == b'\t' {
                    Step::Consume
                } else {
                    Step::Complete
                }
            }

            State::Comment => {
                if ch != b'\n' && ch != 0 {
                    Step::Consume
                } else {
                    Step::Complete
                }
            }

            State::Integer => {
                if ch == b'.' {
                    *state = State::Real;
                    Step::Consume
                } else if ch.is_ascii_digit() {
                    Step::Consume
                } else {
                    Step::Complete
                }
            }

            State::Real => {
                if ch.is_ascii_digit() {
                    Step::Consume
                } else {
                    if self.reader.slice(start_offset, end_offset) == "." {
                        *state = State::Symbol;
                    }
                    Step::Complete
                }
            }

            State::String => {
                if ch == b'\n' || ch == 0 {
                    return Err(Diagnostic::new(
                        range,
                        "End-of-line not permitted in string literal.",
                    ));
                } else if ch == b'"' {
                    Step::ConsumeAndComplete
                } else {
                    Step::Consume
                }
            }

            State::Name => {
                if ch.is_ascii_alphanumeric() || ch == b'_' {
                    Step::Consume
                } else if matches!(ch, b'?' | b'%' | b'!' | b'$') {
                    Step::ConsumeAndComplete
                } else {
                    Step::Complete
                }
            }

            State::Symbol => {
                let first = self.reader.slice(start_offset, end_offset).as_bytes()[0];
                if (first == b'<' && (ch == b'=' || ch == b'>')) || (first == b'>' && ch == b'=') {
                    Step::ConsumeAndComplete
                } else {
                    Step::Complete
                }
            }

            State::EndOfLine => Step::Complete,
        };

        Ok(step)
    }

    /// Build the token for a completed state.
    fn construct(&self, state: State, range: Range, start: usize, end: usize) -> Token<'src> {
        let text = self.reader.slice(start, end);
        match state {
            State::Integer => Token {
                id: TokenId::Integer,
                range,
                text: Lexeme::new(text),
            },

            State::Real => Token {
                id: TokenId::Real,
                range,
                text: Lexeme::new(text),
            },

            // the quotes are part of the token but not of the lexeme
            State::String => Token {
                id: TokenId::String,
                range,
                text: Lexeme::new(&text[1..text.len() - 1]),
            },

            State::Name => {
                let id = match keyword_id(text) {
                    Some(id) => id,
                    None => match text.as_bytes()[text.len() - 1] {
                        b'?' | b'%' | b'!' | b'$' => TokenId::TypedName,
                        _ => TokenId::UntypedName,
                    },
                };
                Token {
                    id,
                    range,
                    text: Lexeme::new(text),
                }
            }

            State::Symbol => Token {
                id: symbol_id(text),
                range,
                text: Lexeme::new(text),
            },

            State::EndOfLine => Token {
                id: TokenId::EndOfLine,
                range,
                text: Lexeme::EMPTY,
            },

            State::Whitespace | State::Comment => {
                unreachable!("discarded states never construct tokens")
            }
        }
    }
}

/// Iterate over meaningful tokens. The iterator ends at `EndOfCode`, or
/// after yielding the first error.
impl<'r, 'src> Iterator for Lexer<'r, 'src> {
    type Item = Result<Token<'src>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(token) if token.id == TokenId::EndOfCode => None,
            result => Some(result),
        }
    }
}
