//! Parse error types.

use std::fmt;

use hackle_ast::Position;

/// An error produced by the lexer or parser, with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub pos: Position,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, pos: Position) -> Self {
        Self { kind, pos }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pos.is_known() {
            write!(f, "{}: {}", self.pos, self.kind)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

impl std::error::Error for ParseError {}

/// Kind of parse error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unterminated heredoc")]
    UnterminatedHeredoc,
    #[error("unterminated comment")]
    UnterminatedComment,
    #[error("invalid escape sequence \\{0}")]
    InvalidEscape(String),
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
    #[error("unexpected {got}, expected {expected}")]
    Unexpected { got: String, expected: &'static str },
    #[error("unexpected end of input, expected {0}")]
    UnexpectedEof(&'static str),
}
