//! Stateful tokenizer for the HCL lexer.
//!
//! Two states: `Root` for ordinary tokens and `Heredoc` after a `<<DELIM`
//! opener. Heredoc bodies are emitted as alternating `Eol`/`Body` tokens
//! until the closing delimiter line, which pops back to `Root`.

use tracing::trace;

use crate::token::{Span, Token, TokenKind};

/// A tokenizer that produces tokens from HCL source text.
#[derive(Clone)]
pub struct Tokenizer<'src> {
    /// The source text being tokenized.
    source: &'src str,
    /// The remaining source text (suffix of `source`).
    remaining: &'src str,
    /// Current byte position in `source`.
    pos: u32,

    /// State for heredoc tokenization.
    heredoc_state: Option<HeredocState>,
}

/// State while inside a heredoc body.
#[derive(Debug, Clone)]
struct HeredocState {
    /// The delimiter to match, without any leading `-`.
    delimiter: String,
}

impl<'src> Tokenizer<'src> {
    /// Create a new tokenizer for the given source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            remaining: source,
            pos: 0,
            heredoc_state: None,
        }
    }

    /// Check if we're at the end of input.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Peek at the next character without consuming it.
    #[inline]
    fn peek(&self) -> Option<char> {
        self.remaining.chars().next()
    }

    /// Peek at the nth character (0-indexed) without consuming.
    #[inline]
    fn peek_nth(&self, n: usize) -> Option<char> {
        self.remaining.chars().nth(n)
    }

    /// Advance by one character and return it.
    #[inline]
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8() as u32;
        self.remaining = &self.remaining[c.len_utf8()..];
        Some(c)
    }

    /// Advance by n bytes.
    #[inline]
    fn advance_by(&mut self, n: usize) {
        self.pos += n as u32;
        self.remaining = &self.remaining[n..];
    }

    /// Check if the remaining text starts with the given prefix.
    #[inline]
    fn starts_with(&self, prefix: &str) -> bool {
        self.remaining.starts_with(prefix)
    }

    /// Create a token from the given start position to current position.
    fn token(&self, kind: TokenKind, start: u32) -> Token<'src> {
        let span = Span::new(start, self.pos);
        let text = span.slice(self.source);
        trace!(?kind, start = span.start, end = span.end, ?text, "token");
        Token::new(kind, span, text)
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Token<'src> {
        if let Some(state) = self.heredoc_state.clone() {
            return self.tokenize_heredoc(&state.delimiter);
        }

        if self.is_eof() {
            return self.token(TokenKind::Eof, self.pos);
        }

        let start = self.pos;
        let c = self.peek().unwrap_or('\0');

        match c {
            c if c.is_whitespace() => self.tokenize_whitespace(),

            '/' if self.starts_with("/*") => self.tokenize_block_comment(),
            '/' if self.starts_with("//") => self.tokenize_line_comments(),
            '#' => self.tokenize_line_comments(),

            '"' | '\'' => self.tokenize_string(c),

            '<' if self.starts_with("<<") && self.heredoc_opener_len() > 0 => {
                self.tokenize_heredoc_opener()
            }

            '-' | '+' if matches!(self.peek_nth(1), Some(d) if d.is_ascii_digit() || d == '.') => {
                self.tokenize_number()
            }
            '.' if matches!(self.peek_nth(1), Some(d) if d.is_ascii_digit()) => {
                self.tokenize_number()
            }
            c if c.is_ascii_digit() => self.tokenize_number(),

            c if c.is_alphabetic() => self.tokenize_ident(),

            ']' | '[' | '*' | '?' | '{' | '}' | '=' | ':' | ',' | '(' | ')' | '|' => {
                self.advance();
                self.token(TokenKind::Punct, start)
            }

            _ => {
                self.advance();
                self.token(TokenKind::Error, start)
            }
        }
    }

    fn tokenize_whitespace(&mut self) -> Token<'src> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
        self.token(TokenKind::Whitespace, start)
    }

    fn tokenize_ident(&mut self) -> Token<'src> {
        let start = self.pos;
        self.advance();
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_' || c == '-') {
            self.advance();
        }
        self.token(TokenKind::Ident, start)
    }

    /// `[-+]?[0-9]*\.?[0-9]+([eE][-+]?[0-9]+)?`
    fn tokenize_number(&mut self) -> Token<'src> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.advance();
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some('.') && matches!(self.peek_nth(1), Some(c) if c.is_ascii_digit()) {
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let mut lookahead = 1;
            if matches!(self.peek_nth(1), Some('-' | '+')) {
                lookahead = 2;
            }
            if matches!(self.peek_nth(lookahead), Some(c) if c.is_ascii_digit()) {
                self.advance();
                if matches!(self.peek(), Some('-' | '+')) {
                    self.advance();
                }
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.advance();
                }
            }
        }
        self.token(TokenKind::Number, start)
    }

    /// Tokenize a quoted string. Escapes are preserved verbatim for the
    /// lexer's unquoting pass; an unterminated string is an error token.
    fn tokenize_string(&mut self, quote: char) -> Token<'src> {
        let start = self.pos;
        self.advance();
        loop {
            match self.peek() {
                None => return self.token(TokenKind::Error, start),
                Some('\n') => return self.token(TokenKind::Error, start),
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    if self.peek().is_some() {
                        self.advance();
                    }
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        self.token(TokenKind::Str, start)
    }

    /// One or more `//` / `#` comment lines. Consecutive comment-only lines
    /// separated by a single newline and horizontal indent join into one
    /// token; a blank line ends the run.
    fn tokenize_line_comments(&mut self) -> Token<'src> {
        let start = self.pos;
        loop {
            // Consume marker and the rest of the line.
            while matches!(self.peek(), Some(c) if c != '\n') {
                self.advance();
            }
            // Join a directly following comment line: \n [\t ]* marker.
            let mut lookahead = self.remaining.char_indices().peekable();
            let joined = match lookahead.next() {
                Some((_, '\n')) => {
                    let mut offset = 1;
                    for (i, c) in lookahead {
                        if c == ' ' || c == '\t' {
                            offset = i + c.len_utf8();
                            continue;
                        }
                        offset = i;
                        break;
                    }
                    let rest = &self.remaining[offset..];
                    if rest.starts_with("//") || rest.starts_with('#') {
                        Some(offset)
                    } else {
                        None
                    }
                }
                _ => None,
            };
            match joined {
                Some(offset) => self.advance_by(offset),
                None => break,
            }
        }
        self.token(TokenKind::Comment, start)
    }

    /// `/* … */`, non-greedy.
    fn tokenize_block_comment(&mut self) -> Token<'src> {
        let start = self.pos;
        self.advance();
        self.advance();
        loop {
            if self.is_eof() {
                return self.token(TokenKind::Error, start);
            }
            if self.starts_with("*/") {
                self.advance();
                self.advance();
                break;
            }
            self.advance();
        }
        self.token(TokenKind::Comment, start)
    }

    /// Length in bytes of a `<<-?\w+` opener at the cursor, or 0.
    fn heredoc_opener_len(&self) -> usize {
        let rest = &self.remaining[2..];
        let rest = rest.strip_prefix('-').unwrap_or(rest);
        let word = rest
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .map(char::len_utf8)
            .sum::<usize>();
        if word == 0 {
            0
        } else {
            self.remaining.len() - rest.len() + word
        }
    }

    fn tokenize_heredoc_opener(&mut self) -> Token<'src> {
        let start = self.pos;
        let len = self.heredoc_opener_len();
        self.advance_by(len);
        let opener = &self.source[start as usize..self.pos as usize];
        let delimiter = opener
            .trim_start_matches("<<")
            .trim_start_matches('-')
            .to_string();
        self.heredoc_state = Some(HeredocState { delimiter });
        self.token(TokenKind::Heredoc, start)
    }

    /// Byte length of a closing delimiter line (`\n [\t ]* delim`) at the
    /// cursor, or None.
    fn heredoc_end_len(&self, delimiter: &str) -> Option<usize> {
        let rest = self.remaining.strip_prefix('\n')?;
        let indent = rest
            .bytes()
            .take_while(|b| *b == b' ' || *b == b'\t')
            .count();
        let after_indent = &rest[indent..];
        let after_delim = after_indent.strip_prefix(delimiter)?;
        // Word boundary: EOFX must not close <<EOF.
        match after_delim.chars().next() {
            Some(c) if c.is_alphanumeric() || c == '_' => None,
            _ => Some(1 + indent + delimiter.len()),
        }
    }

    /// Produce the next token inside a heredoc body.
    fn tokenize_heredoc(&mut self, delimiter: &str) -> Token<'src> {
        let start = self.pos;
        if let Some(len) = self.heredoc_end_len(delimiter) {
            self.advance_by(len);
            self.heredoc_state = None;
            return self.token(TokenKind::End, start);
        }
        if self.is_eof() {
            // Unterminated heredoc; clear the state so we don't loop.
            self.heredoc_state = None;
            return self.token(TokenKind::Error, start);
        }
        if self.peek() == Some('\n') {
            self.advance();
            return self.token(TokenKind::Eol, start);
        }
        while matches!(self.peek(), Some(c) if c != '\n') {
            self.advance();
        }
        self.token(TokenKind::Body, start)
    }
}

impl<'src> Iterator for Tokenizer<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}
