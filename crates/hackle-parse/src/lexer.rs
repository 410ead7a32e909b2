//! Token post-processing.
//!
//! The tokenizer produces raw slices of the source; this pass turns them
//! into owned, cleaned tokens with [`Position`]s: strings are unquoted,
//! comment markers stripped and outdented, heredoc openers lose their `<<`,
//! and whitespace is elided.

use hackle_ast::Position;

use crate::error::{ParseError, ParseErrorKind};
use crate::token::TokenKind;
use crate::tokenizer::Tokenizer;

/// A cleaned, owned token.
#[derive(Debug, Clone, PartialEq)]
pub struct LexedToken {
    pub kind: TokenKind,
    /// Post-processed text: unquoted string content, cleaned comment lines
    /// joined by `\n`, heredoc delimiter without `<<`, raw text otherwise.
    pub value: String,
    pub pos: Position,
    pub end_pos: Position,
}

impl LexedToken {
    /// The punctuation character, for `Punct` tokens.
    pub fn punct(&self) -> Option<char> {
        if self.kind == TokenKind::Punct {
            self.value.chars().next()
        } else {
            None
        }
    }
}

/// Byte-offset to line/column mapping.
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                starts.push(i + 1);
            }
        }
        Self { starts }
    }

    pub fn position(&self, offset: usize) -> Position {
        let line = self.starts.partition_point(|start| *start <= offset);
        Position::new(offset, line, offset - self.starts[line - 1] + 1)
    }
}

/// Tokenize and post-process the whole source.
pub fn lex(source: &str) -> Result<Vec<LexedToken>, ParseError> {
    let index = LineIndex::new(source);
    let mut out = Vec::new();
    for token in Tokenizer::new(source) {
        let pos = index.position(token.span.start as usize);
        let end_pos = index.position(token.span.end as usize);
        let value = match token.kind {
            TokenKind::Whitespace => continue,
            TokenKind::Error => return Err(error_for(token.text, pos)),
            TokenKind::Str => unquote(token.text, pos)?,
            TokenKind::Comment => clean_comment(token.text).join("\n"),
            TokenKind::Heredoc => token.text.trim_start_matches("<<").to_string(),
            _ => token.text.to_string(),
        };
        out.push(LexedToken {
            kind: token.kind,
            value,
            pos,
            end_pos,
        });
    }
    Ok(out)
}

fn error_for(text: &str, pos: Position) -> ParseError {
    let kind = if text.starts_with('"') || text.starts_with('\'') {
        ParseErrorKind::UnterminatedString
    } else if text.starts_with("<<") {
        ParseErrorKind::UnterminatedHeredoc
    } else if text.starts_with("/*") {
        ParseErrorKind::UnterminatedComment
    } else {
        ParseErrorKind::UnexpectedChar(text.chars().next().unwrap_or('\0'))
    };
    ParseError::new(kind, pos)
}

/// Unquote a string literal. Single-quoted strings take embedded double
/// quotes literally but otherwise share the double-quoted escape set.
fn unquote(text: &str, pos: Position) -> Result<String, ParseError> {
    let body = &text[1..text.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escape = chars
            .next()
            .ok_or_else(|| ParseError::new(ParseErrorKind::UnterminatedString, pos))?;
        match escape {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            '0'..='7' => {
                // Three-digit octal escape.
                let mut code = escape.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.next().and_then(|d| d.to_digit(8)) {
                        Some(digit) => code = code * 8 + digit,
                        None => {
                            return Err(ParseError::new(
                                ParseErrorKind::InvalidEscape(escape.to_string()),
                                pos,
                            ))
                        }
                    }
                }
                match char::from_u32(code) {
                    Some(c) => out.push(c),
                    None => {
                        return Err(ParseError::new(
                            ParseErrorKind::InvalidEscape(escape.to_string()),
                            pos,
                        ))
                    }
                }
            }
            'x' | 'u' => {
                let digits = if escape == 'x' { 2 } else { 4 };
                let mut code = 0u32;
                for _ in 0..digits {
                    match chars.next().and_then(|d| d.to_digit(16)) {
                        Some(digit) => code = code * 16 + digit,
                        None => {
                            return Err(ParseError::new(
                                ParseErrorKind::InvalidEscape(escape.to_string()),
                                pos,
                            ))
                        }
                    }
                }
                match char::from_u32(code) {
                    Some(c) => out.push(c),
                    None => {
                        return Err(ParseError::new(
                            ParseErrorKind::InvalidEscape(escape.to_string()),
                            pos,
                        ))
                    }
                }
            }
            other => {
                return Err(ParseError::new(
                    ParseErrorKind::InvalidEscape(other.to_string()),
                    pos,
                ))
            }
        }
    }
    Ok(out)
}

/// Strip comment markers line-wise, then remove the first line's
/// leading-whitespace prefix from every line.
fn clean_comment(text: &str) -> Vec<String> {
    let lines: Vec<&str> = if let Some(body) = text
        .strip_prefix("/*")
        .and_then(|t| t.strip_suffix("*/"))
    {
        body.split('\n').collect()
    } else {
        text.split('\n')
            .map(|line| {
                let line = line.trim_start_matches([' ', '\t']);
                line.strip_prefix("//")
                    .or_else(|| line.strip_prefix('#'))
                    .unwrap_or(line)
            })
            .collect()
    };
    let lines: Vec<&str> = lines
        .into_iter()
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    let prefix: String = lines
        .first()
        .map(|line| {
            line.chars()
                .take_while(|c| *c == ' ' || *c == '\t')
                .collect()
        })
        .unwrap_or_default();
    lines
        .into_iter()
        .map(|line| line.strip_prefix(&prefix).unwrap_or(line).to_string())
        .collect()
}
