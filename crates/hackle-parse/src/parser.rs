//! Recursive-descent parser producing a [`hackle_ast::Ast`].

use hackle_ast::{
    Ast, Attribute, Block, CallValue, Comment, Entry, HeredocValue, MapEntry, NodeId, Number,
    Position, Value,
};
use tracing::trace;

use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{lex, LexedToken};
use crate::post;
use crate::token::TokenKind;
use crate::ParseOptions;

/// Parse source text into an AST.
pub fn parse(source: &str, options: &ParseOptions) -> Result<Ast, ParseError> {
    trace!(len = source.len(), "parse");
    let tokens = lex(source)?;
    let mut parser = Parser { tokens, index: 0 };
    let mut ast = parser.parse_ast()?;
    post::process(&mut ast, options);
    ast.add_parent_refs();
    Ok(ast)
}

struct Parser {
    tokens: Vec<LexedToken>,
    index: usize,
}

impl Parser {
    fn peek(&self) -> Option<&LexedToken> {
        self.tokens.get(self.index)
    }

    fn peek_at(&self, offset: usize) -> Option<&LexedToken> {
        self.tokens.get(self.index + offset)
    }

    fn next(&mut self) -> Option<LexedToken> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn pos(&self) -> Position {
        self.peek().map(|t| t.pos).unwrap_or_else(|| {
            self.tokens
                .last()
                .map(|t| t.end_pos)
                .unwrap_or_default()
        })
    }

    fn at_punct(&self, c: char) -> bool {
        self.peek().is_some_and(|t| t.punct() == Some(c))
    }

    fn punct_at(&self, offset: usize, c: char) -> bool {
        self.peek_at(offset).is_some_and(|t| t.punct() == Some(c))
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.at_punct(c) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, c: char, context: &'static str) -> Result<LexedToken, ParseError> {
        if self.at_punct(c) {
            Ok(self.next().expect("peeked"))
        } else {
            Err(self.unexpected(context))
        }
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::new(
                ParseErrorKind::Unexpected {
                    got: format!("{:?}", token.value),
                    expected,
                },
                token.pos,
            ),
            None => ParseError::new(ParseErrorKind::UnexpectedEof(expected), self.pos()),
        }
    }

    fn parse_ast(&mut self) -> Result<Ast, ParseError> {
        let pos = self.pos();
        let entries = self.parse_entries(false)?;
        if let Some(token) = self.peek() {
            return Err(ParseError::new(
                ParseErrorKind::Unexpected {
                    got: format!("{:?}", token.value),
                    expected: "an attribute or block",
                },
                token.pos,
            ));
        }
        let mut ast = Ast::from_entries(entries);
        ast.pos = pos;
        Ok(ast)
    }

    /// Parse entries until end of input or, inside a block, the closing
    /// brace (which is left for the caller).
    fn parse_entries(&mut self, in_block: bool) -> Result<Vec<Entry>, ParseError> {
        let mut entries = Vec::new();
        loop {
            match self.peek() {
                None => break,
                Some(token) if in_block && token.punct() == Some('}') => break,
                Some(token) => match token.kind {
                    TokenKind::Comment => {
                        let token = self.next().expect("peeked");
                        entries.push(
                            Comment {
                                pos: token.pos,
                                end_pos: token.end_pos,
                                comments: token.value.split('\n').map(String::from).collect(),
                                ..Comment::default()
                            }
                            .into(),
                        );
                    }
                    TokenKind::Ident => entries.push(self.parse_entry()?),
                    _ => return Err(self.unexpected("an attribute or block")),
                },
            }
        }
        Ok(entries)
    }

    /// Parse one attribute or block. The leading identifier has been peeked
    /// but not consumed.
    fn parse_entry(&mut self) -> Result<Entry, ParseError> {
        if self.looks_like_block() {
            self.parse_block().map(Entry::from)
        } else {
            self.parse_attribute().map(Entry::from)
        }
    }

    /// Decide between block and attribute at an identifier: a block is the
    /// name, an optional `(repeated)` marker, any run of label tokens, and
    /// then an opening brace.
    fn looks_like_block(&self) -> bool {
        let mut offset = 1;
        if self.punct_at(1, '(') {
            return self.peek_at(2).is_some_and(|t| t.value == "repeated")
                && self.punct_at(3, ')');
        }
        loop {
            match self.peek_at(offset) {
                Some(token) if token.punct() == Some('{') => return true,
                Some(token) if matches!(token.kind, TokenKind::Ident | TokenKind::Str) => {
                    offset += 1;
                }
                _ => return false,
            }
        }
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let name_token = self.next().expect("caller checked for an identifier");
        let mut block = Block {
            pos: name_token.pos,
            name: name_token.value,
            ..Block::default()
        };
        if self.at_punct('(') {
            self.next();
            match self.peek() {
                Some(token) if token.value == "repeated" => {
                    self.next();
                }
                _ => return Err(self.unexpected("\"repeated\"")),
            }
            self.expect_punct(')', "\")\"")?;
            block.repeated = true;
        }
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Ident | TokenKind::Str => {
                    let token = self.next().expect("peeked");
                    block.labels.push(token.value);
                }
                _ => break,
            }
        }
        self.expect_punct('{', "\"{\"")?;
        block.body = self.parse_entries(true)?;
        self.expect_punct('}', "\"}\"")?;
        Ok(block)
    }

    fn parse_attribute(&mut self) -> Result<Attribute, ParseError> {
        let key_token = self.next().expect("caller checked for an identifier");
        let mut attr = Attribute {
            pos: key_token.pos,
            key: key_token.value,
            ..Attribute::default()
        };
        if self.eat_punct('=') {
            attr.value = Some(self.parse_value()?);
        }
        if self.at_punct('(') {
            self.parse_schema_suffix(&mut attr)?;
        }
        Ok(attr)
    }

    /// `'(' ( 'optional' | 'default' '(' value ')' | 'enum' '(' value… ')' )+ ')'`
    ///
    /// The call-shaped pieces parse as [`CallValue`]s and fold into the
    /// attribute's schema metadata.
    fn parse_schema_suffix(&mut self, attr: &mut Attribute) -> Result<(), ParseError> {
        self.expect_punct('(', "\"(\"")?;
        loop {
            match self.peek() {
                Some(token) if token.kind == TokenKind::Ident => {
                    let token = self.next().expect("peeked");
                    match token.value.as_str() {
                        "optional" => attr.optional = true,
                        "default" => {
                            let call = self.parse_call_args(token.pos)?;
                            attr.default = call.args.into_iter().next();
                        }
                        "enum" => {
                            let call = self.parse_call_args(token.pos)?;
                            attr.enum_values = call.args;
                        }
                        _ => {
                            return Err(ParseError::new(
                                ParseErrorKind::Unexpected {
                                    got: format!("{:?}", token.value),
                                    expected: "\"optional\", \"default\" or \"enum\"",
                                },
                                token.pos,
                            ))
                        }
                    }
                }
                Some(token) if token.punct() == Some(')') => {
                    self.next();
                    return Ok(());
                }
                _ => return Err(self.unexpected("a constraint or \")\"")),
            }
        }
    }

    fn parse_call_args(&mut self, pos: Position) -> Result<CallValue, ParseError> {
        self.expect_punct('(', "\"(\"")?;
        let mut call = CallValue {
            pos,
            ..CallValue::default()
        };
        if !self.at_punct(')') {
            loop {
                call.args.push(self.parse_value()?);
                if !self.eat_punct(',') {
                    break;
                }
            }
        }
        self.expect_punct(')', "\")\"")?;
        Ok(call)
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        let token = match self.peek() {
            Some(token) => token.clone(),
            None => return Err(self.unexpected("a value")),
        };
        match token.kind {
            TokenKind::Ident => {
                self.next();
                let mut value = match token.value.as_str() {
                    "true" => Value::bool(true),
                    "false" => Value::bool(false),
                    "string" | "number" | "boolean" => Value::type_keyword(token.value.clone()),
                    // A bare identifier reads as a string.
                    _ => Value::str(token.value.clone()),
                };
                set_pos(&mut value, token.pos);
                Ok(value)
            }
            TokenKind::Str => {
                self.next();
                let mut value = Value::str(token.value);
                set_pos(&mut value, token.pos);
                Ok(value)
            }
            TokenKind::Number => {
                self.next();
                let number = parse_number(&token.value)
                    .ok_or_else(|| ParseError::new(
                        ParseErrorKind::InvalidNumber(token.value.clone()),
                        token.pos,
                    ))?;
                let mut value = Value::number(number);
                set_pos(&mut value, token.pos);
                Ok(value)
            }
            TokenKind::Heredoc => {
                self.next();
                self.parse_heredoc(token)
            }
            TokenKind::Punct if token.punct() == Some('[') => self.parse_list(),
            TokenKind::Punct if token.punct() == Some('{') => self.parse_map(),
            _ => Err(self.unexpected("a value")),
        }
    }

    /// Assemble a heredoc from its opener plus the body tokens that follow.
    fn parse_heredoc(&mut self, opener: LexedToken) -> Result<Value, ParseError> {
        let mut doc = String::new();
        loop {
            match self.peek().map(|t| t.kind) {
                Some(TokenKind::Eol) => {
                    doc.push('\n');
                    self.next();
                }
                Some(TokenKind::Body) => {
                    let token = self.next().expect("peeked");
                    doc.push_str(&token.value);
                }
                Some(TokenKind::End) => {
                    self.next();
                    break;
                }
                _ => {
                    return Err(ParseError::new(
                        ParseErrorKind::UnterminatedHeredoc,
                        opener.pos,
                    ))
                }
            }
        }
        Ok(Value::Heredoc(HeredocValue {
            pos: opener.pos,
            delimiter: opener.value,
            doc,
            ..HeredocValue::default()
        }))
    }

    fn parse_list(&mut self) -> Result<Value, ParseError> {
        let open = self.expect_punct('[', "\"[\"")?;
        let mut elements = Vec::new();
        while !self.at_punct(']') {
            elements.push(self.parse_value()?);
            if !self.eat_punct(',') {
                break;
            }
        }
        self.expect_punct(']', "\"]\"")?;
        let mut value = Value::list(elements);
        set_pos(&mut value, open.pos);
        Ok(value)
    }

    fn parse_map(&mut self) -> Result<Value, ParseError> {
        let open = self.expect_punct('{', "\"{\"")?;
        let mut entries = Vec::new();
        loop {
            // Comments inside a map attach to the entry that follows; any
            // left before the closing brace have nothing to attach to.
            let mut comments = Vec::new();
            while self.peek().is_some_and(|t| t.kind == TokenKind::Comment) {
                let token = self.next().expect("peeked");
                comments.extend(token.value.split('\n').map(String::from));
            }
            if self.at_punct('}') {
                break;
            }
            let pos = self.pos();
            let key = self.parse_value()?;
            self.expect_punct(':', "\":\"")?;
            let value = self.parse_value()?;
            entries.push(MapEntry {
                id: NodeId::UNSET,
                pos,
                key,
                value,
                comments,
            });
            if !self.eat_punct(',') {
                break;
            }
        }
        self.expect_punct('}', "\"}\"")?;
        let mut value = Value::map(entries);
        set_pos(&mut value, open.pos);
        Ok(value)
    }
}

fn set_pos(value: &mut Value, pos: Position) {
    match value {
        Value::Bool(v) => v.pos = pos,
        Value::Number(v) => v.pos = pos,
        Value::Str(v) => v.pos = pos,
        Value::Heredoc(v) => v.pos = pos,
        Value::List(v) => v.pos = pos,
        Value::Map(v) => v.pos = pos,
        Value::Type(v) => v.pos = pos,
        Value::Call(v) => v.pos = pos,
    }
}

/// Parse a numeric lexeme. A leading zero followed by digits is octal;
/// anything with a point or exponent is a float; integers fall back to
/// unsigned then float on overflow.
fn parse_number(text: &str) -> Option<Number> {
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1i64, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let is_float = digits.contains(['.', 'e', 'E']);
    if !is_float && digits.len() > 1 && digits.starts_with('0') {
        let value = i64::from_str_radix(digits, 8).ok()?;
        return Some(Number::Int(sign * value));
    }
    if !is_float {
        if let Ok(value) = digits.parse::<i64>() {
            return Some(Number::Int(sign * value));
        }
        if sign > 0 {
            if let Ok(value) = digits.parse::<u64>() {
                return Some(Number::Uint(value));
            }
        }
    }
    text.parse::<f64>().ok().map(Number::Float)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("0"), Some(Number::Int(0)));
        assert_eq!(parse_number("123"), Some(Number::Int(123)));
        assert_eq!(parse_number("-1"), Some(Number::Int(-1)));
        assert_eq!(parse_number("0700"), Some(Number::Int(0o700)));
        assert_eq!(parse_number("-0700"), Some(Number::Int(-0o700)));
        assert_eq!(parse_number("1.234"), Some(Number::Float(1.234)));
        assert_eq!(parse_number("-1.234"), Some(Number::Float(-1.234)));
        assert_eq!(parse_number("1e3"), Some(Number::Float(1000.0)));
        assert_eq!(parse_number("18446744073709551615"), Some(Number::Uint(u64::MAX)));
        assert_eq!(parse_number("0800"), None);
    }
}
