//! Parser for the HCL configuration language.
//!
//! ```
//! let ast = hackle_parse::parse_str("region = \"us-west-2\"\nserver \"api\" {}").unwrap();
//! assert_eq!(ast.entries.len(), 2);
//! assert_eq!(ast.entries[1].key(), "server");
//! ```

mod error;
mod lexer;
mod parser;
mod post;
mod token;
mod tokenizer;

pub use error::{ParseError, ParseErrorKind};
pub use token::{Span, Token, TokenKind};
pub use tokenizer::Tokenizer;

use hackle_ast::Ast;

/// Options controlling the parse.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Keep comments that are not adjacent to any entry as standalone
    /// [`hackle_ast::Comment`] entries instead of stripping them.
    pub detached_comments: bool,
}

impl ParseOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Preserve detached comments as standalone entries.
    pub fn detached_comments(mut self, keep: bool) -> Self {
        self.detached_comments = keep;
        self
    }
}

/// Parse HCL source text.
pub fn parse_str(source: &str) -> Result<Ast, ParseError> {
    parser::parse(source, &ParseOptions::default())
}

/// Parse HCL source text with options.
pub fn parse_str_with(source: &str, options: &ParseOptions) -> Result<Ast, ParseError> {
    parser::parse(source, options)
}

/// Parse HCL from bytes; the input must be UTF-8.
pub fn parse_bytes(data: &[u8], options: &ParseOptions) -> Result<Ast, ParseError> {
    let source = std::str::from_utf8(data).map_err(|_| {
        ParseError::new(
            ParseErrorKind::Unexpected {
                got: "invalid UTF-8".to_string(),
                expected: "UTF-8 text",
            },
            hackle_ast::Position::default(),
        )
    })?;
    parser::parse(source, options)
}
