//! Canonical text rendering for hackle ASTs.
//!
//! ```
//! use hackle_ast::{Ast, Attribute, Block, Value};
//!
//! let ast = Ast::from_entries(vec![
//!     Attribute::new("region", Value::str("us-west-2")).into(),
//!     Block::new("server", vec![
//!         Attribute::new("port", Value::number(8080i64)).into(),
//!     ])
//!     .into(),
//! ]);
//! assert_eq!(
//!     hackle_format::format_ast(&ast),
//!     "region = \"us-west-2\"\n\nserver {\n  port = 8080\n}\n"
//! );
//! ```

mod options;
mod printer;
mod scalar;

pub use options::FormatOptions;
pub use printer::Printer;
pub use scalar::{is_ident, quote};

use hackle_ast::{Ast, Attribute, Block, Entry, Value};

/// Render a document in its canonical form.
pub fn format_ast(ast: &Ast) -> String {
    format_ast_with(ast, FormatOptions::default())
}

/// Render a document with custom options.
pub fn format_ast_with(ast: &Ast, options: FormatOptions) -> String {
    let mut printer = Printer::new(options);
    printer.print_ast(ast);
    printer.finish()
}

/// Render a single entry.
pub fn format_entry(entry: &Entry) -> String {
    let mut printer = Printer::new(FormatOptions::default());
    printer.print_entries(std::slice::from_ref(entry), "");
    printer.finish()
}

/// Render a single block.
pub fn format_block(block: &Block) -> String {
    let mut printer = Printer::new(FormatOptions::default());
    printer.print_block(block, "");
    printer.finish()
}

/// Render a single attribute.
pub fn format_attribute(attr: &Attribute) -> String {
    let mut printer = Printer::new(FormatOptions::default());
    printer.print_attribute(attr, "");
    printer.finish()
}

/// Render a single value.
pub fn format_value(value: &Value) -> String {
    let mut printer = Printer::new(FormatOptions::default());
    printer.print_value(value, "");
    printer.finish()
}
