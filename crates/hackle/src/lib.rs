//! Parsing, encoding and decoding of HCL from Rust types.
//!
//! The library round-trips a HashiCorp-style configuration dialect through
//! four stages: text → AST → record → AST → text. The AST preserves
//! comments and positions; records are plain structs deriving
//! [`HclRecord`], with field behavior described by `#[hcl(...)]`
//! attributes.
//!
//! # Decoding
//!
//! ```
//! use hackle::HclRecord;
//!
//! #[derive(HclRecord, Debug, PartialEq)]
//! struct Config {
//!     name: String,
//!     #[hcl(name = "listen", optional)]
//!     listen: Vec<String>,
//! }
//!
//! let config: Config = hackle::unmarshal(
//!     "name = \"api\"\nlisten = [\"127.0.0.1:80\"]",
//! ).unwrap();
//! assert_eq!(config.name, "api");
//! assert_eq!(config.listen, vec!["127.0.0.1:80".to_string()]);
//! ```
//!
//! # Encoding
//!
//! ```
//! use hackle::HclRecord;
//!
//! #[derive(HclRecord)]
//! struct Server {
//!     #[hcl(label)]
//!     host: String,
//!     port: i64,
//! }
//!
//! #[derive(HclRecord)]
//! struct Config {
//!     #[hcl(block)]
//!     server: Vec<Server>,
//! }
//!
//! let config = Config {
//!     server: vec![Server { host: "example.com".into(), port: 443 }],
//! };
//! assert_eq!(
//!     hackle::marshal(&config).unwrap(),
//!     "server \"example.com\" {\n  port = 443\n}\n"
//! );
//! ```
//!
//! Field tags: `#[hcl(name = "…")]` renames; `optional` / `omitempty`
//! permit absence; `label` binds block labels (a `Vec<String>` field takes
//! all remaining labels); `block` marks nested records; `remain` captures
//! unclaimed entries as raw [`Entry`] values; `flatten` inlines an
//! embedded record; `skip` hides a field; `pos` receives the enclosing
//! block's [`Position`]. Companion tags: `help = "…"`, `default = "…"`,
//! `enum = "a,b,c"`.

extern crate self as hackle;

mod codec;
mod duration;
mod error;
mod marshal;
mod options;
mod record;
mod schema;
mod unmarshal;
mod value;

pub use duration::{format_duration, parse_duration};
pub use error::{Error, ErrorKind, Result};
pub use marshal::{marshal, marshal_ast, marshal_to_ast, marshal_to_ast_with, marshal_with};
pub use options::Options;
pub use record::{BodyDecoder, BodyEncoder, FieldSchema, HclRecord};
pub use schema::{block_schema, block_schema_with, schema, schema_with};
pub use unmarshal::{
    unmarshal, unmarshal_ast, unmarshal_ast_with, unmarshal_block, unmarshal_block_with,
    unmarshal_with,
};
pub use value::{FromHcl, MarshalContext, ToHcl, UnmarshalContext};

// Engine helpers used by derive-generated code.
pub use record::{decode_record_block, encode_record_block, schema_record_blocks};

/// Derives [`HclRecord`] (plus the [`FromHcl`]/[`ToHcl`] plumbing) for a
/// struct with named fields.
pub use hackle_derive::HclRecord;

// The AST and its operations.
pub use hackle_ast::{
    find, strip_comments, strip_entry_comments, to_json, to_json_object, to_json_pretty, visit,
    Ast, Attribute, Block, BoolValue, CallValue, Children, Comment, Entry, HeredocValue,
    ListValue, MapEntry, MapValue, Node, NodeId, Number, NumberValue, Position, RecursiveEntry,
    StringValue, TypeValue, Value, Visitor,
};
pub use hackle_format::{format_ast, format_ast_with, FormatOptions};
pub use hackle_parse::{ParseError, ParseErrorKind};

// Re-exported for the codec macros.
pub use serde_json;

/// Parse HCL source text.
pub fn parse(source: &str) -> Result<Ast> {
    parse_with(source, &Options::default())
}

/// Parse HCL source text with options (`detached_comments` is the one that
/// applies).
pub fn parse_with(source: &str, options: &Options) -> Result<Ast> {
    let parse_options =
        hackle_parse::ParseOptions::new().detached_comments(options.detached_comments);
    hackle_parse::parse_str_with(source, &parse_options).map_err(Into::into)
}

/// Parse HCL from bytes; the input must be UTF-8.
pub fn parse_bytes(data: &[u8], options: &Options) -> Result<Ast> {
    let parse_options =
        hackle_parse::ParseOptions::new().detached_comments(options.detached_comments);
    hackle_parse::parse_bytes(data, &parse_options).map_err(Into::into)
}

/// Parse HCL from a reader; the input must be UTF-8.
pub fn parse_reader(mut reader: impl std::io::Read, options: &Options) -> Result<Ast> {
    let mut data = Vec::new();
    reader
        .read_to_end(&mut data)
        .map_err(|err| Error::message(format!("read error: {err}")))?;
    parse_bytes(&data, options)
}
