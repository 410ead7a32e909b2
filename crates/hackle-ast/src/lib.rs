//! AST for the HCL configuration language.
//!
//! This crate holds the node types shared by the parser, printer, and the
//! record bridge: a position- and comment-preserving tree of entries
//! ([`Attribute`], [`Block`], [`Comment`]) and values, plus the traversal
//! substrate ([`visit`], [`find`], [`strip_comments`]) and two JSON
//! projections.
//!
//! Trees come from the parser or are built by hand:
//!
//! ```
//! use hackle_ast::{Ast, Attribute, Block, Value};
//!
//! let mut ast = Ast::from_entries(vec![
//!     Attribute::new("region", Value::str("us-west-2")).into(),
//!     Block::new("server", vec![
//!         Attribute::new("port", Value::number(8080i64)).into(),
//!     ])
//!     .with_labels(["api"])
//!     .into(),
//! ]);
//! ast.add_parent_refs();
//!
//! let id = ast.entries[0].id();
//! assert_eq!(ast.parent_of(id), Some(ast.id));
//! assert!(ast.detach(id));
//! assert_eq!(ast.entries.len(), 1);
//! ```

mod json;
mod node;
mod strip;
mod visit;

pub use json::{to_json, to_json_object, to_json_pretty};
pub use node::{
    Ast, Attribute, Block, BoolValue, CallValue, Comment, Entry, HeredocValue, ListValue,
    MapEntry, MapValue, NodeId, Number, NumberValue, Position, RecursiveEntry, StringValue,
    TypeValue, Value,
};
pub use strip::{strip_comments, strip_entry_comments};
pub use visit::{find, visit, Children, Node, Visitor};
