//! Schema reflection: deriving a descriptive AST from a record type alone.

use hackle_ast::{Ast, Block, Entry};

use crate::error::{Error, Result};
use crate::options::Options;
use crate::record::{BodyEncoder, HclRecord};
use crate::value::MarshalContext;

/// Reflect a schema from a record type.
///
/// The schema is itself HCL: attributes carry type keywords and constraint
/// suffixes, blocks mirror nested records, and recursion is marked with
/// `// (recursive)` entries.
pub fn schema<T: HclRecord>() -> Result<Ast> {
    schema_with::<T>(&Options::default())
}

/// Reflect a schema with options (`infer_hcl_tags` is the one that matters).
pub fn schema_with<T: HclRecord>(options: &Options) -> Result<Ast> {
    let mut options = options.clone();
    options.schema = true;
    let mut cx = MarshalContext::new(&options);
    if let Some(id) = T::schema_type_id() {
        cx.visited.push(id);
    }
    let mut enc = BodyEncoder::new(&mut cx);
    T::schema_body(&mut enc)?;
    let (labels, entries) = enc.into_parts();
    if !labels.is_empty() {
        return Err(Error::message(format!(
            "unexpected labels {} at top level",
            labels.join(", ")
        )));
    }
    let mut ast = Ast::from_entries(entries);
    ast.schema = true;
    Ok(ast)
}

/// Reflect a block schema: the record rendered as a single named block.
pub fn block_schema<T: HclRecord>(name: &str) -> Result<Ast> {
    block_schema_with::<T>(name, &Options::default())
}

/// Reflect a block schema with options.
pub fn block_schema_with<T: HclRecord>(name: &str, options: &Options) -> Result<Ast> {
    let mut options = options.clone();
    options.schema = true;
    let mut cx = MarshalContext::new(&options);
    if let Some(id) = T::schema_type_id() {
        cx.visited.push(id);
    }
    let mut enc = BodyEncoder::new(&mut cx);
    T::schema_body(&mut enc)?;
    let (labels, entries) = enc.into_parts();
    let block = Block {
        name: name.to_string(),
        labels,
        body: entries,
        ..Block::default()
    };
    let mut ast = Ast::from_entries(vec![Entry::from(block)]);
    ast.schema = true;
    Ok(ast)
}
