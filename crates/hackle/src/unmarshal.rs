//! Decoding HCL into records.

use hackle_ast::{Ast, Block};
use tracing::debug;

use crate::error::Result;
use crate::options::Options;
use crate::record::{decode_record_block, BodyDecoder, HclRecord};
use crate::value::UnmarshalContext;

/// Unmarshal HCL source text into a record.
pub fn unmarshal<T: HclRecord>(source: &str) -> Result<T> {
    unmarshal_with(source, &Options::default())
}

/// Unmarshal HCL source text into a record, with options.
pub fn unmarshal_with<T: HclRecord>(source: &str, options: &Options) -> Result<T> {
    let ast = crate::parse_with(source, options)?;
    unmarshal_ast_with(&ast, options)
}

/// Unmarshal an already parsed or constructed AST into a record.
pub fn unmarshal_ast<T: HclRecord>(ast: &Ast) -> Result<T> {
    unmarshal_ast_with(ast, &Options::default())
}

/// Unmarshal an AST into a record, with options.
pub fn unmarshal_ast_with<T: HclRecord>(ast: &Ast, options: &Options) -> Result<T> {
    debug!(entries = ast.entries.len(), "unmarshal ast");
    let cx = UnmarshalContext { options };
    let mut dec = BodyDecoder::for_entries(&ast.entries, cx)?;
    let record = T::decode_body(&mut dec)?;
    dec.finish()?;
    Ok(record)
}

/// Unmarshal a single block into a record.
pub fn unmarshal_block<T: HclRecord>(block: &Block) -> Result<T> {
    unmarshal_block_with(block, &Options::default())
}

/// Unmarshal a single block into a record, with options.
pub fn unmarshal_block_with<T: HclRecord>(block: &Block, options: &Options) -> Result<T> {
    debug!(name = %block.name, "unmarshal block");
    let cx = UnmarshalContext { options };
    decode_record_block(block, &cx)
}
