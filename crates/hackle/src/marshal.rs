//! Encoding records as HCL.

use hackle_ast::Ast;

use crate::error::{Error, Result};
use crate::options::Options;
use crate::record::{BodyEncoder, HclRecord};
use crate::value::MarshalContext;

/// Marshal a record to HCL text.
pub fn marshal<T: HclRecord>(value: &T) -> Result<String> {
    marshal_with(value, &Options::default())
}

/// Marshal a record to HCL text, with options.
pub fn marshal_with<T: HclRecord>(value: &T, options: &Options) -> Result<String> {
    let ast = marshal_to_ast_with(value, options)?;
    Ok(hackle_format::format_ast(&ast))
}

/// Marshal a record to an AST.
pub fn marshal_to_ast<T: HclRecord>(value: &T) -> Result<Ast> {
    marshal_to_ast_with(value, &Options::default())
}

/// Marshal a record to an AST, with options.
pub fn marshal_to_ast_with<T: HclRecord>(value: &T, options: &Options) -> Result<Ast> {
    let mut cx = MarshalContext::new(options);
    let mut enc = BodyEncoder::new(&mut cx);
    value.encode_body(&mut enc)?;
    let (labels, entries) = enc.into_parts();
    if !labels.is_empty() {
        return Err(Error::message(format!(
            "unexpected labels {} at top level",
            labels.join(", ")
        )));
    }
    let mut ast = Ast::from_entries(entries);
    ast.schema = options.schema;
    Ok(ast)
}

/// Render an AST in its canonical text form.
pub fn marshal_ast(ast: &Ast) -> String {
    hackle_format::format_ast(ast)
}
