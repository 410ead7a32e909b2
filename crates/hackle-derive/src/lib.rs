//! `#[derive(HclRecord)]`: compile-time field descriptors for the hackle
//! record bridge.
//!
//! For a struct with named fields, the derive materializes one
//! `FieldSchema` per field from its `#[hcl(...)]` attributes and generates
//! the `decode_body` / `encode_body` / `schema_body` drivers that walk the
//! descriptors in declaration order, calling into the engine in the
//! `hackle` crate.
//!
//! Recognized field attributes:
//!
//! ```text
//! #[hcl(name = "...")]                  key in the HCL source
//! #[hcl(optional)] / #[hcl(omitempty)]  absence allowed
//! #[hcl(label)]                         bound from block labels
//! #[hcl(block)]                         nested block(s)
//! #[hcl(remain)]                        captures unclaimed entries
//! #[hcl(flatten)]                       embedded record, fields inlined
//! #[hcl(skip)] or name = "-"            not part of the bridge
//! #[hcl(pos)]                           receives the block's position
//! #[hcl(help = "...")]                  documentation
//! #[hcl(default = "...")]               default tag string
//! #[hcl(enum = "a,b,c")]                enumeration tag string
//! ```

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::spanned::Spanned;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr, Token};

#[proc_macro_derive(HclRecord, attributes(hcl))]
pub fn derive_hcl_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

/// How a field participates in the bridge.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Kind {
    Plain,
    Label,
    Block,
    Remain,
    Flatten,
    Skip,
    Pos,
}

struct FieldSpec {
    ident: syn::Ident,
    ty: syn::Type,
    name: String,
    kind: Kind,
    optional: bool,
    tagged: bool,
    help: String,
    default_value: String,
    enum_values: String,
    /// Index into the generated FIELDS table, for descriptor-carrying kinds.
    index: Option<usize>,
}

/// One `key` or `key = "value"` inside `#[hcl(...)]`. Keys parse with
/// `parse_any` so the `enum` keyword is usable.
struct HclArg {
    key: String,
    value: Option<LitStr>,
    span: Span,
}

struct HclArgs(Vec<HclArg>);

impl Parse for HclArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = Vec::new();
        while !input.is_empty() {
            let ident = syn::Ident::parse_any(input)?;
            let value = if input.peek(Token![=]) {
                input.parse::<Token![=]>()?;
                Some(input.parse::<LitStr>()?)
            } else {
                None
            };
            args.push(HclArg {
                key: ident.unraw().to_string(),
                value,
                span: ident.span(),
            });
            if input.is_empty() {
                break;
            }
            input.parse::<Token![,]>()?;
        }
        Ok(HclArgs(args))
    }
}

fn parse_field(field: &syn::Field) -> syn::Result<FieldSpec> {
    let ident = field
        .ident
        .clone()
        .expect("caller only passes named fields");
    let mut spec = FieldSpec {
        name: ident.unraw().to_string(),
        ident,
        ty: field.ty.clone(),
        kind: Kind::Plain,
        optional: false,
        tagged: false,
        help: String::new(),
        default_value: String::new(),
        enum_values: String::new(),
        index: None,
    };
    let mut kind_set: Option<Span> = None;
    let mut set_kind = |spec: &mut FieldSpec, kind: Kind, span: Span| -> syn::Result<()> {
        if let Some(previous) = kind_set {
            let mut err = syn::Error::new(
                span,
                "at most one of `optional`, `label`, `block`, `remain`, `flatten`, `skip`, `pos` is accepted",
            );
            err.combine(syn::Error::new(previous, "first option here"));
            return Err(err);
        }
        kind_set = Some(span);
        spec.kind = kind;
        Ok(())
    };

    for attr in &field.attrs {
        if !attr.path().is_ident("hcl") {
            continue;
        }
        let args: HclArgs = attr.parse_args()?;
        for arg in args.0 {
            let want_value = matches!(arg.key.as_str(), "name" | "help" | "default" | "enum");
            if want_value != arg.value.is_some() {
                return Err(syn::Error::new(
                    arg.span,
                    if want_value {
                        "this option takes a string value"
                    } else {
                        "this option does not take a value"
                    },
                ));
            }
            match arg.key.as_str() {
                "name" => {
                    spec.name = arg.value.expect("checked").value();
                    spec.tagged = true;
                }
                "help" => spec.help = arg.value.expect("checked").value(),
                "default" => spec.default_value = arg.value.expect("checked").value(),
                "enum" => spec.enum_values = arg.value.expect("checked").value(),
                "optional" | "omitempty" => {
                    spec.optional = true;
                    spec.tagged = true;
                    set_kind(&mut spec, Kind::Plain, arg.span)?;
                }
                "label" => {
                    spec.tagged = true;
                    set_kind(&mut spec, Kind::Label, arg.span)?;
                }
                "block" => {
                    spec.tagged = true;
                    // A block tag implies the field may be absent.
                    spec.optional = true;
                    set_kind(&mut spec, Kind::Block, arg.span)?;
                }
                "remain" => {
                    spec.tagged = true;
                    set_kind(&mut spec, Kind::Remain, arg.span)?;
                }
                "flatten" => set_kind(&mut spec, Kind::Flatten, arg.span)?,
                "skip" => set_kind(&mut spec, Kind::Skip, arg.span)?,
                "pos" => set_kind(&mut spec, Kind::Pos, arg.span)?,
                other => {
                    return Err(syn::Error::new(
                        arg.span,
                        format!("unknown hcl option `{other}`"),
                    ))
                }
            }
        }
    }

    if spec.name == "-" {
        spec.kind = Kind::Skip;
    }
    // A declared default implies the field may be absent; an entirely
    // untagged field is optional too.
    if !spec.default_value.is_empty() || !spec.tagged {
        spec.optional = true;
    }
    Ok(spec)
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new(
            input.generics.span(),
            "HclRecord cannot be derived for generic types",
        ));
    }
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new(
                    input.ident.span(),
                    "HclRecord requires named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new(
                input.ident.span(),
                "HclRecord can only be derived for structs",
            ))
        }
    };

    let mut specs = Vec::new();
    for field in fields {
        specs.push(parse_field(field)?);
    }

    // Assign descriptor-table slots and enforce remainder placement.
    let mut index = 0usize;
    let mut remain_span: Option<Span> = None;
    for spec in &mut specs {
        match spec.kind {
            Kind::Plain | Kind::Label | Kind::Block | Kind::Remain => {
                if let Some(span) = remain_span {
                    let mut err = syn::Error::new(
                        spec.ident.span(),
                        "fields after a `remain` field are unreachable; move `remain` last",
                    );
                    err.combine(syn::Error::new(span, "`remain` declared here"));
                    return Err(err);
                }
                if spec.kind == Kind::Remain {
                    remain_span = Some(spec.ident.span());
                }
                spec.index = Some(index);
                index += 1;
            }
            Kind::Flatten => {
                if let Some(span) = remain_span {
                    let mut err = syn::Error::new(
                        spec.ident.span(),
                        "fields after a `remain` field are unreachable; move `remain` last",
                    );
                    err.combine(syn::Error::new(span, "`remain` declared here"));
                    return Err(err);
                }
            }
            Kind::Skip | Kind::Pos => {}
        }
    }

    let name = &input.ident;
    let schemas: Vec<TokenStream2> = specs
        .iter()
        .filter(|spec| spec.index.is_some())
        .map(|spec| {
            let field_name = &spec.name;
            let optional = spec.optional;
            let label = spec.kind == Kind::Label;
            let block = spec.kind == Kind::Block;
            let remain = spec.kind == Kind::Remain;
            let tagged = spec.tagged;
            let help = &spec.help;
            let default_value = &spec.default_value;
            let enum_values = &spec.enum_values;
            quote! {
                ::hackle::FieldSchema {
                    name: #field_name,
                    optional: #optional,
                    label: #label,
                    block: #block,
                    remain: #remain,
                    tagged: #tagged,
                    help: #help,
                    default_value: #default_value,
                    enum_values: #enum_values,
                }
            }
        })
        .collect();

    let mut record_field_stmts = Vec::new();
    let mut decode_stmts = Vec::new();
    let mut encode_stmts = Vec::new();
    let mut schema_stmts = Vec::new();
    let mut missing_stmts = Vec::new();
    let mut zero_exprs = Vec::new();
    let idents: Vec<&syn::Ident> = specs.iter().map(|spec| &spec.ident).collect();

    for spec in &specs {
        let ident = &spec.ident;
        let ty = &spec.ty;
        let index = spec.index.map(syn::Index::from);
        match spec.kind {
            Kind::Plain | Kind::Block => {
                let index = index.expect("slotted");
                record_field_stmts.push(quote! { out.push(FIELDS[#index]); });
                decode_stmts.push(quote! {
                    let #ident: #ty = dec.field(&FIELDS[#index])?;
                });
                encode_stmts.push(quote! {
                    enc.field(&FIELDS[#index], &self.#ident)?;
                });
                schema_stmts.push(quote! {
                    enc.schema_field::<#ty>(&FIELDS[#index])?;
                });
                missing_stmts.push(quote! {
                    let #ident: #ty = ::hackle::FromHcl::from_missing(cx)?;
                });
                zero_exprs.push(quote! { ::hackle::ToHcl::is_zero(&self.#ident) });
            }
            Kind::Label => {
                let index = index.expect("slotted");
                record_field_stmts.push(quote! { out.push(FIELDS[#index]); });
                decode_stmts.push(quote! {
                    let #ident: #ty = dec.label(&FIELDS[#index])?;
                });
                encode_stmts.push(quote! {
                    enc.label(&FIELDS[#index], &self.#ident)?;
                });
                schema_stmts.push(quote! {
                    enc.schema_label(&FIELDS[#index]);
                });
                missing_stmts.push(quote! {
                    let #ident: #ty = ::hackle::FromHcl::from_missing(cx)?;
                });
                zero_exprs.push(quote! { ::hackle::ToHcl::is_zero(&self.#ident) });
            }
            Kind::Remain => {
                let index = index.expect("slotted");
                record_field_stmts.push(quote! { out.push(FIELDS[#index]); });
                decode_stmts.push(quote! {
                    let #ident: ::std::vec::Vec<::hackle::Entry> = dec.remain()?;
                });
                encode_stmts.push(quote! {
                    enc.remain(&self.#ident)?;
                });
                missing_stmts.push(quote! {
                    let #ident: ::std::vec::Vec<::hackle::Entry> = ::std::vec::Vec::new();
                });
                zero_exprs.push(quote! { self.#ident.is_empty() });
            }
            Kind::Flatten => {
                record_field_stmts.push(quote! {
                    <#ty as ::hackle::HclRecord>::record_fields(out);
                });
                decode_stmts.push(quote! {
                    let #ident: #ty = <#ty as ::hackle::HclRecord>::decode_body(dec)?;
                });
                encode_stmts.push(quote! {
                    ::hackle::HclRecord::encode_body(&self.#ident, enc)?;
                });
                schema_stmts.push(quote! {
                    <#ty as ::hackle::HclRecord>::schema_body(enc)?;
                });
                missing_stmts.push(quote! {
                    let #ident: #ty = ::hackle::FromHcl::from_missing(cx)?;
                });
                zero_exprs.push(quote! { ::hackle::ToHcl::is_zero(&self.#ident) });
            }
            Kind::Skip => {
                decode_stmts.push(quote! {
                    let #ident: #ty = ::std::default::Default::default();
                });
                missing_stmts.push(quote! {
                    let #ident: #ty = ::std::default::Default::default();
                });
            }
            Kind::Pos => {
                decode_stmts.push(quote! {
                    let #ident: #ty = dec.position();
                });
                missing_stmts.push(quote! {
                    let #ident: #ty = ::std::default::Default::default();
                });
            }
        }
    }

    let name_str = name.to_string();
    Ok(quote! {
        const _: () = {
            const FIELDS: &[::hackle::FieldSchema] = &[ #( #schemas ),* ];

            impl ::hackle::HclRecord for #name {
                #[allow(unused_variables)]
                fn record_fields(out: &mut ::std::vec::Vec<::hackle::FieldSchema>) {
                    #( #record_field_stmts )*
                }

                #[allow(unused_variables)]
                fn decode_body(
                    dec: &mut ::hackle::BodyDecoder<'_, '_>,
                ) -> ::hackle::Result<Self> {
                    #( #decode_stmts )*
                    ::hackle::Result::Ok(Self { #( #idents ),* })
                }

                #[allow(unused_variables)]
                fn encode_body(
                    &self,
                    enc: &mut ::hackle::BodyEncoder<'_, '_>,
                ) -> ::hackle::Result<()> {
                    #( #encode_stmts )*
                    ::hackle::Result::Ok(())
                }

                #[allow(unused_variables)]
                fn schema_body(
                    enc: &mut ::hackle::BodyEncoder<'_, '_>,
                ) -> ::hackle::Result<()> {
                    #( #schema_stmts )*
                    ::hackle::Result::Ok(())
                }

                fn schema_type_id() -> ::std::option::Option<::std::any::TypeId> {
                    ::std::option::Option::Some(::std::any::TypeId::of::<Self>())
                }
            }

            impl ::hackle::FromHcl for #name {
                const IS_RECORD: bool = true;

                fn from_value(
                    value: &::hackle::Value,
                    _cx: &::hackle::UnmarshalContext,
                ) -> ::hackle::Result<Self> {
                    ::hackle::Result::Err(
                        ::hackle::Error::message(::std::format!(
                            "expected a block for {} but got {}",
                            #name_str,
                            value,
                        ))
                        .with_pos(value.pos()),
                    )
                }

                fn from_block(
                    block: &::hackle::Block,
                    cx: &::hackle::UnmarshalContext,
                ) -> ::hackle::Result<Self> {
                    ::hackle::decode_record_block::<Self>(block, cx)
                }

                fn from_missing(cx: &::hackle::UnmarshalContext) -> ::hackle::Result<Self> {
                    let _ = cx;
                    #( #missing_stmts )*
                    ::hackle::Result::Ok(Self { #( #idents ),* })
                }
            }

            impl ::hackle::ToHcl for #name {
                fn to_value(
                    &self,
                    _cx: &::hackle::MarshalContext,
                ) -> ::hackle::Result<::hackle::Value> {
                    ::hackle::Result::Err(::hackle::Error::message(::std::concat!(
                        "struct ",
                        #name_str,
                        " used as attribute, is it missing a `block` option?",
                    )))
                }

                fn is_zero(&self) -> bool {
                    true #( && #zero_exprs )*
                }

                fn schema_value(
                    _cx: &::hackle::MarshalContext,
                ) -> ::hackle::Result<::hackle::Value> {
                    ::hackle::Result::Err(::hackle::Error::message(::std::concat!(
                        "struct ",
                        #name_str,
                        " used as attribute, is it missing a `block` option?",
                    )))
                }

                fn to_blocks(
                    &self,
                    field: &::hackle::FieldSchema,
                    cx: &mut ::hackle::MarshalContext,
                    out: &mut ::std::vec::Vec<::hackle::Entry>,
                ) -> ::hackle::Result<()> {
                    ::hackle::encode_record_block(self, field, cx, out)
                }

                fn schema_blocks(
                    field: &::hackle::FieldSchema,
                    repeated: bool,
                    cx: &mut ::hackle::MarshalContext,
                    out: &mut ::std::vec::Vec<::hackle::Entry>,
                ) -> ::hackle::Result<()> {
                    ::hackle::schema_record_blocks::<Self>(field, repeated, cx, out)
                }
            }
        };
    })
}
