//! Conversions between AST values and Rust field types.
//!
//! [`FromHcl`] and [`ToHcl`] are the two halves of the record bridge: every
//! supported field type knows how to decode itself from a [`Value`] (or a
//! [`Block`], for records), how to render itself back, what its schema
//! descriptor is, and how to parse default/enum tag strings written for it.
//! Record impls are generated by `#[derive(HclRecord)]`.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::Duration;

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use hackle_ast::{Block, Entry, MapEntry, Number, Value};

use crate::duration::{format_duration, parse_duration};
use crate::error::{Error, ErrorKind, Result};
use crate::options::Options;
use crate::record::FieldSchema;

/// Context threaded through unmarshalling.
#[derive(Debug, Clone, Copy)]
pub struct UnmarshalContext<'o> {
    pub options: &'o Options,
}

/// Context threaded through marshalling and schema reflection.
#[derive(Debug)]
pub struct MarshalContext<'o> {
    pub options: &'o Options,
    /// Record types on the current schema descent path, for cycle marking.
    pub(crate) visited: Vec<std::any::TypeId>,
}

impl<'o> MarshalContext<'o> {
    pub fn new(options: &'o Options) -> Self {
        Self {
            options,
            visited: Vec::new(),
        }
    }

    /// Whether we are reflecting a schema rather than marshalling values.
    pub fn schema(&self) -> bool {
        self.options.schema
    }
}

fn type_mismatch(expected: &str, value: &Value) -> Error {
    Error::new(ErrorKind::TypeMismatch(format!(
        "expected {expected} but got {value}"
    )))
    .with_pos(value.pos())
}

/// Decoding half of the record bridge.
pub trait FromHcl: Sized {
    /// After unwrapping `Option`/`Box`: is this a record (block target)?
    const IS_RECORD: bool = false;
    /// After unwrapping `Option`/`Box`: a sequence of records?
    const IS_RECORD_SEQ: bool = false;

    /// Decode from an attribute value.
    fn from_value(value: &Value, cx: &UnmarshalContext) -> Result<Self>;

    /// Decode from a bare attribute (`attr` with no `=`). Only booleans
    /// accept this, and only under the bare-attribute policy.
    fn from_bare(cx: &UnmarshalContext) -> Result<Self> {
        let _ = cx;
        Err(Error::new(ErrorKind::ValueDecode(
            "expected = after attribute".to_string(),
        )))
    }

    /// The value a missing optional field takes.
    fn from_missing(cx: &UnmarshalContext) -> Result<Self>;

    /// Decode from a block. Only records (and pointers to them) accept this.
    fn from_block(block: &Block, cx: &UnmarshalContext) -> Result<Self> {
        let _ = cx;
        Err(Error::new(ErrorKind::TypeMismatch(format!(
            "unexpected block {:?}",
            block.name
        )))
        .with_pos(block.pos))
    }

    /// Decode from repeated blocks. Only sequences of records accept this.
    fn from_blocks(blocks: Vec<&Block>, cx: &UnmarshalContext) -> Result<Self> {
        let _ = cx;
        let pos = blocks.first().map(|b| b.pos).unwrap_or_default();
        Err(Error::new(ErrorKind::TypeMismatch(
            "unexpected repeated blocks".to_string(),
        ))
        .with_pos(pos))
    }

    /// Decode from a single block label.
    fn from_label(label: &str, cx: &UnmarshalContext) -> Result<Self> {
        Self::from_value(&Value::str(label), cx)
    }

    /// Consume labels for a label field: one by default; sequences drain
    /// everything that remains.
    fn from_labels(
        labels: &mut VecDeque<String>,
        field_name: &str,
        cx: &UnmarshalContext,
    ) -> Result<Self> {
        match labels.pop_front() {
            Some(label) => Self::from_label(&label, cx),
            None => Err(Error::new(ErrorKind::MissingLabel(field_name.to_string()))),
        }
    }

    /// Parse a `default`/`enum` tag string into a [`Value`] according to
    /// this type's shape.
    fn parse_tag_value(raw: &str) -> Result<Value> {
        let _ = raw;
        Err(Error::new(ErrorKind::DefaultParse(
            "only primitive types, maps and lists can have tag values".to_string(),
        )))
    }

    /// Whether this type is a container for tag-string purposes (containers
    /// cannot nest inside tag strings, and cannot carry enums).
    fn tag_container() -> bool {
        false
    }
}

/// Encoding half of the record bridge.
pub trait ToHcl {
    /// Render as an attribute value.
    fn to_value(&self, cx: &MarshalContext) -> Result<Value>;

    /// Whether this is the type's zero value, for optional-field omission.
    fn is_zero(&self) -> bool;

    /// Whether the value is absent entirely (an empty `Option`). Absent
    /// attributes are dropped from marshalled output without being
    /// rendered.
    fn is_absent(&self) -> bool {
        false
    }

    /// The type-descriptor value used in attribute position by schemas.
    fn schema_value(cx: &MarshalContext) -> Result<Value>
    where
        Self: Sized,
    {
        let _ = cx;
        Err(Error::message(
            "unsupported attribute type during schema reflection",
        ))
    }

    /// Render as block labels.
    fn to_labels(&self) -> Result<Vec<String>> {
        Err(Error::message(
            "label field must be a string or a list of strings",
        ))
    }

    /// Append the block entries this value contributes. Only records and
    /// sequences/pointers of records accept this.
    fn to_blocks(
        &self,
        field: &FieldSchema,
        cx: &mut MarshalContext,
        out: &mut Vec<Entry>,
    ) -> Result<()> {
        let _ = (cx, out);
        Err(Error::new(ErrorKind::TypeMismatch(format!(
            "field {:?} is not a block type",
            field.name
        ))))
    }

    /// Append the schema block(s) for this type.
    fn schema_blocks(
        field: &FieldSchema,
        repeated: bool,
        cx: &mut MarshalContext,
        out: &mut Vec<Entry>,
    ) -> Result<()>
    where
        Self: Sized,
    {
        let _ = (repeated, cx, out);
        Err(Error::new(ErrorKind::TypeMismatch(format!(
            "field {:?} is not a block type",
            field.name
        ))))
    }
}

// ---------------------------------------------------------------------------
// Strings

impl FromHcl for String {
    fn from_value(value: &Value, _cx: &UnmarshalContext) -> Result<Self> {
        value
            .as_text()
            .ok_or_else(|| type_mismatch("a type or string", value))
    }

    fn from_missing(_cx: &UnmarshalContext) -> Result<Self> {
        Ok(String::new())
    }

    fn from_label(label: &str, _cx: &UnmarshalContext) -> Result<Self> {
        Ok(label.to_string())
    }

    fn parse_tag_value(raw: &str) -> Result<Value> {
        Ok(Value::str(raw))
    }
}

impl ToHcl for String {
    fn to_value(&self, cx: &MarshalContext) -> Result<Value> {
        let threshold = cx.options.heredocs_for_multiline;
        if threshold > 0 && self.matches('\n').count() >= threshold {
            Ok(Value::heredoc("-EOF", self))
        } else {
            Ok(Value::str(self.clone()))
        }
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn schema_value(_cx: &MarshalContext) -> Result<Value> {
        Ok(Value::type_keyword("string"))
    }

    fn to_labels(&self) -> Result<Vec<String>> {
        Ok(vec![self.clone()])
    }
}

// ---------------------------------------------------------------------------
// Integers and floats

fn parse_int_auto(raw: &str) -> Option<i64> {
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let value = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else if let Some(oct) = digits.strip_prefix("0o").or_else(|| digits.strip_prefix("0O")) {
        i64::from_str_radix(oct, 8).ok()?
    } else if let Some(bin) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
        i64::from_str_radix(bin, 2).ok()?
    } else if digits.len() > 1 && digits.starts_with('0') {
        i64::from_str_radix(digits, 8).ok()?
    } else {
        digits.parse::<i64>().ok()?
    };
    Some(if negative { -value } else { value })
}

fn parse_uint_auto(raw: &str) -> Option<u64> {
    let digits = raw.strip_prefix('+').unwrap_or(raw);
    if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else if let Some(oct) = digits.strip_prefix("0o").or_else(|| digits.strip_prefix("0O")) {
        u64::from_str_radix(oct, 8).ok()
    } else if let Some(bin) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
        u64::from_str_radix(bin, 2).ok()
    } else if digits.len() > 1 && digits.starts_with('0') {
        u64::from_str_radix(digits, 8).ok()
    } else {
        digits.parse::<u64>().ok()
    }
}

macro_rules! signed_int_hcl {
    ($($ty:ty),*) => {$(
        impl FromHcl for $ty {
            fn from_value(value: &Value, _cx: &UnmarshalContext) -> Result<Self> {
                let number = value
                    .as_number()
                    .ok_or_else(|| type_mismatch("a number", value))?;
                let truncated = number.as_i64();
                <$ty>::try_from(truncated).map_err(|_| {
                    Error::new(ErrorKind::ValueDecode(format!(
                        "value {truncated} out of range"
                    )))
                    .with_pos(value.pos())
                })
            }

            fn from_missing(_cx: &UnmarshalContext) -> Result<Self> {
                Ok(0)
            }

            fn parse_tag_value(raw: &str) -> Result<Value> {
                let value = parse_int_auto(raw).ok_or_else(|| {
                    Error::new(ErrorKind::DefaultParse(format!(
                        "error converting {raw:?} to int"
                    )))
                })?;
                Ok(Value::number(Number::Int(value)))
            }
        }

        impl ToHcl for $ty {
            fn to_value(&self, _cx: &MarshalContext) -> Result<Value> {
                Ok(Value::number(Number::Int(*self as i64)))
            }

            fn is_zero(&self) -> bool {
                *self == 0
            }

            fn schema_value(_cx: &MarshalContext) -> Result<Value> {
                Ok(Value::type_keyword("number"))
            }
        }
    )*};
}

signed_int_hcl!(i8, i16, i32, i64, isize);

macro_rules! unsigned_int_hcl {
    ($($ty:ty),*) => {$(
        impl FromHcl for $ty {
            fn from_value(value: &Value, _cx: &UnmarshalContext) -> Result<Self> {
                let number = value
                    .as_number()
                    .ok_or_else(|| type_mismatch("a number", value))?;
                let truncated = number.as_u64();
                <$ty>::try_from(truncated).map_err(|_| {
                    Error::new(ErrorKind::ValueDecode(format!(
                        "value {truncated} out of range"
                    )))
                    .with_pos(value.pos())
                })
            }

            fn from_missing(_cx: &UnmarshalContext) -> Result<Self> {
                Ok(0)
            }

            fn parse_tag_value(raw: &str) -> Result<Value> {
                let value = parse_uint_auto(raw).ok_or_else(|| {
                    Error::new(ErrorKind::DefaultParse(format!(
                        "error converting {raw:?} to uint"
                    )))
                })?;
                Ok(Value::number(Number::from(value)))
            }
        }

        impl ToHcl for $ty {
            fn to_value(&self, _cx: &MarshalContext) -> Result<Value> {
                Ok(Value::number(Number::from(*self as u64)))
            }

            fn is_zero(&self) -> bool {
                *self == 0
            }

            fn schema_value(_cx: &MarshalContext) -> Result<Value> {
                Ok(Value::type_keyword("number"))
            }
        }
    )*};
}

unsigned_int_hcl!(u8, u16, u32, u64, usize);

macro_rules! float_hcl {
    ($($ty:ty),*) => {$(
        impl FromHcl for $ty {
            fn from_value(value: &Value, _cx: &UnmarshalContext) -> Result<Self> {
                let number = value
                    .as_number()
                    .ok_or_else(|| type_mismatch("a number", value))?;
                Ok(number.as_f64() as $ty)
            }

            fn from_missing(_cx: &UnmarshalContext) -> Result<Self> {
                Ok(0.0)
            }

            fn parse_tag_value(raw: &str) -> Result<Value> {
                let value: f64 = raw.parse().map_err(|_| {
                    Error::new(ErrorKind::DefaultParse(format!(
                        "error converting {raw:?} to float"
                    )))
                })?;
                Ok(Value::number(Number::Float(value)))
            }
        }

        impl ToHcl for $ty {
            fn to_value(&self, _cx: &MarshalContext) -> Result<Value> {
                Ok(Value::number(Number::Float(*self as f64)))
            }

            fn is_zero(&self) -> bool {
                *self == 0.0
            }

            fn schema_value(_cx: &MarshalContext) -> Result<Value> {
                Ok(Value::type_keyword("number"))
            }
        }
    )*};
}

float_hcl!(f32, f64);

// ---------------------------------------------------------------------------
// Booleans

impl FromHcl for bool {
    fn from_value(value: &Value, _cx: &UnmarshalContext) -> Result<Self> {
        value
            .as_bool()
            .ok_or_else(|| type_mismatch("a bool", value))
    }

    fn from_bare(cx: &UnmarshalContext) -> Result<Self> {
        if cx.options.bare_boolean_attributes {
            Ok(true)
        } else {
            Err(Error::new(ErrorKind::ValueDecode(
                "expected = after attribute".to_string(),
            )))
        }
    }

    fn from_missing(_cx: &UnmarshalContext) -> Result<Self> {
        Ok(false)
    }

    fn parse_tag_value(raw: &str) -> Result<Value> {
        if raw.eq_ignore_ascii_case("true") {
            Ok(Value::bool(true))
        } else if raw.eq_ignore_ascii_case("false") {
            Ok(Value::bool(false))
        } else {
            Err(Error::new(ErrorKind::DefaultParse(format!(
                "error converting {raw:?} to bool"
            ))))
        }
    }
}

impl ToHcl for bool {
    fn to_value(&self, _cx: &MarshalContext) -> Result<Value> {
        Ok(Value::bool(*self))
    }

    fn is_zero(&self) -> bool {
        !*self
    }

    fn schema_value(_cx: &MarshalContext) -> Result<Value> {
        Ok(Value::type_keyword("boolean"))
    }
}

// ---------------------------------------------------------------------------
// Sequences

impl<T: FromHcl> FromHcl for Vec<T> {
    const IS_RECORD_SEQ: bool = T::IS_RECORD;

    fn from_value(value: &Value, cx: &UnmarshalContext) -> Result<Self> {
        let elements = value
            .as_list()
            .ok_or_else(|| type_mismatch("a list", value))?;
        elements
            .iter()
            .map(|element| {
                T::from_value(element, cx)
                    .map_err(|err| err.context("invalid list element").with_pos(element.pos()))
            })
            .collect()
    }

    fn from_missing(_cx: &UnmarshalContext) -> Result<Self> {
        Ok(Vec::new())
    }

    fn from_blocks(blocks: Vec<&Block>, cx: &UnmarshalContext) -> Result<Self> {
        blocks
            .into_iter()
            .map(|block| T::from_block(block, cx))
            .collect()
    }

    fn from_labels(
        labels: &mut VecDeque<String>,
        _field_name: &str,
        cx: &UnmarshalContext,
    ) -> Result<Self> {
        let drained: Vec<String> = labels.drain(..).collect();
        drained
            .into_iter()
            .map(|label| T::from_label(&label, cx))
            .collect()
    }

    fn parse_tag_value(raw: &str) -> Result<Value> {
        if T::tag_container() {
            return Err(Error::new(ErrorKind::DefaultParse(
                "nested map or slice is not supported in slice".to_string(),
            )));
        }
        let mut elements = Vec::new();
        for item in raw.split(',') {
            let value = T::parse_tag_value(item).map_err(|err| {
                Error::new(ErrorKind::DefaultParse(format!(
                    "error applying {item:?} to list: error parsing default value: {err}"
                )))
            })?;
            elements.push(value);
        }
        Ok(Value::list(elements))
    }

    fn tag_container() -> bool {
        true
    }
}

impl<T: ToHcl> ToHcl for Vec<T> {
    fn to_value(&self, cx: &MarshalContext) -> Result<Value> {
        let elements: Result<Vec<Value>> =
            self.iter().map(|element| element.to_value(cx)).collect();
        Ok(Value::list(elements?))
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn schema_value(cx: &MarshalContext) -> Result<Value> {
        Ok(Value::list(vec![T::schema_value(cx)?]))
    }

    fn to_labels(&self) -> Result<Vec<String>> {
        let mut labels = Vec::new();
        for element in self {
            labels.extend(element.to_labels()?);
        }
        Ok(labels)
    }

    fn to_blocks(
        &self,
        field: &FieldSchema,
        cx: &mut MarshalContext,
        out: &mut Vec<Entry>,
    ) -> Result<()> {
        for element in self {
            element.to_blocks(field, cx, out)?;
        }
        Ok(())
    }

    fn schema_blocks(
        field: &FieldSchema,
        _repeated: bool,
        cx: &mut MarshalContext,
        out: &mut Vec<Entry>,
    ) -> Result<()> {
        T::schema_blocks(field, true, cx, out)
    }
}

// ---------------------------------------------------------------------------
// Mappings

fn map_from_value<V, M>(value: &Value, cx: &UnmarshalContext, insert: impl Fn(&mut M, String, V)) -> Result<M>
where
    V: FromHcl,
    M: Default,
{
    let entries = value
        .as_map()
        .ok_or_else(|| type_mismatch("a map", value))?;
    let mut out = M::default();
    for entry in entries {
        let key = entry.key.as_text().ok_or_else(|| {
            Error::new(ErrorKind::TypeMismatch(format!(
                "map key must be a string or type but is {}",
                entry.key
            )))
            .with_pos(entry.key.pos())
        })?;
        let decoded = V::from_value(&entry.value, cx)
            .map_err(|err| err.context("invalid map value").with_pos(entry.value.pos()))?;
        insert(&mut out, key, decoded);
    }
    Ok(out)
}

fn map_parse_tag_value<V: FromHcl>(raw: &str) -> Result<Value> {
    if V::tag_container() {
        return Err(Error::new(ErrorKind::DefaultParse(
            "nested structures are not supported in map".to_string(),
        )));
    }
    let mut parsed: BTreeMap<String, Value> = BTreeMap::new();
    for pair in raw.split(';') {
        let Some((key, rest)) = pair.split_once('=') else {
            return Err(Error::new(ErrorKind::DefaultParse(format!(
                "error parsing map {pair:?} into pairs"
            ))));
        };
        // Anything past a second `=` is discarded.
        let value_str = rest.split('=').next().unwrap_or(rest);
        let value = V::parse_tag_value(value_str).map_err(|err| {
            Error::new(ErrorKind::DefaultParse(format!(
                "error parsing map {value_str:?} into value, error parsing default value: {err}"
            )))
        })?;
        // Duplicate keys keep the last occurrence.
        parsed.insert(key.to_string(), value);
    }
    let entries = parsed
        .into_iter()
        .map(|(key, value)| MapEntry::new(Value::str(key), value))
        .collect();
    Ok(Value::map(entries))
}

fn map_to_value<'a, V: ToHcl + 'a>(
    entries: impl Iterator<Item = (&'a String, &'a V)>,
    cx: &MarshalContext,
) -> Result<Value> {
    let mut pairs: Vec<(&String, &V)> = entries.collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    let mut out = Vec::with_capacity(pairs.len());
    for (key, value) in pairs {
        out.push(MapEntry::new(Value::str(key.clone()), value.to_value(cx)?));
    }
    Ok(Value::map(out))
}

macro_rules! map_hcl {
    ($map:ident) => {
        impl<V: FromHcl> FromHcl for $map<String, V> {
            fn from_value(value: &Value, cx: &UnmarshalContext) -> Result<Self> {
                map_from_value(value, cx, |map: &mut Self, key, decoded| {
                    map.insert(key, decoded);
                })
            }

            fn from_missing(_cx: &UnmarshalContext) -> Result<Self> {
                Ok(Self::default())
            }

            fn parse_tag_value(raw: &str) -> Result<Value> {
                map_parse_tag_value::<V>(raw)
            }

            fn tag_container() -> bool {
                true
            }
        }

        impl<V: ToHcl> ToHcl for $map<String, V> {
            fn to_value(&self, cx: &MarshalContext) -> Result<Value> {
                map_to_value(self.iter(), cx)
            }

            fn is_zero(&self) -> bool {
                self.is_empty()
            }

            fn schema_value(cx: &MarshalContext) -> Result<Value> {
                Ok(Value::map(vec![MapEntry::new(
                    Value::type_keyword("string"),
                    V::schema_value(cx)?,
                )]))
            }
        }
    };
}

map_hcl!(HashMap);
map_hcl!(BTreeMap);

// ---------------------------------------------------------------------------
// Pointers

impl<T: FromHcl> FromHcl for Option<T> {
    const IS_RECORD: bool = T::IS_RECORD;
    const IS_RECORD_SEQ: bool = T::IS_RECORD_SEQ;

    fn from_value(value: &Value, cx: &UnmarshalContext) -> Result<Self> {
        T::from_value(value, cx).map(Some)
    }

    fn from_bare(cx: &UnmarshalContext) -> Result<Self> {
        T::from_bare(cx).map(Some)
    }

    fn from_missing(_cx: &UnmarshalContext) -> Result<Self> {
        Ok(None)
    }

    fn from_block(block: &Block, cx: &UnmarshalContext) -> Result<Self> {
        T::from_block(block, cx).map(Some)
    }

    fn from_blocks(blocks: Vec<&Block>, cx: &UnmarshalContext) -> Result<Self> {
        T::from_blocks(blocks, cx).map(Some)
    }

    fn from_labels(
        labels: &mut VecDeque<String>,
        field_name: &str,
        cx: &UnmarshalContext,
    ) -> Result<Self> {
        T::from_labels(labels, field_name, cx).map(Some)
    }

    fn parse_tag_value(raw: &str) -> Result<Value> {
        T::parse_tag_value(raw)
    }

    fn tag_container() -> bool {
        T::tag_container()
    }
}

impl<T: ToHcl> ToHcl for Option<T> {
    fn to_value(&self, cx: &MarshalContext) -> Result<Value> {
        match self {
            Some(value) => value.to_value(cx),
            None => Err(Error::new(ErrorKind::ValueDecode(
                "cannot marshal empty optional value".to_string(),
            ))),
        }
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }

    fn is_absent(&self) -> bool {
        self.is_none()
    }

    fn schema_value(cx: &MarshalContext) -> Result<Value> {
        T::schema_value(cx)
    }

    fn to_labels(&self) -> Result<Vec<String>> {
        match self {
            Some(value) => value.to_labels(),
            None => Ok(Vec::new()),
        }
    }

    fn to_blocks(
        &self,
        field: &FieldSchema,
        cx: &mut MarshalContext,
        out: &mut Vec<Entry>,
    ) -> Result<()> {
        match self {
            Some(value) => value.to_blocks(field, cx, out),
            // An absent pointer contributes nothing outside schema mode.
            None => Ok(()),
        }
    }

    fn schema_blocks(
        field: &FieldSchema,
        repeated: bool,
        cx: &mut MarshalContext,
        out: &mut Vec<Entry>,
    ) -> Result<()> {
        T::schema_blocks(field, repeated, cx, out)
    }
}

impl<T: FromHcl> FromHcl for Box<T> {
    const IS_RECORD: bool = T::IS_RECORD;
    const IS_RECORD_SEQ: bool = T::IS_RECORD_SEQ;

    fn from_value(value: &Value, cx: &UnmarshalContext) -> Result<Self> {
        T::from_value(value, cx).map(Box::new)
    }

    fn from_bare(cx: &UnmarshalContext) -> Result<Self> {
        T::from_bare(cx).map(Box::new)
    }

    fn from_missing(cx: &UnmarshalContext) -> Result<Self> {
        T::from_missing(cx).map(Box::new)
    }

    fn from_block(block: &Block, cx: &UnmarshalContext) -> Result<Self> {
        T::from_block(block, cx).map(Box::new)
    }

    fn from_blocks(blocks: Vec<&Block>, cx: &UnmarshalContext) -> Result<Self> {
        T::from_blocks(blocks, cx).map(Box::new)
    }

    fn parse_tag_value(raw: &str) -> Result<Value> {
        T::parse_tag_value(raw)
    }

    fn tag_container() -> bool {
        T::tag_container()
    }
}

impl<T: ToHcl> ToHcl for Box<T> {
    fn to_value(&self, cx: &MarshalContext) -> Result<Value> {
        (**self).to_value(cx)
    }

    fn is_zero(&self) -> bool {
        (**self).is_zero()
    }

    fn is_absent(&self) -> bool {
        (**self).is_absent()
    }

    fn schema_value(cx: &MarshalContext) -> Result<Value> {
        T::schema_value(cx)
    }

    fn to_labels(&self) -> Result<Vec<String>> {
        (**self).to_labels()
    }

    fn to_blocks(
        &self,
        field: &FieldSchema,
        cx: &mut MarshalContext,
        out: &mut Vec<Entry>,
    ) -> Result<()> {
        (**self).to_blocks(field, cx, out)
    }

    fn schema_blocks(
        field: &FieldSchema,
        repeated: bool,
        cx: &mut MarshalContext,
        out: &mut Vec<Entry>,
    ) -> Result<()> {
        T::schema_blocks(field, repeated, cx, out)
    }
}

// ---------------------------------------------------------------------------
// Durations and timestamps

impl FromHcl for Duration {
    fn from_value(value: &Value, _cx: &UnmarshalContext) -> Result<Self> {
        let text = match value {
            Value::Str(s) => &s.value,
            _ => return Err(type_mismatch("a duration string", value)),
        };
        parse_duration(text)
            .map_err(|err| Error::new(ErrorKind::ValueDecode(err)).with_pos(value.pos()))
    }

    fn from_missing(_cx: &UnmarshalContext) -> Result<Self> {
        Ok(Duration::ZERO)
    }

    fn parse_tag_value(raw: &str) -> Result<Value> {
        Ok(Value::str(raw))
    }
}

impl ToHcl for Duration {
    fn to_value(&self, _cx: &MarshalContext) -> Result<Value> {
        Ok(Value::str(format_duration(*self)))
    }

    fn is_zero(&self) -> bool {
        *self == Duration::ZERO
    }

    fn schema_value(_cx: &MarshalContext) -> Result<Value> {
        Ok(Value::type_keyword("string"))
    }
}

impl FromHcl for DateTime<Utc> {
    fn from_value(value: &Value, _cx: &UnmarshalContext) -> Result<Self> {
        let text = match value {
            Value::Str(s) => &s.value,
            _ => return Err(type_mismatch("an RFC 3339 timestamp", value)),
        };
        DateTime::parse_from_rfc3339(text)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|err| {
                Error::new(ErrorKind::ValueDecode(format!("invalid time: {err}")))
                    .with_pos(value.pos())
            })
    }

    fn from_missing(_cx: &UnmarshalContext) -> Result<Self> {
        Ok(DateTime::UNIX_EPOCH)
    }

    fn parse_tag_value(raw: &str) -> Result<Value> {
        Ok(Value::str(raw))
    }
}

impl ToHcl for DateTime<Utc> {
    fn to_value(&self, _cx: &MarshalContext) -> Result<Value> {
        Ok(Value::str(self.to_rfc3339_opts(SecondsFormat::Secs, true)))
    }

    fn is_zero(&self) -> bool {
        *self == DateTime::UNIX_EPOCH
    }

    fn schema_value(_cx: &MarshalContext) -> Result<Value> {
        Ok(Value::type_keyword("string"))
    }
}

impl FromHcl for DateTime<FixedOffset> {
    fn from_value(value: &Value, _cx: &UnmarshalContext) -> Result<Self> {
        let text = match value {
            Value::Str(s) => &s.value,
            _ => return Err(type_mismatch("an RFC 3339 timestamp", value)),
        };
        DateTime::parse_from_rfc3339(text).map_err(|err| {
            Error::new(ErrorKind::ValueDecode(format!("invalid time: {err}")))
                .with_pos(value.pos())
        })
    }

    fn from_missing(_cx: &UnmarshalContext) -> Result<Self> {
        Ok(DateTime::UNIX_EPOCH.fixed_offset())
    }

    fn parse_tag_value(raw: &str) -> Result<Value> {
        Ok(Value::str(raw))
    }
}

impl ToHcl for DateTime<FixedOffset> {
    fn to_value(&self, _cx: &MarshalContext) -> Result<Value> {
        Ok(Value::str(self.to_rfc3339_opts(SecondsFormat::Secs, true)))
    }

    fn is_zero(&self) -> bool {
        *self == DateTime::UNIX_EPOCH.fixed_offset()
    }

    fn schema_value(_cx: &MarshalContext) -> Result<Value> {
        Ok(Value::type_keyword("string"))
    }
}

// ---------------------------------------------------------------------------
// The open variant

impl FromHcl for serde_json::Value {
    fn from_value(value: &Value, cx: &UnmarshalContext) -> Result<Self> {
        Ok(match value {
            Value::Bool(b) => serde_json::Value::Bool(b.value),
            Value::Number(n) => match n.value {
                Number::Int(i) => serde_json::Value::from(i),
                Number::Uint(u) => serde_json::Value::from(u),
                Number::Float(f) => serde_json::Number::from_f64(f)
                    .map(serde_json::Value::Number)
                    .ok_or_else(|| type_mismatch("a finite number", value))?,
            },
            Value::Str(s) => serde_json::Value::String(s.value.clone()),
            Value::Type(t) => serde_json::Value::String(t.name.clone()),
            Value::Heredoc(h) => serde_json::Value::String(h.content()),
            Value::List(list) => {
                let mut out = Vec::with_capacity(list.elements.len());
                for element in &list.elements {
                    out.push(Self::from_value(element, cx)?);
                }
                serde_json::Value::Array(out)
            }
            Value::Map(map) => {
                let mut out = serde_json::Map::new();
                for entry in &map.entries {
                    let key = entry.key.as_text().ok_or_else(|| {
                        Error::new(ErrorKind::TypeMismatch(format!(
                            "map key must be a string or type but is {}",
                            entry.key
                        )))
                        .with_pos(entry.key.pos())
                    })?;
                    out.insert(key, Self::from_value(&entry.value, cx)?);
                }
                serde_json::Value::Object(out)
            }
            Value::Call(_) => {
                return Err(type_mismatch("a value", value));
            }
        })
    }

    fn from_missing(_cx: &UnmarshalContext) -> Result<Self> {
        Ok(serde_json::Value::Null)
    }
}

impl ToHcl for serde_json::Value {
    fn to_value(&self, cx: &MarshalContext) -> Result<Value> {
        match self {
            serde_json::Value::Null => Err(Error::new(ErrorKind::ValueDecode(
                "cannot marshal a null value".to_string(),
            ))),
            serde_json::Value::Bool(b) => Ok(Value::bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::number(Number::Int(i)))
                } else if let Some(u) = n.as_u64() {
                    Ok(Value::number(Number::from(u)))
                } else {
                    Ok(Value::number(Number::Float(n.as_f64().unwrap_or(0.0))))
                }
            }
            serde_json::Value::String(s) => s.to_value(cx),
            serde_json::Value::Array(elements) => {
                let mut out = Vec::with_capacity(elements.len());
                for element in elements {
                    out.push(element.to_value(cx)?);
                }
                Ok(Value::list(out))
            }
            serde_json::Value::Object(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (key, value) in map {
                    entries.push(MapEntry::new(Value::str(key.clone()), value.to_value(cx)?));
                }
                Ok(Value::map(entries))
            }
        }
    }

    fn is_zero(&self) -> bool {
        self.is_null()
    }

    fn schema_value(_cx: &MarshalContext) -> Result<Value> {
        Ok(Value::type_keyword("string"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cx_options() -> Options {
        Options::new()
    }

    #[test]
    fn test_string_from_value() {
        let options = cx_options();
        let cx = UnmarshalContext { options: &options };
        assert_eq!(
            String::from_value(&Value::str("x"), &cx).unwrap(),
            "x".to_string()
        );
        assert_eq!(
            String::from_value(&Value::type_keyword("string"), &cx).unwrap(),
            "string".to_string()
        );
        assert!(String::from_value(&Value::bool(true), &cx).is_err());
    }

    #[test]
    fn test_int_truncation() {
        let options = cx_options();
        let cx = UnmarshalContext { options: &options };
        assert_eq!(i64::from_value(&Value::number(1.9), &cx).unwrap(), 1);
        assert_eq!(i64::from_value(&Value::number(-1.9), &cx).unwrap(), -1);
        assert_eq!(u64::from_value(&Value::number(-5i64), &cx).unwrap(), 0);
        assert!(i8::from_value(&Value::number(300i64), &cx).is_err());
    }

    #[test]
    fn test_parse_int_auto() {
        assert_eq!(parse_int_auto("10"), Some(10));
        assert_eq!(parse_int_auto("0x10"), Some(16));
        assert_eq!(parse_int_auto("0o10"), Some(8));
        assert_eq!(parse_int_auto("010"), Some(8));
        assert_eq!(parse_int_auto("0b10"), Some(2));
        assert_eq!(parse_int_auto("-10"), Some(-10));
        assert_eq!(parse_int_auto("abc"), None);
    }

    #[test]
    fn test_map_tag_parsing() {
        let value = HashMap::<String, i32>::parse_tag_value("b=5;a=4;c=6;a=7").unwrap();
        // Last duplicate wins; output is key-sorted.
        assert_eq!(value.to_string(), r#"{"a": 7, "b": 5, "c": 6}"#);
    }

    #[test]
    fn test_map_tag_errors() {
        let err = HashMap::<String, i32>::parse_tag_value("abc").unwrap_err();
        assert_eq!(err.to_string(), "error parsing map \"abc\" into pairs");
        let err = HashMap::<String, i32>::parse_tag_value("key1=2;key2=test").unwrap_err();
        assert_eq!(
            err.to_string(),
            "error parsing map \"test\" into value, error parsing default value: error converting \"test\" to int"
        );
    }

    #[test]
    fn test_list_tag_parsing() {
        let value = Vec::<i32>::parse_tag_value("4,5,6").unwrap();
        assert_eq!(value.to_string(), "[4, 5, 6]");
        let err = Vec::<i32>::parse_tag_value("a,b").unwrap_err();
        assert_eq!(
            err.to_string(),
            "error applying \"a\" to list: error parsing default value: error converting \"a\" to int"
        );
    }

    #[test]
    fn test_nested_containers_rejected_in_tags() {
        assert!(Vec::<Vec<i32>>::parse_tag_value("1,2").is_err());
        assert!(HashMap::<String, Vec<i32>>::parse_tag_value("a=1").is_err());
    }

    #[test]
    fn test_duration_round_trip() {
        let options = cx_options();
        let ucx = UnmarshalContext { options: &options };
        let mcx = MarshalContext::new(&options);
        let parsed = Duration::from_value(&Value::str("5s"), &ucx).unwrap();
        assert_eq!(parsed, Duration::from_secs(5));
        assert_eq!(parsed.to_value(&mcx).unwrap().as_str(), Some("5s"));
    }

    #[test]
    fn test_time_round_trip() {
        let options = cx_options();
        let ucx = UnmarshalContext { options: &options };
        let mcx = MarshalContext::new(&options);
        let parsed =
            DateTime::<Utc>::from_value(&Value::str("2020-01-02T15:04:05Z"), &ucx).unwrap();
        assert_eq!(
            parsed.to_value(&mcx).unwrap().as_str(),
            Some("2020-01-02T15:04:05Z")
        );
    }

    #[test]
    fn test_open_variant() {
        let options = cx_options();
        let cx = UnmarshalContext { options: &options };
        let value = Value::map(vec![
            MapEntry::new(Value::str("a"), Value::str("hello")),
            MapEntry::new(
                Value::str("b"),
                Value::map(vec![MapEntry::new(Value::str("c"), Value::str("inner"))]),
            ),
        ]);
        let decoded = serde_json::Value::from_value(&value, &cx).unwrap();
        assert_eq!(
            decoded,
            serde_json::json!({"a": "hello", "b": {"c": "inner"}})
        );
        // Plain numbers surface as floats when decoded through a list.
        let decoded =
            serde_json::Value::from_value(&Value::list(vec![Value::number(1i64)]), &cx).unwrap();
        assert_eq!(decoded, serde_json::json!([1]));
    }

    #[test]
    fn test_heredoc_threshold() {
        let options = Options::new().heredocs_for_multiline(2);
        let cx = MarshalContext::new(&options);
        let value = "hello\nworld\nwhat's".to_string().to_value(&cx).unwrap();
        assert!(matches!(value, Value::Heredoc(_)));
        let value = "one\nline".to_string().to_value(&cx).unwrap();
        assert!(matches!(value, Value::Str(_)));
    }
}
