//! The descriptor-driven record engine.
//!
//! `#[derive(HclRecord)]` materializes a [`FieldSchema`] per field and
//! generates `decode_body` / `encode_body` / `schema_body` methods that call
//! back into [`BodyDecoder`] and [`BodyEncoder`]. The engine owns the
//! algorithmic parts: the key multimap with conflict detection, label
//! binding, defaults and enum validation, remainder capture, the
//! extra-field policy, attribute omission, and schema recursion marking.

use std::any::TypeId;
use std::collections::{HashMap, HashSet, VecDeque};

use hackle_ast::{Attribute, Block, Entry, Position, RecursiveEntry, Value};
use tracing::trace;

use crate::error::{Error, ErrorKind, Result};
use crate::options::Options;
use crate::value::{FromHcl, MarshalContext, ToHcl, UnmarshalContext};

/// A record type that can cross the bridge in both directions.
///
/// Implemented by `#[derive(HclRecord)]`; not intended for manual
/// implementation.
pub trait HclRecord: Sized {
    /// Append this record's field descriptors (flattened fields included).
    fn record_fields(out: &mut Vec<FieldSchema>);

    /// Decode the record's fields from the decoder.
    fn decode_body(dec: &mut BodyDecoder<'_, '_>) -> Result<Self>;

    /// Encode the record's fields into the encoder.
    fn encode_body(&self, enc: &mut BodyEncoder<'_, '_>) -> Result<()>;

    /// Emit the record's schema entries into the encoder.
    fn schema_body(enc: &mut BodyEncoder<'_, '_>) -> Result<()>;

    /// Identity used by the schema reflector's cycle detection.
    fn schema_type_id() -> Option<TypeId> {
        None
    }

    /// The full descriptor list.
    fn fields() -> Vec<FieldSchema> {
        let mut out = Vec::new();
        Self::record_fields(&mut out);
        out
    }
}

/// The parsed form of one field's tags.
#[derive(Debug, Clone, Copy)]
pub struct FieldSchema {
    /// HCL key for the field.
    pub name: &'static str,
    /// Absence is allowed.
    pub optional: bool,
    /// Bound from block labels.
    pub label: bool,
    /// A nested block (or sequence of blocks).
    pub block: bool,
    /// Captures all unclaimed entries.
    pub remain: bool,
    /// Whether the field carried an explicit `#[hcl(...)]` tag; untagged
    /// record fields become blocks under the infer policy.
    pub tagged: bool,
    /// Documentation, from `help = "..."`.
    pub help: &'static str,
    /// Raw default tag string.
    pub default_value: &'static str,
    /// Raw comma-separated enum tag string.
    pub enum_values: &'static str,
}

impl FieldSchema {
    /// Comment lines this field contributes to marshalled output.
    pub fn comments(&self, options: &Options) -> Vec<String> {
        let mut out = Vec::new();
        if (options.schema_comments || options.schema) && !self.help.is_empty() {
            out.extend(self.help.split('\n').map(String::from));
        }
        if options.schema_comments && !options.schema {
            if !self.enum_values.is_empty() {
                out.push(format!("enum: {}", self.enum_values));
            }
            if !self.default_value.is_empty() {
                out.push(format!("default: {}", self.default_value));
            }
        }
        out
    }
}

/// Multimap of entries by key, preserving source order.
struct EntryMap<'a> {
    order: Vec<String>,
    buckets: HashMap<String, VecDeque<&'a Entry>>,
    claimed: HashSet<String>,
}

impl<'a> EntryMap<'a> {
    fn build(entries: &'a [Entry]) -> Result<Self> {
        let mut map = EntryMap {
            order: Vec::new(),
            buckets: HashMap::new(),
            claimed: HashSet::new(),
        };
        for entry in entries {
            if matches!(entry, Entry::Comment(_) | Entry::Recursive(_)) {
                continue;
            }
            let key = entry.key().to_string();
            if let Some(bucket) = map.buckets.get(&key) {
                if let Some(first) = bucket.front() {
                    if first.is_block() != entry.is_block() {
                        return Err(Error::new(ErrorKind::BlockAttributeConflict {
                            key,
                            second: entry.pos(),
                        })
                        .with_pos(first.pos()));
                    }
                }
            } else {
                map.order.push(key.clone());
            }
            map.buckets.entry(key).or_default().push_back(entry);
        }
        Ok(map)
    }

    fn claim(&mut self, name: &str) {
        self.claimed.insert(name.to_string());
    }

    fn take_first(&mut self, name: &str) -> Option<&'a Entry> {
        self.buckets.get_mut(name)?.pop_front()
    }

    fn peek_first(&self, name: &str) -> Option<&'a Entry> {
        self.buckets.get(name)?.front().copied()
    }

    fn take_all(&mut self, name: &str) -> Vec<&'a Entry> {
        self.buckets
            .get_mut(name)
            .map(|bucket| bucket.drain(..).collect())
            .unwrap_or_default()
    }

    /// All leftover entries, in source order of their keys.
    fn drain_remaining(&mut self) -> Vec<&'a Entry> {
        let mut out = Vec::new();
        for key in &self.order {
            if let Some(bucket) = self.buckets.get_mut(key) {
                out.extend(bucket.drain(..));
            }
        }
        out
    }

    /// Unclaimed keys with their first entry, in source order.
    fn unclaimed(&self) -> Vec<(&str, &'a Entry)> {
        self.order
            .iter()
            .filter(|key| !self.claimed.contains(*key))
            .filter_map(|key| {
                self.buckets
                    .get(key)
                    .and_then(|bucket| bucket.front())
                    .map(|entry| (key.as_str(), *entry))
            })
            .collect()
    }
}

/// Decoding state for one record body.
pub struct BodyDecoder<'a, 'o> {
    map: EntryMap<'a>,
    labels: VecDeque<String>,
    pos: Position,
    saw_remain: bool,
    cx: UnmarshalContext<'o>,
}

impl<'a, 'o> BodyDecoder<'a, 'o> {
    /// Decoder over a top-level entries slice.
    pub fn for_entries(entries: &'a [Entry], cx: UnmarshalContext<'o>) -> Result<Self> {
        Ok(Self {
            map: EntryMap::build(entries)?,
            labels: VecDeque::new(),
            pos: Position::default(),
            saw_remain: false,
            cx,
        })
    }

    /// Decoder over a block's body and labels.
    pub fn for_block(block: &'a Block, cx: UnmarshalContext<'o>) -> Result<Self> {
        Ok(Self {
            map: EntryMap::build(&block.body)?,
            labels: block.labels.iter().cloned().collect(),
            pos: block.pos,
            saw_remain: false,
            cx,
        })
    }

    /// Position of the enclosing block, for `#[hcl(pos)]` fields.
    pub fn position(&self) -> Position {
        self.pos
    }

    /// Bind a label field.
    pub fn label<T: FromHcl>(&mut self, field: &FieldSchema) -> Result<T> {
        self.map.claim(field.name);
        T::from_labels(&mut self.labels, field.name, &self.cx)
            .map_err(|err| err.with_pos(self.pos))
    }

    /// Capture all unclaimed entries, ordered by key.
    pub fn remain(&mut self) -> Result<Vec<Entry>> {
        self.saw_remain = true;
        let mut entries: Vec<Entry> = self
            .map
            .drain_remaining()
            .into_iter()
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.key().cmp(b.key()));
        Ok(entries)
    }

    /// Decode one ordinary field. Dispatch is type-driven: records come from
    /// blocks, sequences of records from repeated blocks, everything else
    /// from an attribute value.
    pub fn field<T: FromHcl>(&mut self, field: &FieldSchema) -> Result<T> {
        trace!(name = field.name, "decode field");
        self.map.claim(field.name);

        if T::IS_RECORD_SEQ {
            let entries = self.map.take_all(field.name);
            if entries.is_empty() {
                return self.missing::<T>(field);
            }
            let mut blocks = Vec::with_capacity(entries.len());
            for entry in &entries {
                match entry {
                    Entry::Block(block) => blocks.push(&**block),
                    _ => {
                        return Err(Error::new(ErrorKind::ExpectedBlock(
                            field.name.to_string(),
                        ))
                        .with_pos(entry.pos()))
                    }
                }
            }
            return T::from_blocks(blocks, &self.cx);
        }

        if T::IS_RECORD {
            let Some(entry) = self.map.take_first(field.name) else {
                return self.missing::<T>(field);
            };
            if let Some(duplicate) = self.map.peek_first(field.name) {
                return Err(Error::new(ErrorKind::DuplicateField {
                    key: field.name.to_string(),
                    second: duplicate.pos(),
                })
                .with_pos(entry.pos()));
            }
            let Entry::Block(block) = entry else {
                return Err(
                    Error::new(ErrorKind::ExpectedBlock(field.name.to_string()))
                        .with_pos(entry.pos()),
                );
            };
            return T::from_block(block, &self.cx);
        }

        let Some(entry) = self.map.take_first(field.name) else {
            return self.missing::<T>(field);
        };
        if let Some(duplicate) = self.map.peek_first(field.name) {
            return Err(Error::new(ErrorKind::DuplicateField {
                key: field.name.to_string(),
                second: duplicate.pos(),
            })
            .with_pos(entry.pos()));
        }
        let Entry::Attribute(attr) = entry else {
            return Err(
                Error::new(ErrorKind::ExpectedAttribute(field.name.to_string()))
                    .with_pos(entry.pos()),
            );
        };
        match &attr.value {
            Some(value) => {
                check_enum::<T>(field, value)?;
                T::from_value(value, &self.cx).map_err(|err| {
                    err.context("failed to unmarshal value")
                        .with_pos(value.pos())
                        .with_pos(attr.pos)
                })
            }
            None => T::from_bare(&self.cx).map_err(|err| {
                err.context("failed to unmarshal value").with_pos(attr.pos)
            }),
        }
    }

    fn missing<T: FromHcl>(&self, field: &FieldSchema) -> Result<T> {
        if !field.default_value.is_empty() {
            let value = T::parse_tag_value(field.default_value)
                .map_err(|err| err.context("error parsing default value"))?;
            check_enum_value::<T>(field, &value)
                .map_err(|err| err.context("default value conflicts with enum"))?;
            return T::from_value(&value, &self.cx).map_err(|err| {
                err.context(format!(
                    "error applying default value to field {:?}",
                    field.name
                ))
            });
        }
        if !field.optional {
            return Err(Error::new(ErrorKind::MissingRequired(
                field.name.to_string(),
            )));
        }
        T::from_missing(&self.cx)
    }

    /// Whether all labels were consumed.
    pub fn labels_consumed(&self) -> bool {
        self.labels.is_empty()
    }

    /// Error on unconsumed entries, unless extras are allowed or a remain
    /// field swallowed them.
    pub fn finish(&self) -> Result<()> {
        if self.saw_remain || self.cx.options.allow_extra {
            return Ok(());
        }
        let unclaimed = self.map.unclaimed();
        if unclaimed.is_empty() {
            return Ok(());
        }
        let keys: Vec<String> = unclaimed.iter().map(|(key, _)| format!("{key:?}")).collect();
        Err(Error::new(ErrorKind::ExtraFields(keys.join(", "))).with_pos(unclaimed[0].1.pos()))
    }
}

fn check_enum<T: FromHcl>(field: &FieldSchema, value: &Value) -> Result<()> {
    if field.enum_values.is_empty() {
        return Ok(());
    }
    check_enum_value::<T>(field, value)
}

fn check_enum_value<T: FromHcl>(field: &FieldSchema, value: &Value) -> Result<()> {
    if field.enum_values.is_empty() {
        return Ok(());
    }
    if T::IS_RECORD || T::IS_RECORD_SEQ || T::tag_container() {
        return Err(Error::message(format!(
            "enum is not supported on map, struct or list field {:?}",
            field.name
        )));
    }
    let mut options = Vec::new();
    for token in field.enum_values.split(',') {
        let parsed =
            T::parse_tag_value(token).map_err(|err| err.context("error parsing enum"))?;
        if parsed.to_string() == value.to_string() {
            return Ok(());
        }
        options.push(parsed.to_string());
    }
    Err(Error::new(ErrorKind::EnumViolation {
        value: value.to_string(),
        options: options.join(", "),
    }))
}

/// Parse the enum tag into values, for schema emission.
fn enum_values_for<T: FromHcl>(field: &FieldSchema) -> Result<Vec<Value>> {
    if field.enum_values.is_empty() {
        return Ok(Vec::new());
    }
    field
        .enum_values
        .split(',')
        .map(|token| T::parse_tag_value(token).map_err(|err| err.context("error parsing enum")))
        .collect()
}

fn default_value_for<T: FromHcl>(field: &FieldSchema) -> Result<Option<Value>> {
    if field.default_value.is_empty() {
        return Ok(None);
    }
    T::parse_tag_value(field.default_value)
        .map(Some)
        .map_err(|err| err.context("error parsing default value"))
}

/// Encoding state for one record body.
pub struct BodyEncoder<'c, 'o> {
    /// Labels contributed by label fields.
    pub labels: Vec<String>,
    /// Entries emitted so far.
    pub entries: Vec<Entry>,
    cx: &'c mut MarshalContext<'o>,
}

impl<'c, 'o> BodyEncoder<'c, 'o> {
    pub fn new(cx: &'c mut MarshalContext<'o>) -> Self {
        Self {
            labels: Vec::new(),
            entries: Vec::new(),
            cx,
        }
    }

    /// Consume the encoder, releasing the accumulated labels and entries.
    pub fn into_parts(self) -> (Vec<String>, Vec<Entry>) {
        (self.labels, self.entries)
    }

    /// Contribute a label field's value to the enclosing block's labels.
    pub fn label<T: ToHcl>(&mut self, _field: &FieldSchema, value: &T) -> Result<()> {
        self.labels.extend(value.to_labels()?);
        Ok(())
    }

    /// Contribute a label field's descriptor name (schema mode).
    pub fn schema_label(&mut self, field: &FieldSchema) {
        self.labels.push(field.name.to_string());
    }

    /// Re-emit captured remainder entries verbatim.
    pub fn remain(&mut self, entries: &[Entry]) -> Result<()> {
        self.entries.extend_from_slice(entries);
        Ok(())
    }

    /// Encode one ordinary field.
    pub fn field<T: ToHcl + FromHcl>(&mut self, field: &FieldSchema, value: &T) -> Result<()> {
        let as_block = field.block
            || (self.cx.options.infer_hcl_tags
                && !field.tagged
                && (T::IS_RECORD || T::IS_RECORD_SEQ));
        if as_block {
            return value.to_blocks(field, self.cx, &mut self.entries);
        }

        // An absent pointer contributes no attribute at all.
        if value.is_absent() {
            return Ok(());
        }

        let rendered = value.to_value(self.cx)?;
        let default = default_value_for::<T>(field)?;
        let enum_values = enum_values_for::<T>(field)?;

        if field.optional {
            let matches_default = match &default {
                Some(default) => default.to_string() == rendered.to_string(),
                None => value.is_zero(),
            };
            if matches_default {
                return Ok(());
            }
        }

        self.entries.push(Entry::Attribute(Box::new(Attribute {
            key: field.name.to_string(),
            value: Some(rendered),
            default,
            enum_values,
            optional: false,
            comments: field.comments(self.cx.options),
            ..Attribute::default()
        })));
        Ok(())
    }

    /// Emit one field's schema entry.
    pub fn schema_field<T: ToHcl + FromHcl>(&mut self, field: &FieldSchema) -> Result<()> {
        let as_block = field.block
            || (self.cx.options.infer_hcl_tags
                && !field.tagged
                && (T::IS_RECORD || T::IS_RECORD_SEQ));
        if as_block {
            return T::schema_blocks(field, false, self.cx, &mut self.entries);
        }

        let value = T::schema_value(self.cx)?;
        let default = default_value_for::<T>(field)?;
        let enum_values = enum_values_for::<T>(field)?;
        let optional = field.optional || default.is_some();

        self.entries.push(Entry::Attribute(Box::new(Attribute {
            key: field.name.to_string(),
            value: Some(value),
            default,
            enum_values,
            optional,
            comments: field.comments(self.cx.options),
            ..Attribute::default()
        })));
        Ok(())
    }
}

/// Decode a record from a block: bind labels, decode the body, check label
/// and entry consumption.
pub fn decode_record_block<R: HclRecord>(block: &Block, cx: &UnmarshalContext) -> Result<R> {
    let result: Result<R> = (|| {
        let mut dec = BodyDecoder::for_block(block, *cx)?;
        let record = R::decode_body(&mut dec)?;
        if !dec.labels_consumed() {
            return Err(Error::new(ErrorKind::TooManyLabels(block.name.clone())));
        }
        dec.finish()?;
        Ok(record)
    })();
    result.map_err(|err| err.context("failed to unmarshal block").with_pos(block.pos))
}

/// Encode a record as one block entry.
pub fn encode_record_block<R: HclRecord>(
    record: &R,
    field: &FieldSchema,
    cx: &mut MarshalContext,
    out: &mut Vec<Entry>,
) -> Result<()> {
    let comments = field.comments(cx.options);
    let mut enc = BodyEncoder::new(cx);
    record.encode_body(&mut enc)?;
    let (labels, entries) = enc.into_parts();
    out.push(Entry::Block(Box::new(Block {
        name: field.name.to_string(),
        labels,
        body: entries,
        comments,
        ..Block::default()
    })));
    Ok(())
}

/// Emit a record's schema block, marking recursion into types already on
/// the descent path.
pub fn schema_record_blocks<R: HclRecord>(
    field: &FieldSchema,
    repeated: bool,
    cx: &mut MarshalContext,
    out: &mut Vec<Entry>,
) -> Result<()> {
    let comments = field.comments(cx.options);
    let type_id = R::schema_type_id();
    if let Some(id) = type_id {
        if cx.visited.contains(&id) {
            out.push(Entry::Block(Box::new(Block {
                name: field.name.to_string(),
                body: vec![RecursiveEntry::default().into()],
                repeated,
                comments,
                ..Block::default()
            })));
            return Ok(());
        }
        cx.visited.push(id);
    }
    let mut enc = BodyEncoder::new(cx);
    let result = R::schema_body(&mut enc);
    let (labels, entries) = enc.into_parts();
    if type_id.is_some() {
        cx.visited.pop();
    }
    result?;
    out.push(Entry::Block(Box::new(Block {
        name: field.name.to_string(),
        labels,
        body: entries,
        repeated,
        comments,
        ..Block::default()
    })));
    Ok(())
}
