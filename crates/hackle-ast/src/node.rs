//! AST node types for HCL documents.
//!
//! The tree is owned strictly top-down: an [`Ast`] owns its entries, a
//! [`Block`] owns its body, and so on. Parent references are a lookup
//! relation kept in a side table on the `Ast` (see [`Ast::add_parent_refs`]),
//! never an ownership edge, and exist only to support [`Ast::detach`] and
//! enclosing-scope lookup.

use std::collections::HashMap;
use std::fmt;

/// A source location. `line` and `column` are 1-based, `offset` is a byte
/// offset into the source. The all-zero position means "unknown" (nodes built
/// by hand rather than by the parser).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Byte offset into the source text.
    pub offset: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
}

impl Position {
    /// Create a new position.
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Whether this position was ever set.
    pub fn is_known(&self) -> bool {
        *self != Position::default()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Identity of a node within one [`Ast`].
///
/// Ids are assigned by the parser and by [`Ast::add_parent_refs`]; a default
/// id of zero means "not yet assigned". Ids are only meaningful relative to
/// the tree that assigned them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeId(pub u64);

impl NodeId {
    /// The unassigned id.
    pub const UNSET: NodeId = NodeId(0);

    /// Whether this id has been assigned.
    pub fn is_set(&self) -> bool {
        self.0 != 0
    }
}

/// A parsed HCL document: an ordered sequence of entries plus any comments
/// that trailed the final entry.
#[derive(Debug, Clone, Default)]
pub struct Ast {
    /// Id of the root node.
    pub id: NodeId,
    /// Position of the first token.
    pub pos: Position,
    /// Top-level entries in source order.
    pub entries: Vec<Entry>,
    /// Comment lines after the last entry.
    pub trailing_comments: Vec<String>,
    /// True for trees produced by schema reflection; switches the printer
    /// into schema-decoration mode.
    pub schema: bool,

    /// Child-to-parent relation, rebuilt by [`Ast::add_parent_refs`].
    parents: HashMap<NodeId, NodeId>,
}

impl PartialEq for Ast {
    fn eq(&self, other: &Self) -> bool {
        // The parent table is derived data; two trees are equal if their
        // structure is, whether or not the relation has been materialized.
        self.id == other.id
            && self.pos == other.pos
            && self.entries == other.entries
            && self.trailing_comments == other.trailing_comments
            && self.schema == other.schema
    }
}

impl Ast {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from entries.
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Ast {
            entries,
            ..Self::default()
        }
    }

    /// Assign node ids and rebuild the child-to-parent relation.
    ///
    /// The parser calls this once after a successful parse. Call it again
    /// after mutating the tree by hand; until then [`Ast::detach`] falls back
    /// to a full scan and [`Ast::parent_of`] may answer from stale data.
    /// Existing ids are reassigned, so ids obtained before the call are
    /// invalidated.
    pub fn add_parent_refs(&mut self) {
        self.parents.clear();
        let mut next = 1u64;
        self.id = NodeId(next);
        next += 1;
        let root = self.id;
        let mut parents = HashMap::new();
        for entry in &mut self.entries {
            link_entry(entry, root, &mut next, &mut parents);
        }
        self.parents = parents;
    }

    /// Look up the parent of a node by id. Answers from the relation built by
    /// the most recent [`Ast::add_parent_refs`].
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    /// Remove the entry or map entry with the given id from its parent's
    /// collection. Returns false if no such child exists.
    pub fn detach(&mut self, id: NodeId) -> bool {
        if !id.is_set() {
            return false;
        }
        let detached = detach_from_entries(&mut self.entries, id);
        if detached {
            self.parents.remove(&id);
        }
        detached
    }
}

fn link_entry(
    entry: &mut Entry,
    parent: NodeId,
    next: &mut u64,
    parents: &mut HashMap<NodeId, NodeId>,
) {
    let id = NodeId(*next);
    *next += 1;
    parents.insert(id, parent);
    match entry {
        Entry::Attribute(attr) => {
            attr.id = id;
            if let Some(value) = &mut attr.value {
                link_value(value, id, next, parents);
            }
        }
        Entry::Block(block) => {
            block.id = id;
            for child in &mut block.body {
                link_entry(child, id, next, parents);
            }
        }
        Entry::Comment(comment) => comment.id = id,
        Entry::Recursive(rec) => rec.id = id,
    }
}

fn link_value(
    value: &mut Value,
    parent: NodeId,
    next: &mut u64,
    parents: &mut HashMap<NodeId, NodeId>,
) {
    let id = NodeId(*next);
    *next += 1;
    parents.insert(id, parent);
    value.set_id(id);
    match value {
        Value::List(list) => {
            for element in &mut list.elements {
                link_value(element, id, next, parents);
            }
        }
        Value::Map(map) => {
            for entry in &mut map.entries {
                let entry_id = NodeId(*next);
                *next += 1;
                parents.insert(entry_id, id);
                entry.id = entry_id;
                link_value(&mut entry.key, entry_id, next, parents);
                link_value(&mut entry.value, entry_id, next, parents);
            }
        }
        Value::Call(call) => {
            for arg in &mut call.args {
                link_value(arg, id, next, parents);
            }
        }
        _ => {}
    }
}

fn detach_from_entries(entries: &mut Vec<Entry>, id: NodeId) -> bool {
    if let Some(index) = entries.iter().position(|e| e.id() == id) {
        entries.remove(index);
        return true;
    }
    for entry in entries.iter_mut() {
        match entry {
            Entry::Block(block) => {
                if detach_from_entries(&mut block.body, id) {
                    return true;
                }
            }
            Entry::Attribute(attr) => {
                if let Some(value) = &mut attr.value {
                    if detach_from_value(value, id) {
                        return true;
                    }
                }
            }
            _ => {}
        }
    }
    false
}

fn detach_from_value(value: &mut Value, id: NodeId) -> bool {
    match value {
        Value::Map(map) => {
            if let Some(index) = map.entries.iter().position(|e| e.id == id) {
                map.entries.remove(index);
                return true;
            }
            map.entries
                .iter_mut()
                .any(|e| detach_from_value(&mut e.value, id))
        }
        Value::List(list) => list
            .elements
            .iter_mut()
            .any(|e| detach_from_value(e, id)),
        _ => false,
    }
}

/// An entry at the top level of a document or inside a block body.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// `key = value`
    Attribute(Box<Attribute>),
    /// `name label… { … }`
    Block(Box<Block>),
    /// A comment not attached to any entry. Only present when the parser was
    /// asked to keep detached comments.
    Comment(Box<Comment>),
    /// Marker emitted by schema reflection where a record type recurses.
    Recursive(Box<RecursiveEntry>),
}

impl Entry {
    /// Key of the attribute or name of the block; empty for comments and
    /// recursion markers.
    pub fn key(&self) -> &str {
        match self {
            Entry::Attribute(attr) => &attr.key,
            Entry::Block(block) => &block.name,
            Entry::Comment(_) | Entry::Recursive(_) => "",
        }
    }

    /// Source position of the entry.
    pub fn pos(&self) -> Position {
        match self {
            Entry::Attribute(attr) => attr.pos,
            Entry::Block(block) => block.pos,
            Entry::Comment(comment) => comment.pos,
            Entry::Recursive(rec) => rec.pos,
        }
    }

    /// Node id.
    pub fn id(&self) -> NodeId {
        match self {
            Entry::Attribute(attr) => attr.id,
            Entry::Block(block) => block.id,
            Entry::Comment(comment) => comment.id,
            Entry::Recursive(rec) => rec.id,
        }
    }

    /// Comment lines attached to this entry.
    pub fn comments(&self) -> &[String] {
        match self {
            Entry::Attribute(attr) => &attr.comments,
            Entry::Block(block) => &block.comments,
            Entry::Comment(comment) => &comment.comments,
            Entry::Recursive(_) => &[],
        }
    }

    /// Whether this entry is a block.
    pub fn is_block(&self) -> bool {
        matches!(self, Entry::Block(_))
    }

    /// The attribute payload, if this entry is one.
    pub fn as_attribute(&self) -> Option<&Attribute> {
        match self {
            Entry::Attribute(attr) => Some(attr),
            _ => None,
        }
    }

    /// The block payload, if this entry is one.
    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Entry::Block(block) => Some(block),
            _ => None,
        }
    }
}

impl From<Attribute> for Entry {
    fn from(attr: Attribute) -> Self {
        Entry::Attribute(Box::new(attr))
    }
}

impl From<Block> for Entry {
    fn from(block: Block) -> Self {
        Entry::Block(Box::new(block))
    }
}

impl From<Comment> for Entry {
    fn from(comment: Comment) -> Self {
        Entry::Comment(Box::new(comment))
    }
}

impl From<RecursiveEntry> for Entry {
    fn from(rec: RecursiveEntry) -> Self {
        Entry::Recursive(Box::new(rec))
    }
}

/// A `key = value` attribute.
///
/// `value` is absent for a bare attribute (`attr` with no `=`), which is
/// syntactically legal and given meaning by the unmarshaller's bare-boolean
/// policy. The schema metadata fields are populated either by schema
/// reflection or by constraint suffixes in the source
/// (`key = string(optional default("x"))`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attribute {
    pub id: NodeId,
    pub pos: Position,
    pub key: String,
    pub value: Option<Value>,
    /// Declared default, from a `default(…)` constraint or a field tag.
    pub default: Option<Value>,
    /// Declared enumeration, from an `enum(…)` constraint or a field tag.
    pub enum_values: Vec<Value>,
    /// Whether the attribute is optional (schema metadata).
    pub optional: bool,
    /// Attached comment lines.
    pub comments: Vec<String>,
}

impl Attribute {
    /// Create an attribute with a value.
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Attribute {
            key: key.into(),
            value: Some(value),
            ..Self::default()
        }
    }

    /// Create a bare attribute (no `= value`).
    pub fn bare(key: impl Into<String>) -> Self {
        Attribute {
            key: key.into(),
            ..Self::default()
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{} = {}", self.key, value),
            None => write!(f, "{}", self.key),
        }
    }
}

/// A named, optionally labelled block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub id: NodeId,
    pub pos: Position,
    pub name: String,
    /// Labels between the name and the opening brace.
    pub labels: Vec<String>,
    /// Body entries in source order.
    pub body: Vec<Entry>,
    /// Schema marker: the block may appear more than once.
    pub repeated: bool,
    /// Attached comment lines.
    pub comments: Vec<String>,
    /// Comment lines after the last body entry, before the closing brace.
    pub trailing_comments: Vec<String>,
}

impl Block {
    /// Create a block with a name and body.
    pub fn new(name: impl Into<String>, body: Vec<Entry>) -> Self {
        Block {
            name: name.into(),
            body,
            ..Self::default()
        }
    }

    /// Add labels to the block.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }
}

/// A standalone comment entry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Comment {
    pub id: NodeId,
    pub pos: Position,
    /// Position just past the last comment line, used by the attachment rule.
    pub end_pos: Position,
    pub comments: Vec<String>,
}

impl Comment {
    /// Create a comment from lines.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Comment {
            comments: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// Marker for a recursive record type in a reflected schema, printed as
/// `// (recursive)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecursiveEntry {
    pub id: NodeId,
    pub pos: Position,
}

/// A `key: value` pair inside a map literal.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub id: NodeId,
    pub pos: Position,
    pub key: Value,
    pub value: Value,
    pub comments: Vec<String>,
}

impl MapEntry {
    /// Create a map entry.
    pub fn new(key: Value, value: Value) -> Self {
        MapEntry {
            id: NodeId::UNSET,
            pos: Position::default(),
            key,
            value,
            comments: Vec::new(),
        }
    }
}

/// A value: scalar, list, or map.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(BoolValue),
    Number(NumberValue),
    Str(StringValue),
    Heredoc(HeredocValue),
    List(ListValue),
    Map(MapValue),
    /// A type keyword (`string`, `number`, `boolean`), as used by schemas.
    Type(TypeValue),
    /// A call-shaped value (`default("x")`); appears only transiently while
    /// parsing schema-constraint suffixes.
    Call(CallValue),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoolValue {
    pub id: NodeId,
    pub pos: Position,
    pub value: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NumberValue {
    pub id: NodeId,
    pub pos: Position,
    pub value: Number,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StringValue {
    pub id: NodeId,
    pub pos: Position,
    pub value: String,
}

/// A heredoc literal. `doc` is the raw body, including the newline after the
/// opener line; [`HeredocValue::content`] applies the dedent rule.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeredocValue {
    pub id: NodeId,
    pub pos: Position,
    /// Delimiter as written, retaining a leading `-` if present.
    pub delimiter: String,
    /// Raw body text.
    pub doc: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListValue {
    pub id: NodeId,
    pub pos: Position,
    pub elements: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapValue {
    pub id: NodeId,
    pub pos: Position,
    pub entries: Vec<MapEntry>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeValue {
    pub id: NodeId,
    pub pos: Position,
    /// One of `string`, `number`, `boolean`.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CallValue {
    pub id: NodeId,
    pub pos: Position,
    pub args: Vec<Value>,
}

impl HeredocValue {
    /// The logical string content of the heredoc.
    ///
    /// The newline following the opener line is dropped. If the delimiter was
    /// written with a leading `-`, the minimum leading-whitespace prefix
    /// across the body lines is stripped from each line.
    pub fn content(&self) -> String {
        let doc = self.doc.strip_prefix('\n').unwrap_or(&self.doc);
        if self.delimiter.starts_with('-') {
            dedent(doc)
        } else {
            doc.to_string()
        }
    }

    /// The delimiter without its indentation marker, as printed on the
    /// closing line.
    pub fn closing_delimiter(&self) -> &str {
        self.delimiter.strip_prefix('-').unwrap_or(&self.delimiter)
    }
}

/// Strip the minimum leading-whitespace prefix shared by all lines.
pub(crate) fn dedent(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    let indent = s
        .split('\n')
        .map(|line| {
            line.bytes()
                .take_while(|b| *b == b' ' || *b == b'\t')
                .count()
        })
        .min()
        .unwrap_or(0);
    s.split('\n')
        .map(|line| &line[indent.min(line.len())..])
        .collect::<Vec<_>>()
        .join("\n")
}

impl Value {
    /// Create a bool value.
    pub fn bool(value: bool) -> Self {
        Value::Bool(BoolValue {
            value,
            ..BoolValue::default()
        })
    }

    /// Create a number value.
    pub fn number(value: impl Into<Number>) -> Self {
        Value::Number(NumberValue {
            value: value.into(),
            ..NumberValue::default()
        })
    }

    /// Create a string value.
    pub fn str(value: impl Into<String>) -> Self {
        Value::Str(StringValue {
            value: value.into(),
            ..StringValue::default()
        })
    }

    /// Create a heredoc value from its logical content. The body is stored
    /// with the conventional leading newline.
    pub fn heredoc(delimiter: impl Into<String>, content: &str) -> Self {
        Value::Heredoc(HeredocValue {
            delimiter: delimiter.into(),
            doc: format!("\n{content}"),
            ..HeredocValue::default()
        })
    }

    /// Create a list value.
    pub fn list(elements: Vec<Value>) -> Self {
        Value::List(ListValue {
            elements,
            ..ListValue::default()
        })
    }

    /// Create a map value.
    pub fn map(entries: Vec<MapEntry>) -> Self {
        Value::Map(MapValue {
            entries,
            ..MapValue::default()
        })
    }

    /// Create a type-keyword value.
    pub fn type_keyword(name: impl Into<String>) -> Self {
        Value::Type(TypeValue {
            name: name.into(),
            ..TypeValue::default()
        })
    }

    /// Source position.
    pub fn pos(&self) -> Position {
        match self {
            Value::Bool(v) => v.pos,
            Value::Number(v) => v.pos,
            Value::Str(v) => v.pos,
            Value::Heredoc(v) => v.pos,
            Value::List(v) => v.pos,
            Value::Map(v) => v.pos,
            Value::Type(v) => v.pos,
            Value::Call(v) => v.pos,
        }
    }

    /// Node id.
    pub fn id(&self) -> NodeId {
        match self {
            Value::Bool(v) => v.id,
            Value::Number(v) => v.id,
            Value::Str(v) => v.id,
            Value::Heredoc(v) => v.id,
            Value::List(v) => v.id,
            Value::Map(v) => v.id,
            Value::Type(v) => v.id,
            Value::Call(v) => v.id,
        }
    }

    fn set_id(&mut self, id: NodeId) {
        match self {
            Value::Bool(v) => v.id = id,
            Value::Number(v) => v.id = id,
            Value::Str(v) => v.id = id,
            Value::Heredoc(v) => v.id = id,
            Value::List(v) => v.id = id,
            Value::Map(v) => v.id = id,
            Value::Type(v) => v.id = id,
            Value::Call(v) => v.id = id,
        }
    }

    /// String content, for string values only.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(&s.value),
            _ => None,
        }
    }

    /// String content for anything string-shaped: strings, type keywords,
    /// and heredocs (dedented).
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Str(s) => Some(s.value.clone()),
            Value::Type(t) => Some(t.name.clone()),
            Value::Heredoc(h) => Some(h.content()),
            _ => None,
        }
    }

    /// Bool content.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(b.value),
            _ => None,
        }
    }

    /// Number content.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(n.value),
            _ => None,
        }
    }

    /// List elements.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(&l.elements),
            _ => None,
        }
    }

    /// Map entries.
    pub fn as_map(&self) -> Option<&[MapEntry]> {
        match self {
            Value::Map(m) => Some(&m.entries),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b.value),
            Value::Number(n) => write!(f, "{}", n.value),
            Value::Str(s) => write!(f, "{:?}", s.value),
            Value::Type(t) => write!(f, "{}", t.name),
            Value::Heredoc(h) => {
                write!(f, "<<{}{}\n{}", h.delimiter, h.doc, h.closing_delimiter())
            }
            Value::List(l) => {
                write!(f, "[")?;
                for (i, element) in l.elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, "]")
            }
            Value::Map(m) => {
                write!(f, "{{")?;
                for (i, entry) in m.entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", entry.key, entry.value)?;
                }
                write!(f, "}}")
            }
            Value::Call(c) => {
                write!(f, "(")?;
                for (i, arg) in c.args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A numeric value.
///
/// Integers that fit `i64`/`u64` keep their integral representation so that
/// printing is canonical; everything else is an `f64`. Comparison is
/// numeric, so `1` parsed from canonical output equals a `1.0` that produced
/// it.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    Uint(u64),
    Float(f64),
}

impl Default for Number {
    fn default() -> Self {
        Number::Int(0)
    }
}

impl Number {
    /// Value as `i64`, truncating toward zero.
    pub fn as_i64(&self) -> i64 {
        match *self {
            Number::Int(i) => i,
            Number::Uint(u) => u.min(i64::MAX as u64) as i64,
            Number::Float(f) => f.trunc() as i64,
        }
    }

    /// Value as `u64`, truncating toward zero; negative values clamp to zero.
    pub fn as_u64(&self) -> u64 {
        match *self {
            Number::Int(i) => i.max(0) as u64,
            Number::Uint(u) => u,
            Number::Float(f) => {
                if f <= 0.0 {
                    0
                } else {
                    f.trunc() as u64
                }
            }
        }
    }

    /// Value as `f64`.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(i) => i as f64,
            Number::Uint(u) => u as f64,
            Number::Float(f) => f,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (Number::Uint(a), Number::Uint(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => a == b,
            // Mixed representations compare numerically: a float that prints
            // without a fractional part reparses as an integer.
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Uint(u) => write!(f, "{u}"),
            Number::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Number::Int(v)
    }
}

impl From<u64> for Number {
    fn from(v: u64) -> Self {
        if v <= i64::MAX as u64 {
            Number::Int(v as i64)
        } else {
            Number::Uint(v)
        }
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Number::Float(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedent() {
        assert_eq!(dedent(""), "");
        assert_eq!(dedent("\n  "), "\n  ");
        assert_eq!(dedent("  \n  "), "\n");
        assert_eq!(dedent("    \n  "), "  \n");
    }

    #[test]
    fn test_heredoc_content_indented() {
        let value = HeredocValue {
            delimiter: "-EOF".into(),
            doc: "\n    hello\n  world".into(),
            ..HeredocValue::default()
        };
        assert_eq!(value.content(), "  hello\nworld");
    }

    #[test]
    fn test_heredoc_content_plain() {
        let value = HeredocValue {
            delimiter: "EOF".into(),
            doc: "\n  hello\n  world".into(),
            ..HeredocValue::default()
        };
        assert_eq!(value.content(), "  hello\n  world");
    }

    #[test]
    fn test_number_display() {
        assert_eq!(Number::Int(0).to_string(), "0");
        assert_eq!(Number::Int(-1).to_string(), "-1");
        assert_eq!(Number::Float(1.234).to_string(), "1.234");
        assert_eq!(Number::Float(1.0).to_string(), "1");
    }

    #[test]
    fn test_number_mixed_eq() {
        assert_eq!(Number::Int(1), Number::Float(1.0));
        assert_ne!(Number::Int(1), Number::Float(1.5));
    }

    #[test]
    fn test_value_display() {
        let value = Value::map(vec![
            MapEntry::new(Value::str("a"), Value::number(1i64)),
            MapEntry::new(Value::str("b"), Value::str("str")),
        ]);
        assert_eq!(value.to_string(), r#"{"a": 1, "b": "str"}"#);
        let value = Value::list(vec![Value::number(1i64), Value::number(2i64)]);
        assert_eq!(value.to_string(), "[1, 2]");
    }

    #[test]
    fn test_detach() {
        let mut ast = Ast::from_entries(vec![
            Block::new("one", vec![]).into(),
            Block::new("two", vec![]).into(),
            Block::new("three", vec![]).into(),
        ]);
        ast.add_parent_refs();
        let id = ast.entries[1].id();
        assert!(ast.detach(id));
        assert_eq!(ast.entries.len(), 2);
        assert_eq!(ast.entries[0].key(), "one");
        assert_eq!(ast.entries[1].key(), "three");
        // A second detach of the same id is a no-op.
        assert!(!ast.detach(id));
    }

    #[test]
    fn test_parent_refs() {
        let mut ast = Ast::from_entries(vec![Block::new(
            "outer",
            vec![Attribute::new("inner", Value::str("v")).into()],
        )
        .into()]);
        ast.add_parent_refs();
        let outer = ast.entries[0].id();
        let inner = ast.entries[0].as_block().unwrap().body[0].id();
        assert_eq!(ast.parent_of(outer), Some(ast.id));
        assert_eq!(ast.parent_of(inner), Some(outer));
        assert_eq!(ast.parent_of(NodeId(999)), None);
    }
}
