//! JSON projections of the AST.
//!
//! Two forms are provided. The tagged form ([`to_json`], and `serde`
//! `Serialize` on the node types) renders the document as an array of
//! single-key entry objects (`{"attribute": …}` / `{"block": …}`) carrying
//! the node payloads. The nested-object form ([`to_json_object`]) folds
//! block labels into nested object keys and attribute keys into leaves, the
//! shape consumers of generated configuration usually want.

use std::convert::Infallible;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::node::{Ast, Attribute, Block, Entry, Value};
use crate::visit::{visit, Children, Node, Visitor};

/// Render the tagged entry-array form.
pub fn to_json(ast: &Ast) -> serde_json::Result<String> {
    serde_json::to_string(ast)
}

/// Render the tagged entry-array form with indentation.
pub fn to_json_pretty(ast: &Ast) -> serde_json::Result<String> {
    serde_json::to_string_pretty(ast)
}

impl Serialize for Ast {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for entry in &self.entries {
            seq.serialize_element(entry)?;
        }
        seq.end()
    }
}

impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Entry::Attribute(attr) => map.serialize_entry("attribute", attr.as_ref())?,
            Entry::Block(block) => map.serialize_entry("block", block.as_ref())?,
            Entry::Comment(comment) => {
                map.serialize_entry("comment", &CommentPayload(&comment.comments))?
            }
            Entry::Recursive(_) => map.serialize_entry("recursive", &EmptyPayload)?,
        }
        map.end()
    }
}

struct CommentPayload<'a>(&'a [String]);

impl Serialize for CommentPayload<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("comments", self.0)?;
        map.end()
    }
}

struct EmptyPayload;

impl Serialize for EmptyPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_map(Some(0))?.end()
    }
}

impl Serialize for Attribute {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if !self.comments.is_empty() {
            map.serialize_entry("comments", &self.comments)?;
        }
        map.serialize_entry("key", &self.key)?;
        if let Some(value) = &self.value {
            map.serialize_entry("value", value)?;
        }
        if let Some(default) = &self.default {
            map.serialize_entry("default", default)?;
        }
        if !self.enum_values.is_empty() {
            map.serialize_entry("enum", &self.enum_values)?;
        }
        if self.optional {
            map.serialize_entry("optional", &true)?;
        }
        map.end()
    }
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if !self.comments.is_empty() {
            map.serialize_entry("comments", &self.comments)?;
        }
        map.serialize_entry("name", &self.name)?;
        if !self.labels.is_empty() {
            map.serialize_entry("labels", &self.labels)?;
        }
        if !self.body.is_empty() {
            map.serialize_entry("body", &self.body)?;
        }
        if self.repeated {
            map.serialize_entry("repeated", &true)?;
        }
        map.end()
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Bool(b) => serializer.serialize_bool(b.value),
            Value::Number(n) => match n.value {
                crate::node::Number::Int(i) => serializer.serialize_i64(i),
                crate::node::Number::Uint(u) => serializer.serialize_u64(u),
                crate::node::Number::Float(f) => serializer.serialize_f64(f),
            },
            Value::Str(s) => serializer.serialize_str(&s.value),
            Value::Heredoc(h) => serializer.serialize_str(&h.content()),
            Value::Type(t) => serializer.serialize_str(&t.name),
            Value::List(list) => {
                let mut seq = serializer.serialize_seq(Some(list.elements.len()))?;
                for element in &list.elements {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            Value::Map(map_value) => {
                let mut map = serializer.serialize_map(Some(map_value.entries.len()))?;
                for entry in &map_value.entries {
                    let key = entry
                        .key
                        .as_text()
                        .unwrap_or_else(|| entry.key.to_string());
                    map.serialize_entry(&key, &entry.value)?;
                }
                map.end()
            }
            Value::Call(call) => {
                let mut seq = serializer.serialize_seq(Some(call.args.len()))?;
                for arg in &call.args {
                    seq.serialize_element(arg)?;
                }
                seq.end()
            }
        }
    }
}

/// Render the nested-object form. With `include_comments`, attached comments
/// surface as `__comments__` (blocks) and `__<key>_comments__` (attributes)
/// synthetic fields.
pub fn to_json_object(ast: &Ast, include_comments: bool) -> String {
    let mut projector = ObjectProjector {
        out: String::new(),
        comments: include_comments,
    };
    match visit(Node::Ast(ast), &mut projector) {
        Ok(()) => projector.out,
        Err(never) => match never {},
    }
}

struct ObjectProjector {
    out: String,
    comments: bool,
}

impl ObjectProjector {
    fn push_str_json(&mut self, s: &str) {
        self.out
            .push_str(&serde_json::Value::String(s.to_string()).to_string());
    }

    fn push_comments(&mut self, comments: &[String]) {
        let lines: Vec<serde_json::Value> = comments
            .iter()
            .map(|line| serde_json::Value::String(line.clone()))
            .collect();
        self.out.push_str(&serde_json::Value::Array(lines).to_string());
    }

    fn write_value(&mut self, value: &Value) {
        match value {
            Value::Bool(b) => self.out.push_str(if b.value { "true" } else { "false" }),
            Value::Number(n) => self.out.push_str(&n.value.to_string()),
            Value::Str(s) => self.push_str_json(&s.value),
            Value::Heredoc(h) => self.push_str_json(&h.content()),
            Value::Type(t) => self.push_str_json(&t.name),
            Value::List(list) => {
                self.out.push('[');
                for (i, element) in list.elements.iter().enumerate() {
                    if i > 0 {
                        self.out.push(',');
                    }
                    self.write_value(element);
                }
                self.out.push(']');
            }
            Value::Map(map) => {
                self.out.push('{');
                for (i, entry) in map.entries.iter().enumerate() {
                    if i > 0 {
                        self.out.push(',');
                    }
                    let key = entry
                        .key
                        .as_text()
                        .unwrap_or_else(|| entry.key.to_string());
                    self.push_str_json(&key);
                    self.out.push(':');
                    self.write_value(&entry.value);
                }
                self.out.push('}');
            }
            Value::Call(call) => {
                self.out.push('[');
                for (i, arg) in call.args.iter().enumerate() {
                    if i > 0 {
                        self.out.push(',');
                    }
                    self.write_value(arg);
                }
                self.out.push(']');
            }
        }
    }

    fn write_entries(&mut self, entries: &[Entry]) {
        let mut first = true;
        for entry in entries {
            if matches!(entry, Entry::Comment(_) | Entry::Recursive(_)) {
                continue;
            }
            if !first {
                self.out.push(',');
            }
            first = false;
            match visit(Node::from_entry(entry), self) {
                Ok(()) => {}
                Err(never) => match never {},
            }
        }
    }
}

impl<'a> Visitor<'a> for ObjectProjector {
    type Error = Infallible;

    fn visit(&mut self, node: Node<'a>, children: Children<'a>) -> Result<(), Infallible> {
        match node {
            Node::Ast(ast) => {
                self.out.push('{');
                self.write_entries(&ast.entries);
                self.out.push('}');
            }
            Node::Block(block) => {
                self.push_str_json(&block.name);
                self.out.push_str(":{");
                if self.comments && !block.comments.is_empty() {
                    self.out.push_str("\"__comments__\":");
                    self.push_comments(&block.comments);
                    self.out.push(',');
                }
                for label in &block.labels {
                    self.push_str_json(label);
                    self.out.push_str(":{");
                }
                self.write_entries(&block.body);
                for _ in &block.labels {
                    self.out.push('}');
                }
                self.out.push('}');
            }
            Node::Attribute(attr) => {
                if self.comments && !attr.comments.is_empty() {
                    self.push_str_json(&format!("__{}_comments__", attr.key));
                    self.out.push(':');
                    self.push_comments(&attr.comments);
                    self.out.push(',');
                }
                self.push_str_json(&attr.key);
                self.out.push(':');
                match &attr.value {
                    Some(value) => self.write_value(value),
                    None => self.out.push_str("null"),
                }
                // The value was written directly; nothing left to descend
                // into, so the continuation goes unused on purpose.
                drop(children);
            }
            Node::Comment(_) | Node::Recursive(_) => {}
            Node::Value(value) => self.write_value(value),
            Node::MapEntry(_) => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Attribute, Block, MapEntry};

    fn sample() -> Ast {
        let mut true_attr = Attribute::new("true_bool", Value::bool(true));
        true_attr.comments.push("Some comment on true_bool.".into());
        let mut block = Block::new(
            "block",
            vec![
                Attribute::new("empty_list", Value::list(vec![])).into(),
                Attribute::new("empty_map", Value::map(vec![])).into(),
            ],
        )
        .with_labels(["label"]);
        block.comments.push("A block.".into());
        Ast::from_entries(vec![
            true_attr.into(),
            Attribute::new("str", Value::str("string")).into(),
            Attribute::new("float", Value::number(1.234)).into(),
            Attribute::new("list", Value::list(vec![
                Value::number(1i64),
                Value::number(2i64),
                Value::number(3i64),
            ]))
            .into(),
            Attribute::new(
                "map",
                Value::map(vec![
                    MapEntry::new(Value::str("a"), Value::number(1i64)),
                    MapEntry::new(Value::str("b"), Value::str("str")),
                ]),
            )
            .into(),
            block.into(),
        ])
    }

    #[test]
    fn test_object_projection() {
        let expected = concat!(
            "{\"true_bool\":true,\"str\":\"string\",\"float\":1.234,",
            "\"list\":[1,2,3],\"map\":{\"a\":1,\"b\":\"str\"},",
            "\"block\":{\"label\":{\"empty_list\":[],\"empty_map\":{}}}}",
        );
        assert_eq!(to_json_object(&sample(), false), expected);
    }

    #[test]
    fn test_object_projection_with_comments() {
        let out = to_json_object(&sample(), true);
        assert!(out.starts_with(
            "{\"__true_bool_comments__\":[\"Some comment on true_bool.\"],\"true_bool\":true"
        ));
        assert!(out.contains("\"block\":{\"__comments__\":[\"A block.\"],\"label\":{"));
    }

    #[test]
    fn test_tagged_projection() {
        let ast = Ast::from_entries(vec![
            Attribute::new("str", Value::str("x")).into(),
            Block::new("b", vec![]).with_labels(["l"]).into(),
        ]);
        let json = to_json(&ast).unwrap();
        assert_eq!(
            json,
            "[{\"attribute\":{\"key\":\"str\",\"value\":\"x\"}},{\"block\":{\"name\":\"b\",\"labels\":[\"l\"]}}]"
        );
    }

    #[test]
    fn test_tagged_projection_round_trips_as_json() {
        let json = to_json(&sample()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.is_array());
    }
}
