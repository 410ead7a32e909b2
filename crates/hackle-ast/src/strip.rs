//! Removing attached comments from a tree.

use crate::node::{Ast, Entry, Value};

/// Clear attached comment lines on attributes, blocks, and map entries,
/// recursively. Detached comment entries and containers' trailing comments
/// are left alone.
pub fn strip_comments(ast: &mut Ast) {
    strip_entries(&mut ast.entries);
}

/// Clear attached comments below a single entry.
pub fn strip_entry_comments(entry: &mut Entry) {
    strip_entry(entry);
}

fn strip_entries(entries: &mut [Entry]) {
    for entry in entries {
        strip_entry(entry);
    }
}

fn strip_entry(entry: &mut Entry) {
    match entry {
        Entry::Attribute(attr) => {
            attr.comments.clear();
            if let Some(value) = &mut attr.value {
                strip_value(value);
            }
        }
        Entry::Block(block) => {
            block.comments.clear();
            strip_entries(&mut block.body);
        }
        Entry::Comment(_) | Entry::Recursive(_) => {}
    }
}

fn strip_value(value: &mut Value) {
    match value {
        Value::Map(map) => {
            for entry in &mut map.entries {
                entry.comments.clear();
                strip_value(&mut entry.value);
            }
        }
        Value::List(list) => {
            for element in &mut list.elements {
                strip_value(element);
            }
        }
        _ => {}
    }
}
