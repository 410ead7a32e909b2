//! Pre-order traversal over AST nodes.
//!
//! A [`Visitor`] receives each node together with a [`Children`]
//! continuation; calling [`Children::walk`] descends into the node's
//! children, and not calling it skips the subtree. The continuation takes
//! the visitor back as an argument, which is what lets the visitor stay a
//! single `&mut` borrow through the whole traversal.

use std::convert::Infallible;

use crate::node::{
    Ast, Attribute, Block, Comment, Entry, MapEntry, NodeId, Position, RecursiveEntry, Value,
};

/// A borrowed view of any node in the tree.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Ast(&'a Ast),
    Attribute(&'a Attribute),
    Block(&'a Block),
    Comment(&'a Comment),
    Recursive(&'a RecursiveEntry),
    MapEntry(&'a MapEntry),
    Value(&'a Value),
}

impl<'a> Node<'a> {
    /// View an entry as a node.
    pub fn from_entry(entry: &'a Entry) -> Node<'a> {
        match entry {
            Entry::Attribute(attr) => Node::Attribute(attr),
            Entry::Block(block) => Node::Block(block),
            Entry::Comment(comment) => Node::Comment(comment),
            Entry::Recursive(rec) => Node::Recursive(rec),
        }
    }

    /// Source position of the node.
    pub fn pos(&self) -> Position {
        match self {
            Node::Ast(ast) => ast.pos,
            Node::Attribute(attr) => attr.pos,
            Node::Block(block) => block.pos,
            Node::Comment(comment) => comment.pos,
            Node::Recursive(rec) => rec.pos,
            Node::MapEntry(entry) => entry.pos,
            Node::Value(value) => value.pos(),
        }
    }

    /// Node id.
    pub fn id(&self) -> NodeId {
        match self {
            Node::Ast(ast) => ast.id,
            Node::Attribute(attr) => attr.id,
            Node::Block(block) => block.id,
            Node::Comment(comment) => comment.id,
            Node::Recursive(rec) => rec.id,
            Node::MapEntry(entry) => entry.id,
            Node::Value(value) => value.id(),
        }
    }

    /// Child nodes in source order.
    pub fn children(&self) -> Vec<Node<'a>> {
        match self {
            Node::Ast(ast) => ast.entries.iter().map(Node::from_entry).collect(),
            Node::Block(block) => block.body.iter().map(Node::from_entry).collect(),
            Node::Attribute(attr) => attr.value.iter().map(Node::Value).collect(),
            Node::MapEntry(entry) => vec![Node::Value(&entry.value)],
            Node::Value(Value::List(list)) => list.elements.iter().map(Node::Value).collect(),
            Node::Value(Value::Map(map)) => map.entries.iter().map(Node::MapEntry).collect(),
            Node::Value(Value::Call(call)) => call.args.iter().map(Node::Value).collect(),
            Node::Value(_) | Node::Comment(_) | Node::Recursive(_) => Vec::new(),
        }
    }
}

impl<'a> From<&'a Ast> for Node<'a> {
    fn from(ast: &'a Ast) -> Self {
        Node::Ast(ast)
    }
}

impl<'a> From<&'a Block> for Node<'a> {
    fn from(block: &'a Block) -> Self {
        Node::Block(block)
    }
}

impl<'a> From<&'a Value> for Node<'a> {
    fn from(value: &'a Value) -> Self {
        Node::Value(value)
    }
}

/// Continuation handed to [`Visitor::visit`]; descends into the current
/// node's children when invoked.
#[must_use = "children are only visited when walk() is called"]
pub struct Children<'a> {
    node: Node<'a>,
}

impl<'a> Children<'a> {
    /// Visit the children of the current node.
    pub fn walk<V>(self, visitor: &mut V) -> Result<(), V::Error>
    where
        V: Visitor<'a> + ?Sized,
    {
        for child in self.node.children() {
            visit(child, visitor)?;
        }
        Ok(())
    }
}

/// A pre-order visitor over a tree with lifetime `'a`.
pub trait Visitor<'a> {
    type Error;

    /// Called for each node. Call `children.walk(self)` to descend.
    fn visit(&mut self, node: Node<'a>, children: Children<'a>) -> Result<(), Self::Error>;
}

/// Visit `node` and, at the visitor's discretion, its descendants.
pub fn visit<'a, V>(node: Node<'a>, visitor: &mut V) -> Result<(), V::Error>
where
    V: Visitor<'a> + ?Sized,
{
    visitor.visit(node, Children { node })
}

struct Finder<'a, 'n> {
    names: &'n [&'n str],
    found: Vec<Node<'a>>,
}

impl<'a> Visitor<'a> for Finder<'a, '_> {
    type Error = Infallible;

    fn visit(&mut self, node: Node<'a>, children: Children<'a>) -> Result<(), Self::Error> {
        let matched = match node {
            Node::Block(block) => self.names.contains(&block.name.as_str()),
            Node::Attribute(attr) => self.names.contains(&attr.key.as_str()),
            Node::MapEntry(entry) => entry
                .key
                .as_str()
                .is_some_and(|key| self.names.contains(&key)),
            _ => false,
        };
        if matched {
            self.found.push(node);
        }
        children.walk(self)
    }
}

/// Collect blocks by name, attributes by key, and map entries with a string
/// key, matching any of `names`, in pre-order.
pub fn find<'a>(node: Node<'a>, names: &[&str]) -> Vec<Node<'a>> {
    let mut finder = Finder {
        names,
        found: Vec::new(),
    };
    match visit(node, &mut finder) {
        Ok(()) => finder.found,
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Attribute, Block, Value};

    fn sample() -> Ast {
        Ast::from_entries(vec![
            Attribute::new("top", Value::str("v")).into(),
            Block::new(
                "outer",
                vec![
                    Attribute::new("inner", Value::number(1i64)).into(),
                    Block::new("outer", vec![]).into(),
                ],
            )
            .into(),
        ])
    }

    #[test]
    fn test_preorder_visit() {
        struct Collect(Vec<String>);
        impl<'a> Visitor<'a> for Collect {
            type Error = Infallible;
            fn visit(&mut self, node: Node<'a>, children: Children<'a>) -> Result<(), Infallible> {
                let tag = match node {
                    Node::Ast(_) => "ast".to_string(),
                    Node::Attribute(a) => format!("attr:{}", a.key),
                    Node::Block(b) => format!("block:{}", b.name),
                    Node::Value(v) => format!("value:{v}"),
                    _ => "other".to_string(),
                };
                self.0.push(tag);
                children.walk(self)
            }
        }
        let ast = sample();
        let mut collect = Collect(Vec::new());
        visit(Node::Ast(&ast), &mut collect).unwrap();
        assert_eq!(
            collect.0,
            vec![
                "ast",
                "attr:top",
                "value:\"v\"",
                "block:outer",
                "attr:inner",
                "value:1",
                "block:outer",
            ]
        );
    }

    #[test]
    fn test_visit_skips_children() {
        struct SkipBlocks(usize);
        impl<'a> Visitor<'a> for SkipBlocks {
            type Error = Infallible;
            fn visit(&mut self, node: Node<'a>, children: Children<'a>) -> Result<(), Infallible> {
                self.0 += 1;
                if matches!(node, Node::Block(_)) {
                    return Ok(());
                }
                children.walk(self)
            }
        }
        let ast = sample();
        let mut skip = SkipBlocks(0);
        visit(Node::Ast(&ast), &mut skip).unwrap();
        // ast + attr + value + outer block; nothing below the block.
        assert_eq!(skip.0, 4);
    }

    #[test]
    fn test_find() {
        let ast = sample();
        let found = find(Node::Ast(&ast), &["outer", "inner"]);
        assert_eq!(found.len(), 3);
        assert!(matches!(found[0], Node::Block(b) if b.name == "outer"));
        assert!(matches!(found[1], Node::Attribute(a) if a.key == "inner"));
        assert!(matches!(found[2], Node::Block(b) if b.name == "outer"));
    }

    #[test]
    fn test_find_map_entries() {
        let ast = Ast::from_entries(vec![Attribute::new(
            "map",
            Value::map(vec![crate::node::MapEntry::new(
                Value::str("needle"),
                Value::str("x"),
            )]),
        )
        .into()]);
        let found = find(Node::Ast(&ast), &["needle"]);
        assert_eq!(found.len(), 1);
        assert!(matches!(found[0], Node::MapEntry(_)));
    }
}
