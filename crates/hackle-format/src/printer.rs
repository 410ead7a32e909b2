//! The canonical text form of an AST.

use hackle_ast::{Ast, Attribute, Block, Entry, RecursiveEntry, Value};

use crate::options::FormatOptions;
use crate::scalar::{is_ident, quote};

/// Printer for a single document.
pub struct Printer {
    out: String,
    options: FormatOptions,
}

impl Printer {
    pub fn new(options: FormatOptions) -> Self {
        Self {
            out: String::new(),
            options,
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    pub fn print_ast(&mut self, ast: &Ast) {
        self.print_entries(&ast.entries, "");
        if !ast.trailing_comments.is_empty() {
            if !ast.entries.is_empty() {
                self.out.push('\n');
            }
            self.print_comments(&ast.trailing_comments, "");
        }
    }

    /// Entry separation: consecutive attributes sit on adjacent lines;
    /// blocks (and standalone comments) get a blank line on both sides.
    pub fn print_entries(&mut self, entries: &[Entry], indent: &str) {
        let mut prev_attr = true;
        for (i, entry) in entries.iter().enumerate() {
            match entry {
                Entry::Block(block) => {
                    if i > 0 {
                        self.out.push('\n');
                    }
                    self.print_block(block, indent);
                    prev_attr = false;
                }
                Entry::Comment(comment) => {
                    if i > 0 {
                        self.out.push('\n');
                    }
                    self.print_comments(&comment.comments, indent);
                    prev_attr = false;
                }
                Entry::Attribute(attr) => {
                    if !prev_attr {
                        self.out.push('\n');
                    }
                    self.print_attribute(attr, indent);
                    prev_attr = true;
                }
                Entry::Recursive(rec) => {
                    self.print_recursive(rec, indent);
                    prev_attr = true;
                }
            }
        }
    }

    pub fn print_attribute(&mut self, attr: &Attribute, indent: &str) {
        self.print_comments(&attr.comments, indent);
        self.out.push_str(indent);
        self.out.push_str(&attr.key);
        if let Some(value) = &attr.value {
            self.out.push_str(" = ");
            self.print_value(value, indent);
        }
        self.print_constraints(attr);
        self.out.push('\n');
    }

    /// Schema constraints print as one parenthesized group appended to a
    /// type-descriptor value; they are dropped from literal values.
    fn print_constraints(&mut self, attr: &Attribute) {
        if !matches!(attr.value, Some(Value::Type(_))) {
            return;
        }
        let mut parts = Vec::new();
        if attr.optional {
            parts.push("optional".to_string());
        }
        if let Some(default) = &attr.default {
            parts.push(format!("default({})", self.render_value(default, "")));
        }
        if !attr.enum_values.is_empty() {
            let values: Vec<String> = attr
                .enum_values
                .iter()
                .map(|value| self.render_value(value, ""))
                .collect();
            parts.push(format!("enum({})", values.join(", ")));
        }
        if !parts.is_empty() {
            self.out.push('(');
            self.out.push_str(&parts.join(" "));
            self.out.push(')');
        }
    }

    pub fn print_block(&mut self, block: &Block, indent: &str) {
        self.print_comments(&block.comments, indent);
        self.out.push_str(indent);
        self.out.push_str(&block.name);
        if block.repeated {
            self.out.push_str("(repeated)");
        }
        self.print_labels(block, indent);
        self.out.push_str(" {");
        if block.body.is_empty() && block.trailing_comments.is_empty() {
            self.out.push_str("}\n");
            return;
        }
        self.out.push('\n');
        let inner = format!("{}{}", indent, self.options.indent);
        self.print_entries(&block.body, &inner);
        if !block.trailing_comments.is_empty() {
            if !block.body.is_empty() {
                self.out.push('\n');
            }
            self.print_comments(&block.trailing_comments, &inner);
        }
        self.out.push_str(indent);
        self.out.push_str("}\n");
    }

    /// Labels print bare when ident-legal, quoted otherwise, and wrap at
    /// the configured width onto a continuation line indented to the block
    /// name.
    fn print_labels(&mut self, block: &Block, indent: &str) {
        let mut header_width = indent.len() + block.name.len();
        if block.repeated {
            header_width += "(repeated)".len();
        }
        let continuation = " ".repeat(indent.len() + block.name.len() + 1);
        let mut line_width = header_width;
        for label in &block.labels {
            let rendered = if is_ident(label) {
                label.clone()
            } else {
                quote(label)
            };
            if line_width > self.options.max_width {
                self.out.push('\n');
                self.out.push_str(&continuation);
                self.out.push_str(&rendered);
                line_width = continuation.len() + rendered.len();
            } else {
                self.out.push(' ');
                self.out.push_str(&rendered);
                line_width += 1 + rendered.len();
            }
        }
    }

    fn print_recursive(&mut self, _rec: &RecursiveEntry, indent: &str) {
        self.out.push_str(indent);
        self.out.push_str("// (recursive)\n");
    }

    pub fn print_value(&mut self, value: &Value, indent: &str) {
        let rendered = self.render_value(value, indent);
        self.out.push_str(&rendered);
    }

    fn render_value(&self, value: &Value, indent: &str) -> String {
        match value {
            Value::Bool(b) => b.value.to_string(),
            Value::Number(n) => n.value.to_string(),
            Value::Str(s) => quote(&s.value),
            Value::Type(t) => t.name.clone(),
            Value::Heredoc(h) => {
                format!("<<{}{}\n{}", h.delimiter, h.doc, h.closing_delimiter())
            }
            Value::List(list) => {
                let elements: Vec<String> = list
                    .elements
                    .iter()
                    .map(|element| self.render_value(element, indent))
                    .collect();
                format!("[{}]", elements.join(", "))
            }
            Value::Map(map) => {
                let inner = format!("{}{}", indent, self.options.indent);
                let mut out = String::from("{\n");
                for entry in &map.entries {
                    for line in &entry.comments {
                        out.push_str(&inner);
                        out.push_str("// ");
                        out.push_str(line);
                        out.push('\n');
                    }
                    out.push_str(&inner);
                    out.push_str(&self.render_value(&entry.key, &inner));
                    out.push_str(": ");
                    out.push_str(&self.render_value(&entry.value, &inner));
                    out.push_str(",\n");
                }
                out.push_str(indent);
                out.push('}');
                out
            }
            Value::Call(call) => {
                let args: Vec<String> = call
                    .args
                    .iter()
                    .map(|arg| self.render_value(arg, indent))
                    .collect();
                format!("({})", args.join(", "))
            }
        }
    }

    fn print_comments(&mut self, comments: &[String], indent: &str) {
        for line in comments {
            self.out.push_str(indent);
            self.out.push_str("// ");
            self.out.push_str(line);
            self.out.push('\n');
        }
    }
}
