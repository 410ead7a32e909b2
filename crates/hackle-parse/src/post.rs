//! Comment post-processing.
//!
//! Runs after parsing, per entries slice:
//!
//! 1. A comment whose last line directly precedes the next entry's first
//!    line attaches to that entry and leaves the slice.
//! 2. A comment left at the end of a slice becomes the container's trailing
//!    comments.
//! 3. Remaining (detached) comments are stripped unless the parse options
//!    ask to keep them.

use hackle_ast::{Ast, Entry};

use crate::ParseOptions;

pub fn process(ast: &mut Ast, options: &ParseOptions) {
    attach_comments(&mut ast.entries);
    extract_trailing(&mut ast.entries, &mut ast.trailing_comments);
    if !options.detached_comments {
        strip_detached(&mut ast.entries);
    }
}

/// Promote line-adjacent comments onto the entry they precede.
fn attach_comments(entries: &mut Vec<Entry>) {
    let mut index = 0;
    while index < entries.len() {
        let attach = match (&entries[index], entries.get(index + 1)) {
            (Entry::Comment(comment), Some(next)) => {
                matches!(next, Entry::Attribute(_) | Entry::Block(_))
                    && comment.end_pos.line + 1 == next.pos().line
            }
            _ => false,
        };
        if attach {
            let comment = match entries.remove(index) {
                Entry::Comment(comment) => comment,
                _ => unreachable!("checked above"),
            };
            match &mut entries[index] {
                Entry::Attribute(attr) => {
                    attr.comments.splice(0..0, comment.comments);
                }
                Entry::Block(block) => {
                    block.comments.splice(0..0, comment.comments);
                }
                _ => unreachable!("checked above"),
            }
            // Do not advance: the entry now at `index` may itself be
            // preceded by an earlier comment in a later pass shape.
            continue;
        }
        if let Entry::Block(block) = &mut entries[index] {
            attach_comments(&mut block.body);
        }
        index += 1;
    }
}

/// Move a final comment entry into the container's trailing comments.
fn extract_trailing(entries: &mut Vec<Entry>, trailing: &mut Vec<String>) {
    if matches!(entries.last(), Some(Entry::Comment(_))) {
        if let Some(Entry::Comment(comment)) = entries.pop() {
            *trailing = comment.comments;
        }
    }
    for entry in entries {
        if let Entry::Block(block) = entry {
            let mut block_trailing = Vec::new();
            extract_trailing(&mut block.body, &mut block_trailing);
            block.trailing_comments = block_trailing;
        }
    }
}

/// Drop any comment entries still in the tree.
fn strip_detached(entries: &mut Vec<Entry>) {
    entries.retain(|entry| !matches!(entry, Entry::Comment(_)));
    for entry in entries {
        if let Entry::Block(block) = entry {
            strip_detached(&mut block.body);
        }
    }
}
