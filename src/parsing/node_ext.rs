//! Thin helpers over `tree_sitter::Node`.
//!
//! The rest of the crate goes through these accessors so resolvers never
//! deal with byte offsets or UTF-8 slicing directly.

use crate::types::Range;
use tree_sitter::Node;

pub trait NodeExt<'t> {
    /// Row/column rectangle of this node, 0-based.
    fn to_range(&self) -> Range;

    /// UTF-8 text of the node, empty on invalid slices.
    fn text<'s>(&self, source: &'s [u8]) -> &'s str;

    /// Walk `parent()` links until a node whose kind is in `kinds`.
    fn ancestor_of_kind(&self, kinds: &[&str]) -> Option<Node<'t>>;

    /// Same, but give up after `max_depth` parents.
    fn ancestor_within(&self, kinds: &[&str], max_depth: usize) -> Option<Node<'t>>;
}

impl<'t> NodeExt<'t> for Node<'t> {
    fn to_range(&self) -> Range {
        let start = self.start_position();
        let end = self.end_position();
        Range {
            start_row: start.row as u32,
            start_col: start.column as u32,
            end_row: end.row as u32,
            end_col: end.column as u32,
        }
    }

    fn text<'s>(&self, source: &'s [u8]) -> &'s str {
        self.utf8_text(source).unwrap_or("")
    }

    fn ancestor_of_kind(&self, kinds: &[&str]) -> Option<Node<'t>> {
        self.ancestor_within(kinds, usize::MAX)
    }

    fn ancestor_within(&self, kinds: &[&str], max_depth: usize) -> Option<Node<'t>> {
        let mut current = self.parent();
        let mut depth = 0usize;
        while let Some(node) = current {
            if kinds.contains(&node.kind()) {
                return Some(node);
            }
            depth += 1;
            if depth >= max_depth {
                return None;
            }
            current = node.parent();
        }
        None
    }
}
