//! Text to structure: classification and parent resolution in one pass.
//!
//! [`parse`] folds a [`LineClassifier`] and an [`IndentStack`] over the lines
//! of a document and hands the resulting records and edges to the tree. The
//! stack resets at every mode boundary; that reset is what scopes
//! indentation to its mode and keeps list indent, quote depth and callout
//! depth from resolving against each other.

mod classify;
mod stack;

use std::collections::BTreeMap;

use crate::tree::{LineTree, NodeId, NodeSet};

pub use classify::{LineClassifier, LineKind, LineMode, LineNode};
use stack::IndentStack;

/// Parses a full document into a [`LineTree`].
///
/// One forward pass: classify the line, reset the stack if the mode changed,
/// place the line at its indent, and record the parent/child edge (or root,
/// or orphan) the placement yields. Blank lines are recorded but never
/// placed; nothing may attach to them.
pub fn parse(text: &str) -> LineTree {
    let mut classifier = LineClassifier::new();
    let mut stack = IndentStack::new();
    let mut nodes = BTreeMap::new();
    let mut children: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
    let mut parent = BTreeMap::new();
    let mut roots = NodeSet::new();
    let mut prev_mode = LineMode::None;

    for (line_no, raw) in text.lines().enumerate() {
        let node = classifier.classify(line_no, raw);
        if node.mode != prev_mode {
            stack.reset();
        }
        prev_mode = node.mode;

        if node.kind == LineKind::Blank {
            roots.insert(node.id);
        } else {
            match stack.place(node.indent, node.id) {
                Some(p) => {
                    children.entry(p).or_default().push(node.id);
                    parent.insert(node.id, p);
                }
                None if node.indent == 0 => {
                    roots.insert(node.id);
                }
                // Deeper lines with no resolvable parent stay orphans:
                // unparented and not roots.
                None => {}
            }
        }
        nodes.insert(node.id, node);
    }

    LineTree::assemble(nodes, children, parent, roots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(n: usize) -> NodeId {
        NodeId::from_line(n)
    }

    #[test]
    fn mode_boundary_discards_cross_mode_nesting() {
        // The quote cannot nest under the list; its mode reset the stack.
        let tree = parse("- a\n  - b\n> q");
        assert_eq!(tree.parent(id(2)), None);
        assert!(tree.roots().contains(&id(2)));
    }

    #[test]
    fn blank_line_splits_a_list_into_two_trees() {
        let tree = parse("- a\n  - b\n\n  - c");
        assert_eq!(tree.parent(id(1)), Some(id(0)));
        // After the blank the stack is fresh; the indented bullet has no
        // shallower ancestor left.
        assert_eq!(tree.parent(id(3)), None);
        assert!(!tree.roots().contains(&id(3)));
    }

    #[test]
    fn table_rows_flatten_under_their_header() {
        let tree = parse("|h1|h2|\n|---|---|\n|a|b|\n|c|d|");
        assert_eq!(tree.children(id(0)), &[id(1), id(2), id(3)]);
        assert_eq!(tree.parent(id(3)), Some(id(0)));
    }

    #[test]
    fn ordered_and_unordered_items_nest_together() {
        let tree = parse("1. first\n  - sub");
        assert_eq!(tree.parent(id(1)), Some(id(0)));
    }

    #[test]
    fn frontmatter_lines_are_flat_roots() {
        let tree = parse("---\ntitle: x\n---");
        assert_eq!(tree.roots().len(), 3);
        assert!(tree.nodes().all(|n| n.mode == LineMode::Frontmatter));
    }

    #[test]
    fn empty_document_parses_to_empty_tree() {
        let tree = parse("");
        assert!(tree.is_empty());
        assert!(tree.roots().is_empty());
    }
}
