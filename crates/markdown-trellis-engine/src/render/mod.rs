//! Structure back to text: the subset stringifier.
//!
//! Walks the forest depth-first from the roots (ascending id order, children
//! in stored order) and reconstructs each visited line from its stripped
//! content and mode facts. With an inclusion mask the walk stops at excluded
//! nodes instead of filtering a full traversal; only table divider rows ride
//! along with an included header.

use crate::parsing::{LineKind, LineMode, LineNode};
use crate::tree::{LineTree, NodeId, NodeSet};

const QUOTE_MARKER: &str = "> ";
const LIST_INDENT: &str = "  ";

/// Renders the forest, restricted to `mask` when one is supplied.
pub(crate) fn write_tree(tree: &LineTree, mask: Option<&NodeSet>) -> String {
    let mut out = String::new();
    for &root in tree.roots() {
        write_node(tree, root, 0, mask, &mut out);
    }
    out
}

fn write_node(
    tree: &LineTree,
    id: NodeId,
    depth: usize,
    mask: Option<&NodeSet>,
    out: &mut String,
) {
    let Some(node) = tree.node(id) else {
        return;
    };
    if let Some(m) = mask {
        if !m.contains(&id) && !divider_with_included_header(node, m) {
            return;
        }
    }
    if let Some(line) = format_line(tree, node, depth) {
        if mask.is_some() && node.first_of_mode {
            // Restore the paragraph break the mode boundary once was.
            out.push('\n');
        }
        out.push_str(&line);
        out.push('\n');
    }
    for &child in tree.children(id) {
        write_node(tree, child, depth + 1, mask, out);
    }
}

/// Divider rows are implicitly part of a visible table, whatever their own
/// mask bit says.
fn divider_with_included_header(node: &LineNode, mask: &NodeSet) -> bool {
    node.kind == LineKind::TableDivider && node.divider_header.is_some_and(|h| mask.contains(&h))
}

/// One reconstructed line, or `None` for lines that render to nothing.
fn format_line(tree: &LineTree, node: &LineNode, depth: usize) -> Option<String> {
    if node.mode == LineMode::Frontmatter {
        return None;
    }
    let line = match node.kind {
        LineKind::ListUnordered => format!("{}- {}", list_prefix(tree, node.id), node.stripped),
        LineKind::ListOrdered => format!(
            "{}{}. {}",
            list_prefix(tree, node.id),
            node.ordinal.unwrap_or(1),
            node.stripped
        ),
        // Headers carry a single marker regardless of nesting.
        LineKind::CalloutHeader => format!("{QUOTE_MARKER}{}", node.stripped),
        LineKind::Quote if node.mode == LineMode::Callout => {
            if node.quote_bullet {
                // Markers up to the callout's level, list indentation for
                // every level beyond it. The marker's own trailing space is
                // what nudges bullets one level past plain body text.
                let beyond = depth.saturating_sub(node.callout_level);
                format!(
                    "{}{}{}",
                    QUOTE_MARKER.repeat(node.callout_level),
                    LIST_INDENT.repeat(beyond),
                    node.stripped
                )
            } else {
                format!("{}{}", QUOTE_MARKER.repeat(depth), node.stripped)
            }
        }
        LineKind::Quote => format!("{}{}", QUOTE_MARKER.repeat(depth + 1), node.stripped),
        LineKind::Blank => String::new(),
        LineKind::TableHeader | LineKind::TableDivider | LineKind::TableRow | LineKind::Other => {
            node.stripped.clone()
        }
    };
    Some(line)
}

/// Indentation in front of a list item's own marker.
///
/// Two spaces per unordered ancestor; ordered ancestors contribute the width
/// of their "ordinal plus marker" text instead, so sub-items align under the
/// parent's text rather than its number.
fn list_prefix(tree: &LineTree, id: NodeId) -> String {
    let mut prefix = String::new();
    for &ancestor in tree.ancestors(id) {
        match tree.node(ancestor) {
            Some(a) if a.kind == LineKind::ListOrdered => {
                let width = format!("{}. ", a.ordinal.unwrap_or(1)).len();
                prefix.push_str(&" ".repeat(width));
            }
            _ => prefix.push_str(LIST_INDENT),
        }
    }
    prefix
}
