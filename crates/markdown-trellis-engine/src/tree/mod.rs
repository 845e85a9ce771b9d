//! The parsed document: one record per source line plus the structure
//! indexes tying the lines into a forest.
//!
//! A [`LineTree`] exclusively owns its indexes. Queries borrow; the one
//! mutation, [`LineTree::reparent`], takes `&mut self` and finishes with a
//! full rebuild of the derived ancestor/descendant maps, so readers never
//! observe a half-updated structure.

mod node;

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Context;
use serde::Serialize;
use thiserror::Error;

use crate::parsing::{self, LineNode};
use crate::render;

pub use node::NodeId;

/// Set of node ids; iterates in ascending id order, which is document order.
pub type NodeSet = BTreeSet<NodeId>;

/// Failures of structure mutation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("no node with id {0}")]
    UnknownNode(NodeId),
    #[error("{child} is already a child of {parent}")]
    RelationshipExists { child: NodeId, parent: NodeId },
    #[error("moving {child} under {parent} would create a cycle")]
    WouldCycle { child: NodeId, parent: NodeId },
}

/// A document parsed into per-line nodes and the indexes over them.
///
/// Construction runs the classifier and indent stack once over the text;
/// after that the line records are immutable and only the adjacency can
/// change, through [`LineTree::reparent`]. Children keep insertion order
/// (document order until a reparent appends elsewhere), ancestors run
/// nearest-first, descendants are kept in document order.
#[derive(Debug, Clone, Serialize)]
pub struct LineTree {
    nodes: BTreeMap<NodeId, LineNode>,
    children: BTreeMap<NodeId, Vec<NodeId>>,
    parent: BTreeMap<NodeId, NodeId>,
    ancestors: BTreeMap<NodeId, Vec<NodeId>>,
    descendants: BTreeMap<NodeId, Vec<NodeId>>,
    roots: NodeSet,
}

impl LineTree {
    /// Parses a document from raw bytes, rejecting non-UTF-8 content.
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(bytes).context("document is not valid UTF-8")?;
        Ok(Self::parse(text))
    }

    /// Parses a document. Never fails: every line classifies as something.
    pub fn parse(text: &str) -> Self {
        parsing::parse(text)
    }

    /// Assembles a tree from the construction-time indexes and derives the
    /// ancestor/descendant maps.
    pub(crate) fn assemble(
        nodes: BTreeMap<NodeId, LineNode>,
        children: BTreeMap<NodeId, Vec<NodeId>>,
        parent: BTreeMap<NodeId, NodeId>,
        roots: NodeSet,
    ) -> Self {
        let mut tree = Self {
            nodes,
            children,
            parent,
            ancestors: BTreeMap::new(),
            descendants: BTreeMap::new(),
            roots,
        };
        tree.rebuild_derived();
        tree
    }

    /// Number of lines (= nodes) in the document.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The record for `id`, if the document has such a line.
    pub fn node(&self, id: NodeId) -> Option<&LineNode> {
        self.nodes.get(&id)
    }

    /// All line records in document order.
    pub fn nodes(&self) -> impl Iterator<Item = &LineNode> {
        self.nodes.values()
    }

    /// Direct children of `id` in stored order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(&id).map_or(&[], |v| v.as_slice())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(&id).copied()
    }

    /// Ancestor chain of `id`, nearest first. Empty for roots and orphans.
    pub fn ancestors(&self, id: NodeId) -> &[NodeId] {
        self.ancestors.get(&id).map_or(&[], |v| v.as_slice())
    }

    /// Every node below `id`, in document order. Empty for leaves.
    pub fn descendants(&self, id: NodeId) -> &[NodeId] {
        self.descendants.get(&id).map_or(&[], |v| v.as_slice())
    }

    /// Top-level nodes: indent 0 and no parent. Orphans (deeper lines that
    /// found no parent) are deliberately absent.
    pub fn roots(&self) -> &NodeSet {
        &self.roots
    }

    /// Moves `child` (with its whole subtree) under `new_parent`.
    ///
    /// Fails on an unknown id, on a pre-existing direct relationship, and
    /// when `new_parent` is `child` itself or one of its descendants (which
    /// would close a cycle). All checks run before any mutation, so a failed
    /// call leaves the structure untouched. On success the derived maps are
    /// fully rebuilt.
    pub fn reparent(&mut self, child: NodeId, new_parent: NodeId) -> Result<(), TreeError> {
        if !self.nodes.contains_key(&child) {
            return Err(TreeError::UnknownNode(child));
        }
        if !self.nodes.contains_key(&new_parent) {
            return Err(TreeError::UnknownNode(new_parent));
        }
        if self.children(new_parent).contains(&child) {
            return Err(TreeError::RelationshipExists {
                child,
                parent: new_parent,
            });
        }
        if new_parent == child || self.ancestors(new_parent).contains(&child) {
            return Err(TreeError::WouldCycle {
                child,
                parent: new_parent,
            });
        }

        if let Some(old) = self.parent.get(&child).copied() {
            if let Some(siblings) = self.children.get_mut(&old) {
                siblings.retain(|&c| c != child);
            }
        }
        self.children.entry(new_parent).or_default().push(child);
        self.parent.insert(child, new_parent);
        self.roots.remove(&child);
        self.rebuild_derived();
        Ok(())
    }

    /// Recomputes ancestors and descendants from the parent map.
    ///
    /// Two passes in ascending id order: walk each node's parent chain for
    /// its ancestor list, then append each node to every ancestor's
    /// descendant list. Ascending iteration is what keeps descendant lists
    /// in document order.
    fn rebuild_derived(&mut self) {
        self.ancestors.clear();
        self.descendants.clear();
        for &id in self.nodes.keys() {
            let mut chain = Vec::new();
            let mut cursor = self.parent.get(&id).copied();
            while let Some(p) = cursor {
                chain.push(p);
                cursor = self.parent.get(&p).copied();
            }
            self.ancestors.insert(id, chain);
        }
        for (&id, chain) in &self.ancestors {
            for &ancestor in chain {
                self.descendants.entry(ancestor).or_default().push(id);
            }
        }
    }

    /// Renders the whole document back to text.
    pub fn to_markdown(&self) -> String {
        render::write_tree(self, None)
    }

    /// Renders only the nodes in `mask` (plus implicitly-included table
    /// dividers), with blank separators restored at mode starts.
    pub fn to_markdown_filtered(&self, mask: &NodeSet) -> String {
        render::write_tree(self, Some(mask))
    }

    /// The ids of the given lines plus all their ancestors and descendants.
    /// Line numbers outside the document are skipped.
    pub fn closure_of_lines(&self, lines: &[usize]) -> NodeSet {
        let mut mask = NodeSet::new();
        for &line in lines {
            let id = NodeId::from_line(line);
            if !self.nodes.contains_key(&id) {
                continue;
            }
            mask.insert(id);
            mask.extend(self.ancestors(id).iter().copied());
            mask.extend(self.descendants(id).iter().copied());
        }
        mask
    }

    /// Renders the minimal connected context around the given lines: each
    /// line plus its ancestors and descendants.
    pub fn context_of_lines(&self, lines: &[usize]) -> String {
        self.to_markdown_filtered(&self.closure_of_lines(lines))
    }
}
