//! Property tests over generated list documents and reparent sequences.

use markdown_trellis_engine::{LineTree, NodeId};
use proptest::prelude::*;

/// One list line: random indent, bullet or numbered marker, short word.
fn list_line_strategy() -> impl Strategy<Value = String> {
    (
        0usize..7,
        prop_oneof![Just(None), (1usize..30).prop_map(Some)],
        "[a-z]{1,6}",
    )
        .prop_map(|(indent, ordinal, word)| match ordinal {
            Some(n) => format!("{}{}. {}", " ".repeat(indent), n, word),
            None => format!("{}- {}", " ".repeat(indent), word),
        })
}

fn list_document_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(list_line_strategy(), 1..25).prop_map(|lines| lines.join("\n"))
}

/// Parent and children maps flattened for before/after comparison.
fn edges(tree: &LineTree) -> Vec<(NodeId, Option<NodeId>, Vec<NodeId>)> {
    tree.nodes()
        .map(|n| (n.id, tree.parent(n.id), tree.children(n.id).to_vec()))
        .collect()
}

/// The index invariants every constructed or mutated tree must satisfy.
fn check_invariants(tree: &LineTree) {
    for node in tree.nodes() {
        let id = node.id;
        if let Some(p) = tree.parent(id) {
            assert!(
                tree.children(p).contains(&id),
                "parent {p} does not list {id} as a child"
            );
        }
        for &child in tree.children(id) {
            assert_eq!(tree.parent(child), Some(id));
        }
        // Ancestors are the parent chain, nearest first.
        let mut chain = Vec::new();
        let mut cursor = tree.parent(id);
        while let Some(p) = cursor {
            chain.push(p);
            cursor = tree.parent(p);
        }
        assert_eq!(tree.ancestors(id), chain.as_slice());
        // descendants[x] contains d exactly when x is in ancestors[d].
        for &d in tree.descendants(id) {
            assert!(tree.ancestors(d).contains(&id));
        }
        for &a in tree.ancestors(id) {
            assert!(tree.descendants(a).contains(&id));
        }
        if tree.roots().contains(&id) {
            assert_eq!(tree.parent(id), None);
        }
    }
}

proptest! {
    #[test]
    fn parsed_indexes_are_mutually_consistent(doc in list_document_strategy()) {
        check_invariants(&LineTree::parse(&doc));
    }

    #[test]
    fn render_is_a_fixed_point_after_one_pass(doc in list_document_strategy()) {
        let once = LineTree::parse(&doc).to_markdown();
        let again = LineTree::parse(&once).to_markdown();
        prop_assert_eq!(once, again);
    }

    #[test]
    fn reparent_fails_cleanly_or_keeps_invariants(
        doc in list_document_strategy(),
        moves in prop::collection::vec(
            (any::<prop::sample::Index>(), any::<prop::sample::Index>()),
            1..8,
        ),
    ) {
        let mut tree = LineTree::parse(&doc);
        let ids: Vec<NodeId> = tree.nodes().map(|n| n.id).collect();
        for (c, p) in moves {
            let child = ids[c.index(ids.len())];
            let parent = ids[p.index(ids.len())];
            let before = edges(&tree);
            match tree.reparent(child, parent) {
                Ok(()) => {
                    prop_assert_eq!(tree.parent(child), Some(parent));
                    prop_assert!(tree.children(parent).contains(&child));
                    check_invariants(&tree);
                }
                Err(_) => prop_assert_eq!(edges(&tree), before),
            }
        }
    }
}
