//! Parent resolution from mode-relative indent depth.

use crate::tree::NodeId;

/// Stack of currently-open ancestors, one slot per indent depth.
///
/// Slots skipped over by a jump in indentation are holes; parent resolution
/// walks past them. The stack is reset at every mode boundary, so depths from
/// different modes never resolve against each other.
#[derive(Debug, Default)]
pub struct IndentStack {
    open: Vec<Option<NodeId>>,
}

impl IndentStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets every open ancestor. Called at each mode boundary.
    pub fn reset(&mut self) {
        self.open.clear();
    }

    /// Registers `id` as the open ancestor at `indent` and returns its
    /// parent: the nearest open ancestor strictly shallower than `indent`.
    ///
    /// A depth at or past the current top extends the stack, leaving holes
    /// under any gap. A shallower depth first discards all deeper ancestors;
    /// they are no longer valid attachment points. `None` means the line has
    /// no parent at all, a root when its indent is 0 and an orphan otherwise.
    pub fn place(&mut self, indent: usize, id: NodeId) -> Option<NodeId> {
        if indent + 1 < self.open.len() {
            self.open.truncate(indent + 1);
        }
        if indent >= self.open.len() {
            self.open.resize(indent + 1, None);
        }
        self.open[indent] = Some(id);
        self.open[..indent].iter().rev().find_map(|slot| *slot)
    }
}
