pub mod io;
pub mod parsing;
mod render;
pub mod tree;


// Re-export key types for easier usage
pub use io::*;
pub use parsing::{LineClassifier, LineKind, LineMode, LineNode, parse};
pub use tree::{LineTree, NodeId, NodeSet, TreeError};
