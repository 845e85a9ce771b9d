use std::fmt;

use serde::Serialize;

/// Identifier of one source line, derived from its 0-based position.
///
/// Ids display and serialize as width-4 zero-padded decimals so lexical and
/// numeric ordering coincide, which consumers that sort ids as strings rely
/// on. The fixed width gives a ceiling: documents of 10,000 lines or more
/// break lexical ordering. Widening the format would silently change every
/// stored ordering, so the ceiling stands as a documented limit instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Id for the line at `line_no` (0-based).
    pub fn from_line(line_no: usize) -> Self {
        NodeId(line_no.try_into().unwrap_or(u32::MAX))
    }

    /// The 0-based source line this id names.
    pub fn line(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

impl Serialize for NodeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}
