//! Per-line classification, the first phase of parsing.
//!
//! Each source line becomes a [`LineNode`] carrying its syntactic kind, the
//! mode (contiguous run of same-flavoured lines) it belongs to, and the
//! mode-specific facts the later phases need. Classification is a fold: all
//! carried state lives in [`LineClassifier`], so a line can be classified in
//! isolation given the state its predecessors left behind.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::tree::NodeId;

/// Delimiter that opens and closes YAML-style frontmatter.
const FRONTMATTER_DELIM: &str = "---";

static ORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\. ").expect("ordered-item pattern is valid"));

/// Syntactic role of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineKind {
    ListUnordered,
    ListOrdered,
    CalloutHeader,
    TableHeader,
    TableDivider,
    TableRow,
    Quote,
    Blank,
    Other,
}

/// The contiguous syntactic region a line belongs to.
///
/// Modes reset the indent stack at their boundaries, which is what makes
/// indentation mode-relative: list indent, quote depth and callout depth are
/// never comparable across a mode boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum LineMode {
    #[default]
    None,
    Frontmatter,
    List,
    Callout,
    Quote,
    Table,
    Other,
}

/// Classification facts for one source line.
///
/// Everything here is immutable once the line is classified; the tree indexes
/// are built next to these records, never inside them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineNode {
    /// Identifier derived from the line's 0-based position.
    pub id: NodeId,
    /// The line exactly as it appeared in the source (no newline).
    pub raw: String,
    /// The line with leading whitespace removed.
    pub trimmed: String,
    /// Syntactic role.
    pub kind: LineKind,
    /// Enclosing contiguous region.
    pub mode: LineMode,
    /// Content with structural markers (bullets, ordinals, quote markers)
    /// stripped.
    pub stripped: String,
    /// Mode-relative nesting depth used by the indent stack.
    pub indent: usize,
    /// Callout nesting level in force when this line was classified.
    pub callout_level: usize,
    /// Whether this is a bulleted line nested inside quote markers.
    pub quote_bullet: bool,
    /// Whether this line opened a fresh mode (drives the blank separator on
    /// masked rendering).
    pub first_of_mode: bool,
    /// Ordinal value for ordered list items.
    pub ordinal: Option<usize>,
    /// Column count for table rows.
    pub columns: Option<usize>,
    /// For table divider rows, the id of the table's header row.
    pub divider_header: Option<NodeId>,
}

/// Stateful line classifier.
///
/// State is threaded through [`LineClassifier::classify`] calls in source
/// order; nothing global, nothing shared.
#[derive(Debug, Default)]
pub struct LineClassifier {
    mode: LineMode,
    callout_level: usize,
    frontmatter_closed: bool,
    pending_table_header: Option<NodeId>,
}

impl LineClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mode the classifier is in after the most recent line.
    pub fn mode(&self) -> LineMode {
        self.mode
    }

    /// Classifies one line, updating carried state.
    ///
    /// `line_no` is the 0-based position of `raw` in the source; it becomes
    /// the line's [`NodeId`]. No line can fail to classify: `Other` is the
    /// catch-all, and malformed quote or callout nesting degrades to whatever
    /// the marker arithmetic yields.
    pub fn classify(&mut self, line_no: usize, raw: &str) -> LineNode {
        let id = NodeId::from_line(line_no);
        let pending_header = self.pending_table_header.take();
        let trimmed = raw.trim_start();
        let mut node = LineNode {
            id,
            raw: raw.to_string(),
            trimmed: trimmed.to_string(),
            kind: LineKind::Other,
            mode: LineMode::Other,
            stripped: trimmed.to_string(),
            indent: 0,
            callout_level: 0,
            quote_bullet: false,
            first_of_mode: false,
            ordinal: None,
            columns: None,
            divider_header: None,
        };

        // Frontmatter opens only on the very first line and swallows every
        // line until the closing delimiter has been seen.
        if line_no == 0 && raw.starts_with(FRONTMATTER_DELIM) {
            node.mode = LineMode::Frontmatter;
            node.first_of_mode = self.enter(LineMode::Frontmatter);
            self.frontmatter_closed = false;
            return node;
        }
        if self.mode == LineMode::Frontmatter && !self.frontmatter_closed {
            if raw == FRONTMATTER_DELIM {
                self.frontmatter_closed = true;
            }
            if trimmed.is_empty() {
                node.kind = LineKind::Blank;
            }
            node.mode = LineMode::Frontmatter;
            return node;
        }

        if let Some(rest) = bullet_text(trimmed) {
            node.kind = LineKind::ListUnordered;
            node.mode = LineMode::List;
            node.indent = leading_whitespace(raw);
            node.stripped = rest.to_string();
            node.first_of_mode = self.enter(LineMode::List);
            return node;
        }

        if trimmed.is_empty() {
            // Blank lines attach to nothing and terminate whatever mode was
            // running; they are not themselves the start of one.
            self.mode = LineMode::None;
            node.kind = LineKind::Blank;
            node.mode = LineMode::None;
            node.stripped = String::new();
            return node;
        }

        if trimmed.starts_with('>') {
            return self.classify_quoted(node, trimmed);
        }

        if let Some(caps) = ORDERED_ITEM.captures(trimmed) {
            // An ordinal too large for usize falls through to the later
            // rules rather than erroring.
            if let (Some(m), Ok(ordinal)) = (caps.get(0), caps[1].parse::<usize>()) {
                node.kind = LineKind::ListOrdered;
                node.mode = LineMode::List;
                node.indent = leading_whitespace(raw);
                node.stripped = trimmed[m.end()..].to_string();
                node.ordinal = Some(ordinal);
                node.first_of_mode = self.enter(LineMode::List);
                return node;
            }
        }

        if let Some(columns) = table_columns(trimmed) {
            node.mode = LineMode::Table;
            node.columns = Some(columns);
            node.stripped = trimmed.to_string();
            if self.mode != LineMode::Table {
                node.kind = LineKind::TableHeader;
                node.first_of_mode = self.enter(LineMode::Table);
                self.pending_table_header = Some(id);
            } else {
                // Rows sit at a fixed indent so the whole table flattens
                // under its header.
                node.indent = 2;
                node.kind = match pending_header {
                    Some(header) if is_divider_row(trimmed) => {
                        node.divider_header = Some(header);
                        LineKind::TableDivider
                    }
                    _ => LineKind::TableRow,
                };
            }
            return node;
        }

        if self.mode == LineMode::Callout {
            // Unquoted text inside a callout stays attached under it.
            node.mode = LineMode::Callout;
            node.indent = self.callout_level;
            node.callout_level = self.callout_level;
            return node;
        }
        node.indent = leading_whitespace(raw);
        node.first_of_mode = self.enter(LineMode::Other);
        node
    }

    /// Rules for lines beginning with quote markers: callout headers, callout
    /// bodies, and plain blockquotes.
    fn classify_quoted(&mut self, mut node: LineNode, trimmed: &str) -> LineNode {
        let (level, after) = strip_quote_markers(trimmed);
        let rest = &trimmed[after..];
        let rest_trimmed = rest.trim_start();
        node.stripped = rest.trim().to_string();

        if rest_trimmed.starts_with("[!") {
            // A new header resets the running callout level to its own
            // quote depth, deeper or shallower alike.
            node.kind = LineKind::CalloutHeader;
            node.mode = LineMode::Callout;
            node.indent = level.saturating_sub(1);
            node.first_of_mode = self.enter(LineMode::Callout);
            self.callout_level = level;
            node.callout_level = level;
            return node;
        }
        if self.mode == LineMode::Callout {
            node.kind = LineKind::Quote;
            node.mode = LineMode::Callout;
            node.callout_level = self.callout_level;
            if bullet_text(rest_trimmed).is_some() {
                // Bulleted sub-items keep their marker in `stripped` and
                // nest one level deeper than plain quoted text at the same
                // quote depth: the whitespace after the final marker counts
                // toward their indent.
                node.quote_bullet = true;
                node.indent = level + leading_whitespace(rest);
            } else {
                node.indent = level;
            }
            return node;
        }
        node.kind = LineKind::Quote;
        node.mode = LineMode::Quote;
        node.indent = level.saturating_sub(1);
        node.first_of_mode = self.enter(LineMode::Quote);
        node
    }

    /// Switches to `mode`, reporting whether that opened a fresh run.
    fn enter(&mut self, mode: LineMode) -> bool {
        let first = self.mode != mode;
        self.mode = mode;
        first
    }
}

/// The text after an unordered bullet marker, if the line carries one.
fn bullet_text(trimmed: &str) -> Option<&str> {
    trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
}

fn leading_whitespace(s: &str) -> usize {
    s.chars().take_while(|c| c.is_whitespace()).count()
}

/// Counts leading quote markers, returning the count and the byte offset
/// just past the last marker.
///
/// Whitespace between markers is consumed only when another marker actually
/// follows, so the indentation after the final marker survives into the
/// remainder (`">   - a"` keeps all three spaces). Handles `> text`,
/// `>> nested` and `> > spaced nested` forms.
fn strip_quote_markers(s: &str) -> (usize, usize) {
    let b = s.as_bytes();
    let mut depth = 0usize;
    let mut after = 0usize;
    let mut i = 0usize;
    loop {
        while i < b.len() && b[i] == b' ' {
            i += 1;
        }
        if i < b.len() && b[i] == b'>' {
            depth += 1;
            i += 1;
            after = i;
        } else {
            break;
        }
    }
    (depth, after)
}

/// Cell count of a markdown table row, or `None` when the line is not one.
///
/// A row is bounded by `|` on both ends and needs at least one interior `|`.
fn table_columns(trimmed: &str) -> Option<usize> {
    let inner = trimmed.strip_prefix('|')?.strip_suffix('|')?;
    if !inner.contains('|') {
        return None;
    }
    Some(inner.split('|').count())
}

/// Whether every cell of the row trims to exactly `---`.
fn is_divider_row(trimmed: &str) -> bool {
    match trimmed.strip_prefix('|').and_then(|s| s.strip_suffix('|')) {
        Some(inner) => inner.split('|').all(|cell| cell.trim() == "---"),
        None => false,
    }
}
