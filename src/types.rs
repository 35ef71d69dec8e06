/// Core domain types for refsift locations, classifications, and trees.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How a single reference uses the symbol it names.
///
/// `Unknown` means the occurrence could not be classified at all: the
/// line no longer matches the location, or the oracle had nothing to
/// say. Unknown references are kept by no filter flag (but see
/// [`UnmatchedPolicy`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// The symbol's value is read.
    Read,
    /// Plain-text usage, inside a string literal or comment.
    Text,
    /// The occurrence could not be classified.
    Unknown,
    /// The symbol is assigned, incremented, or appended to itself.
    Write,
}

/// Which classifications the view currently shows. Defaults to all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Show references classified as reads.
    pub read: bool,
    /// Show plain-text references.
    pub text: bool,
    /// Show references classified as writes.
    pub write: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        return Self { read: true, text: true, write: true };
    }
}

impl FilterState {
    /// Whether a classification passes the current flags.
    /// `Unknown` passes none of them.
    pub fn allows(&self, classification: Classification) -> bool {
        return match classification {
            Classification::Read => self.read,
            Classification::Text => self.text,
            Classification::Unknown => false,
            Classification::Write => self.write,
        };
    }

    /// True when every flag is off, so nothing can survive filtering.
    pub fn is_empty(&self) -> bool {
        return !self.read && !self.text && !self.write;
    }
}

/// One occurrence of the target symbol, as delivered by the external
/// find-references facility. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Absolute or root-relative path of the containing file.
    pub path: PathBuf,
    /// The occurrence's exact range within the file.
    pub range: Range,
}

/// The position a reference set was requested from. Needed to anchor
/// the preview presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    /// File the find-references request originated in.
    pub path: PathBuf,
    /// Cursor position of the request.
    pub position: Position,
}

/// A zero-based line/column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Zero-based column (character offset within the line).
    pub column: u32,
    /// Zero-based line number.
    pub line: u32,
}

/// How the preview collaborator should present locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PreviewMode {
    /// Navigate the editor to the location.
    Goto,
    /// Navigate and open an inline peek at the same time.
    GotoAndPeek,
    /// Open an inline peek without leaving the current editor.
    Peek,
}

/// A half-open range `[start, end)` within one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    /// Exclusive end of the range.
    pub end: Position,
    /// Inclusive start of the range.
    pub start: Position,
}

impl Range {
    /// Whether `position` lies within the range (start inclusive, end exclusive).
    pub fn contains(&self, position: Position) -> bool {
        let after_start = position.line > self.start.line
            || (position.line == self.start.line && position.column >= self.start.column);
        let before_end = position.line < self.end.line
            || (position.line == self.end.line && position.column < self.end.column);
        return after_start && before_end;
    }
}

/// A single reference line under a file node. Line and column are
/// one-based for display; `key` uniquely addresses the reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefLine {
    /// One-based column of the reference.
    pub column: u32,
    /// `path#line:column` with one-based coordinates.
    pub key: String,
    /// One-based line of the reference.
    pub line: u32,
}

/// An optional file-or-directory path narrowing which references reach
/// the preview. Independent of [`FilterState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopePath {
    /// Whether `path` names a directory (boundary-matched) or a file
    /// (exact-matched).
    pub is_directory: bool,
    /// The scope path.
    pub path: PathBuf,
}

/// A node of the compressed reference tree.
///
/// Directory chains with a single directory child are merged into one
/// node whose label joins the chain with `/` and whose `merged_path` is
/// the deepest directory reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TreeNode {
    /// A (possibly compressed) directory. Never emitted without children.
    #[serde(rename_all = "camelCase")]
    Directory {
        /// Child nodes, directories first, then files, each group in
        /// case-sensitive lexicographic label order.
        children: Vec<TreeNode>,
        /// Display label: chain segments joined with `/`, trailing `/`.
        label: String,
        /// Deepest filesystem path covered by the compressed chain.
        merged_path: PathBuf,
    },
    /// A file containing at least one reference.
    #[serde(rename_all = "camelCase")]
    File {
        /// Display label: the file name.
        label: String,
        /// Full path of the file.
        path: PathBuf,
        /// References in the file, ordered by ascending line.
        reference_lines: Vec<RefLine>,
    },
}

/// What an `Unknown` classification counts as during filtering.
///
/// `Unknown` is the safe default: unclassifiable references disappear
/// under every flag combination. `Read` reproduces the alternative
/// behavior where they surface under the read filter instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedPolicy {
    /// Treat unclassifiable references as reads.
    Read,
    /// Keep unclassifiable references out of every filter.
    #[default]
    Unknown,
}

impl UnmatchedPolicy {
    /// Apply the policy to a raw classification.
    pub fn apply(self, classification: Classification) -> Classification {
        if classification == Classification::Unknown && self == Self::Read {
            return Classification::Read;
        }
        return classification;
    }
}
