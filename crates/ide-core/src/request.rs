//! Highlight requests and the immutable editor snapshots they carry.

use ropey::Rope;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// Monotonically increasing highlight request id (per editor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read-only copy of the editor state a background computation works on.
///
/// Background tasks never look at the live editor; everything they need is captured here when
/// the request is created.
#[derive(Debug, Clone)]
pub struct EditorSnapshot {
    text: Arc<str>,
    char_len: usize,
    caret: usize,
    selection: Option<Range<usize>>,
    version: u64,
}

impl EditorSnapshot {
    /// Create a snapshot of `text` with the caret at `caret` (char offset).
    pub fn new(text: impl Into<Arc<str>>, caret: usize) -> Self {
        let text = text.into();
        let char_len = text.chars().count();
        Self {
            text,
            char_len,
            caret: caret.min(char_len),
            selection: None,
            version: 0,
        }
    }

    /// Snapshot the contents of `rope`.
    pub fn from_rope(rope: &Rope, caret: usize) -> Self {
        let char_len = rope.len_chars();
        Self {
            text: Arc::from(rope.to_string()),
            char_len,
            caret: caret.min(char_len),
            selection: None,
            version: 0,
        }
    }

    /// Attach the current selection (char range).
    pub fn with_selection(mut self, selection: Option<Range<usize>>) -> Self {
        self.selection = selection;
        self
    }

    /// Attach the document version the snapshot was taken at.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Full document text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Document length in chars.
    pub fn len(&self) -> usize {
        self.char_len
    }

    /// Returns `true` for an empty document.
    pub fn is_empty(&self) -> bool {
        self.char_len == 0
    }

    /// Caret offset (chars).
    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Selected char range, if any.
    pub fn selection(&self) -> Option<&Range<usize>> {
        self.selection.as_ref()
    }

    /// Document version at snapshot time.
    pub fn version(&self) -> u64 {
        self.version
    }
}

/// A request to (re)compute the styling of one snapshot. Immutable once created.
#[derive(Debug, Clone)]
pub struct HighlightRequest {
    id: RequestId,
    snapshot: EditorSnapshot,
}

impl HighlightRequest {
    /// Create a request.
    pub fn new(id: RequestId, snapshot: EditorSnapshot) -> Self {
        Self { id, snapshot }
    }

    /// Request id.
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// The snapshot to highlight.
    pub fn snapshot(&self) -> &EditorSnapshot {
        &self.snapshot
    }

    /// Length the result must have to be applicable.
    pub fn target_len(&self) -> usize {
        self.snapshot.len()
    }
}
