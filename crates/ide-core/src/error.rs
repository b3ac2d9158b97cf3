//! Error and outcome types for the highlighting pipeline.
//!
//! Only plugin bugs (a span factory returning the wrong length, a language panicking) are real
//! errors. Races between typing and background computation are expected and are reported as
//! [`ApplyOutcome::Discarded`] instead.

use crate::request::RequestId;
use thiserror::Error;

/// Errors produced by [`StyleSpanSet`](crate::StyleSpanSet) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpanError {
    #[error("style spans cover {actual} chars but the text has {expected}")]
    /// The span set does not describe a text of the expected length.
    LengthMismatch {
        /// Length of the target text.
        expected: usize,
        /// Length covered by the span set.
        actual: usize,
    },

    #[error("range {start}..{end} is outside of a {len}-char span set")]
    /// An edit range reaches past the end of the span set.
    OutOfRange {
        /// Range start.
        start: usize,
        /// Range end (exclusive).
        end: usize,
        /// Length covered by the span set.
        len: usize,
    },
}

/// Errors produced while computing highlighting.
#[derive(Debug, Error)]
pub enum HighlightError {
    #[error(
        "span factory '{factory}' produced {actual} chars of styling for a {expected}-char document"
    )]
    /// A span factory returned a set that does not cover the snapshot.
    FactoryLengthMismatch {
        /// Name reported by the factory.
        factory: String,
        /// Snapshot length.
        expected: usize,
        /// Length covered by the factory's output.
        actual: usize,
    },

    #[error("language '{language}' panicked while highlighting: {message}")]
    /// The language support or one of its factories panicked on the worker thread.
    LanguagePanicked {
        /// Name of the active language.
        language: String,
        /// Panic payload, if it was a string.
        message: String,
    },

    #[error("failed to spawn highlighting worker: {0}")]
    /// The background worker thread could not be started.
    Spawn(#[from] std::io::Error),

    #[error("highlight request {0} was cancelled")]
    /// The computation observed its cancellation token at a checkpoint.
    ///
    /// This never reaches the editor's callers; it is dropped by the scheduler.
    Cancelled(RequestId),
}

impl HighlightError {
    /// Returns `true` for outcomes caused by normal supersession rather than a plugin bug.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Errors produced by [`EditorCore`](crate::EditorCore) operations.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("offset {offset} is out of range for a {len}-char document")]
    /// A caret offset points past the end of the document.
    OffsetOutOfRange {
        /// Requested offset.
        offset: usize,
        /// Document length in chars.
        len: usize,
    },

    #[error("range {start}..{end} is invalid for a {len}-char document")]
    /// An edit or selection range is reversed or reaches past the end of the document.
    InvalidRange {
        /// Range start.
        start: usize,
        /// Range end (exclusive).
        end: usize,
        /// Document length in chars.
        len: usize,
    },

    #[error("editor is read-only")]
    /// The editor does not accept user edits (e.g. it mirrors another editor).
    ReadOnly,

    #[error(transparent)]
    /// Starting the follow-up highlight failed.
    Highlight(#[from] HighlightError),
}

/// Why a computed result was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscardReason {
    /// The result belongs to a superseded or cancelled request, or the document changed since the
    /// request was created.
    StaleResult,
    /// The result's length no longer matches the live text.
    OutOfRangeApply {
        /// Live text length.
        expected: usize,
        /// Length covered by the result.
        actual: usize,
    },
}

/// Result of trying to apply a style span set to the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The spans now style the document.
    Applied,
    /// The spans were silently dropped.
    Discarded(DiscardReason),
}

impl ApplyOutcome {
    /// Returns `true` if the spans were applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}
