//! Pluggable span contributors.
//!
//! A [`SpanFactory`] adds styling that a single lexical regex cannot express (semantic tokens,
//! occurrences of the word under the caret, bracket matching, ...). Its output is merged with the
//! regex spans by label union, so factories never erase each other's labels.

use crate::request::EditorSnapshot;
use crate::spans::StyleSpanSet;
use std::fmt;

/// A contributor of extra style spans.
///
/// Factories run on a background thread and must only read the snapshot they are given. The
/// returned set must cover exactly [`EditorSnapshot::len`] chars.
pub trait SpanFactory: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Compute spans for `snapshot`.
    fn create(&self, snapshot: &EditorSnapshot) -> StyleSpanSet;
}

impl fmt::Debug for dyn SpanFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SpanFactory").field(&self.name()).finish()
    }
}

/// A [`SpanFactory`] backed by a closure.
pub struct FnSpanFactory<F> {
    name: String,
    create: F,
}

impl<F> FnSpanFactory<F>
where
    F: Fn(&EditorSnapshot) -> StyleSpanSet + Send + Sync,
{
    /// Wrap `create` under `name`.
    pub fn new(name: impl Into<String>, create: F) -> Self {
        Self {
            name: name.into(),
            create,
        }
    }
}

impl<F> SpanFactory for FnSpanFactory<F>
where
    F: Fn(&EditorSnapshot) -> StyleSpanSet + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn create(&self, snapshot: &EditorSnapshot) -> StyleSpanSet {
        (self.create)(snapshot)
    }
}

impl<F> fmt::Debug for FnSpanFactory<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSpanFactory")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
