//! Style spans: a run-length description of which style labels apply where.
//!
//! A [`StyleSpanSet`] covers a document from offset `0` to [`StyleSpanSet::total_len`]
//! (char offsets). Runs are always kept normalized:
//! - no zero-length runs
//! - no two adjacent runs share an identical label set
//!
//! Span sets are plain values. Building, merging and splicing them has no side effects, so they
//! can be computed on a background thread and handed to the editor afterwards.

use crate::error::SpanError;
use crate::matcher::Match;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::Range;

/// A style class identifier (e.g. `"keyword"`). A stylesheet maps it to visual styling.
pub type StyleLabel = String;

/// The labels that apply to one run of text.
///
/// Ordered so that equal sets compare, hash and print identically.
pub type LabelSet = BTreeSet<StyleLabel>;

/// A contiguous run of text sharing one label set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StyleRun {
    /// Run length in chars.
    pub length: usize,
    /// Labels applied to every char of the run (empty = default styling).
    pub labels: LabelSet,
}

impl StyleRun {
    /// Create a run with an explicit label set.
    pub fn new(length: usize, labels: LabelSet) -> Self {
        Self { length, labels }
    }

    /// Create an unstyled run.
    pub fn plain(length: usize) -> Self {
        Self::new(length, LabelSet::new())
    }

    /// Create a run carrying a single label.
    pub fn labeled(length: usize, label: impl Into<StyleLabel>) -> Self {
        Self::new(length, LabelSet::from([label.into()]))
    }
}

/// An ordered, normalized sequence of [`StyleRun`]s covering a whole document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<StyleRun>", into = "Vec<StyleRun>")]
pub struct StyleSpanSet {
    runs: Vec<StyleRun>,
    total_len: usize,
}

impl StyleSpanSet {
    /// Build a span set from an ordered sequence of runs, normalizing as it goes.
    pub fn build(runs: impl IntoIterator<Item = StyleRun>) -> Self {
        let mut builder = StyleSpanSetBuilder::new();
        for run in runs {
            builder.add_run(run);
        }
        builder.build()
    }

    /// A single unstyled run covering `len` chars (no runs at all when `len == 0`).
    pub fn plain(len: usize) -> Self {
        Self::build([StyleRun::plain(len)])
    }

    /// Convert sorted, non-overlapping matches into a span set covering `total_len` chars.
    ///
    /// Gaps between matches get the empty label set. Matches reaching past `total_len` are
    /// clipped; a match overlapping its predecessor is clipped to start where the previous one
    /// ended.
    pub fn from_matches<'a>(matches: impl IntoIterator<Item = &'a Match>, total_len: usize) -> Self {
        let mut builder = StyleSpanSetBuilder::new();
        let mut last_end = 0usize;

        for m in matches {
            let start = m.start.max(last_end).min(total_len);
            let end = m.end.min(total_len);
            if end <= start {
                continue;
            }
            builder.add(LabelSet::new(), start - last_end);
            builder.add(m.labels.clone(), end - start);
            last_end = end;
        }

        builder.add(LabelSet::new(), total_len - last_end);
        builder.build()
    }

    /// The runs, in document order.
    pub fn runs(&self) -> &[StyleRun] {
        &self.runs
    }

    /// Sum of all run lengths.
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    /// Returns `true` if the set covers no text.
    pub fn is_empty(&self) -> bool {
        self.total_len == 0
    }

    /// Returns `true` if no run carries a label.
    pub fn is_plain(&self) -> bool {
        self.runs.iter().all(|run| run.labels.is_empty())
    }

    /// Iterate runs together with the char range each one covers.
    pub fn ranges(&self) -> impl Iterator<Item = (Range<usize>, &LabelSet)> + '_ {
        self.runs.iter().scan(0usize, |offset, run| {
            let start = *offset;
            *offset += run.length;
            Some((start..*offset, &run.labels))
        })
    }

    /// Labels applied at `offset`, or `None` past the end.
    pub fn labels_at(&self, offset: usize) -> Option<&LabelSet> {
        self.ranges()
            .find(|(range, _)| range.contains(&offset))
            .map(|(_, labels)| labels)
    }

    /// Verify that this set describes a text of exactly `expected` chars.
    pub fn check_len(&self, expected: usize) -> Result<(), SpanError> {
        if self.total_len == expected {
            Ok(())
        } else {
            Err(SpanError::LengthMismatch {
                expected,
                actual: self.total_len,
            })
        }
    }

    /// Overlay two span sets.
    ///
    /// At every offset the result carries the union of both inputs' labels. If the inputs have
    /// different lengths, the tail of the longer one is carried over unchanged.
    pub fn merge(&self, other: &StyleSpanSet) -> StyleSpanSet {
        let mut builder = StyleSpanSetBuilder::with_capacity(self.runs.len() + other.runs.len());
        let mut left = RunCursor::new(&self.runs);
        let mut right = RunCursor::new(&other.runs);

        loop {
            let step = match (left.current(), right.current()) {
                (None, None) => break,
                (Some((labels, len)), None) | (None, Some((labels, len))) => {
                    builder.add(labels.clone(), len);
                    len
                }
                (Some((a, a_len)), Some((b, b_len))) => {
                    let len = a_len.min(b_len);
                    builder.add(a.union(b).cloned().collect(), len);
                    len
                }
            };
            left.advance(step);
            right.advance(step);
        }

        builder.build()
    }

    /// Keep the set aligned with an edit that replaced `range` with `inserted_len` chars.
    ///
    /// Inserted text inherits the labels of its surroundings when the chars on both sides of the
    /// edit share the same labels (typing inside a run). Otherwise it is unstyled.
    pub fn splice(&mut self, range: Range<usize>, inserted_len: usize) -> Result<(), SpanError> {
        if range.start > range.end || range.end > self.total_len {
            return Err(SpanError::OutOfRange {
                start: range.start,
                end: range.end,
                len: self.total_len,
            });
        }

        let before = range
            .start
            .checked_sub(1)
            .and_then(|offset| self.labels_at(offset));
        let inherited = match (before, self.labels_at(range.end)) {
            (Some(before), Some(after)) if before == after => before.clone(),
            _ => LabelSet::new(),
        };

        let mut builder = StyleSpanSetBuilder::with_capacity(self.runs.len() + 1);
        self.copy_range_into(&mut builder, 0..range.start);
        builder.add(inherited, inserted_len);
        self.copy_range_into(&mut builder, range.end..self.total_len);
        *self = builder.build();
        Ok(())
    }

    fn copy_range_into(&self, builder: &mut StyleSpanSetBuilder, range: Range<usize>) {
        for (run_range, labels) in self.ranges() {
            let start = run_range.start.max(range.start);
            let end = run_range.end.min(range.end);
            if start < end {
                builder.add(labels.clone(), end - start);
            }
        }
    }
}

impl From<Vec<StyleRun>> for StyleSpanSet {
    fn from(runs: Vec<StyleRun>) -> Self {
        Self::build(runs)
    }
}

impl From<StyleSpanSet> for Vec<StyleRun> {
    fn from(spans: StyleSpanSet) -> Self {
        spans.runs
    }
}

/// Incremental builder for [`StyleSpanSet`].
#[derive(Debug, Clone, Default)]
pub struct StyleSpanSetBuilder {
    runs: Vec<StyleRun>,
    total_len: usize,
}

impl StyleSpanSetBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty builder with room for `capacity` runs.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            runs: Vec::with_capacity(capacity),
            total_len: 0,
        }
    }

    /// Append `length` chars styled with `labels`.
    pub fn add(&mut self, labels: LabelSet, length: usize) -> &mut Self {
        if length == 0 {
            return self;
        }
        self.total_len += length;

        if let Some(last) = self.runs.last_mut()
            && last.labels == labels
        {
            last.length += length;
            return self;
        }

        self.runs.push(StyleRun { length, labels });
        self
    }

    /// Append a run.
    pub fn add_run(&mut self, run: StyleRun) -> &mut Self {
        self.add(run.labels, run.length)
    }

    /// Length covered so far.
    pub fn len(&self) -> usize {
        self.total_len
    }

    /// Returns `true` if nothing was added yet.
    pub fn is_empty(&self) -> bool {
        self.total_len == 0
    }

    /// Finish building.
    pub fn build(self) -> StyleSpanSet {
        StyleSpanSet {
            runs: self.runs,
            total_len: self.total_len,
        }
    }
}

struct RunCursor<'a> {
    runs: &'a [StyleRun],
    index: usize,
    used: usize,
}

impl<'a> RunCursor<'a> {
    fn new(runs: &'a [StyleRun]) -> Self {
        Self {
            runs,
            index: 0,
            used: 0,
        }
    }

    fn current(&self) -> Option<(&'a LabelSet, usize)> {
        self.runs
            .get(self.index)
            .map(|run| (&run.labels, run.length - self.used))
    }

    fn advance(&mut self, len: usize) {
        let Some(run) = self.runs.get(self.index) else {
            return;
        };
        self.used += len;
        if self.used >= run.length {
            self.index += 1;
            self.used = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn labels(names: &[&str]) -> LabelSet {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_build_normalizes_runs() {
        let spans = StyleSpanSet::build([
            StyleRun::labeled(2, "number"),
            StyleRun::labeled(3, "number"),
            StyleRun::plain(0),
            StyleRun::plain(4),
            StyleRun::plain(1),
        ]);

        assert_eq!(
            spans.runs(),
            &[StyleRun::labeled(5, "number"), StyleRun::plain(5)]
        );
        assert_eq!(spans.total_len(), 10);
    }

    #[test]
    fn test_plain_of_zero_has_no_runs() {
        let spans = StyleSpanSet::plain(0);
        assert!(spans.runs().is_empty());
        assert!(spans.is_empty());
        assert!(spans.check_len(0).is_ok());
    }

    #[test]
    fn test_check_len_reports_mismatch() {
        let spans = StyleSpanSet::plain(4);
        assert_eq!(
            spans.check_len(5),
            Err(SpanError::LengthMismatch {
                expected: 5,
                actual: 4
            })
        );
    }

    #[test]
    fn test_merge_unions_labels_and_renormalizes() {
        // "aaaa bbbb"
        let a = StyleSpanSet::build([StyleRun::labeled(4, "keyword"), StyleRun::plain(5)]);
        let b = StyleSpanSet::build([
            StyleRun::plain(2),
            StyleRun::labeled(5, "caret-word"),
            StyleRun::plain(2),
        ]);

        let merged = a.merge(&b);
        assert_eq!(merged.total_len(), 9);
        assert_eq!(
            merged.runs(),
            &[
                StyleRun::labeled(2, "keyword"),
                StyleRun::new(2, labels(&["caret-word", "keyword"])),
                StyleRun::labeled(3, "caret-word"),
                StyleRun::plain(2),
            ]
        );
    }

    #[test]
    fn test_merge_with_plain_is_identity() {
        let a = StyleSpanSet::build([
            StyleRun::plain(1),
            StyleRun::labeled(3, "string"),
            StyleRun::plain(2),
        ]);
        assert_eq!(a.merge(&StyleSpanSet::plain(6)), a);
    }

    #[test]
    fn test_merge_carries_longer_tail() {
        let a = StyleSpanSet::plain(2);
        let b = StyleSpanSet::build([StyleRun::plain(2), StyleRun::labeled(3, "x")]);
        let merged = a.merge(&b);
        assert_eq!(merged.total_len(), 5);
        assert_eq!(merged.labels_at(4), Some(&labels(&["x"])));
    }

    #[test]
    fn test_labels_at_and_ranges() {
        let spans = StyleSpanSet::build([StyleRun::labeled(2, "number"), StyleRun::plain(3)]);
        assert_eq!(spans.labels_at(1), Some(&labels(&["number"])));
        assert_eq!(spans.labels_at(2), Some(&LabelSet::new()));
        assert_eq!(spans.labels_at(5), None);

        let ranges: Vec<_> = spans.ranges().map(|(r, _)| r).collect();
        assert_eq!(ranges, vec![0..2, 2..5]);
    }

    #[test]
    fn test_splice_inside_run_inherits_labels() {
        let mut spans = StyleSpanSet::build([
            StyleRun::plain(1),
            StyleRun::labeled(4, "string"),
            StyleRun::plain(1),
        ]);
        spans.splice(3..3, 2).unwrap();
        assert_eq!(
            spans.runs(),
            &[
                StyleRun::plain(1),
                StyleRun::labeled(6, "string"),
                StyleRun::plain(1)
            ]
        );
    }

    #[test]
    fn test_splice_at_boundary_is_unstyled() {
        let mut spans = StyleSpanSet::build([StyleRun::labeled(2, "number"), StyleRun::plain(2)]);
        spans.splice(2..2, 1).unwrap();
        assert_eq!(
            spans.runs(),
            &[StyleRun::labeled(2, "number"), StyleRun::plain(3)]
        );
    }

    #[test]
    fn test_splice_deletion_and_out_of_range() {
        let mut spans = StyleSpanSet::build([
            StyleRun::labeled(2, "number"),
            StyleRun::plain(2),
            StyleRun::labeled(2, "string"),
        ]);
        spans.splice(1..5, 0).unwrap();
        assert_eq!(
            spans.runs(),
            &[StyleRun::labeled(1, "number"), StyleRun::labeled(1, "string")]
        );

        assert_eq!(
            spans.splice(1..9, 0),
            Err(SpanError::OutOfRange {
                start: 1,
                end: 9,
                len: 2
            })
        );
    }
}
