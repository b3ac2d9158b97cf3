//! Lexical pass: one left-to-right regex scan over the whole document.
//!
//! Overlapping alternatives are resolved by the regex engine (leftmost-first), so matches come
//! out sorted and non-overlapping. Offsets are converted from UTF-8 bytes to chars here, once.

use crate::language::LanguageSupport;
use crate::spans::{LabelSet, StyleLabel};
use regex::{Captures, Regex};
use serde::Serialize;

/// One labeled match, in char offsets (`end` exclusive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    /// Start offset.
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
    /// Labels for the matched range.
    pub labels: LabelSet,
}

impl Match {
    /// Create a match carrying a single label.
    pub fn labeled(start: usize, end: usize, label: impl Into<StyleLabel>) -> Self {
        Self {
            start,
            end,
            labels: LabelSet::from([label.into()]),
        }
    }

    /// Match length in chars.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` for a zero-length match.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Scan `text` with the language's pattern.
///
/// Returns an empty sequence when the language has no pattern.
pub fn scan(text: &str, language: &dyn LanguageSupport) -> Vec<Match> {
    match language.pattern() {
        Some(pattern) => scan_pattern(text, pattern, |caps| language.style_class_for(caps)),
        None => Vec::new(),
    }
}

/// Scan `text` with `pattern`, labeling every match with `label_for`.
///
/// Matches for which `label_for` returns `None`, and empty matches, contribute no styling and are
/// left out.
pub fn scan_pattern<F>(text: &str, pattern: &Regex, mut label_for: F) -> Vec<Match>
where
    F: FnMut(&Captures<'_>) -> Option<StyleLabel>,
{
    let mut matches = Vec::new();
    let mut byte_pos = 0usize;
    let mut char_pos = 0usize;

    for caps in pattern.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.is_empty() {
            continue;
        }
        let Some(label) = label_for(&caps) else {
            continue;
        };

        // Matches are sorted, so the byte->char conversion only ever walks forward.
        char_pos += text[byte_pos..whole.start()].chars().count();
        let start = char_pos;
        char_pos += whole.as_str().chars().count();
        byte_pos = whole.end();

        matches.push(Match::labeled(start, char_pos, label));
    }

    matches
}

/// Label a match with the name of the first named group that participated in it.
///
/// This is the usual way to write a language pattern: one alternative per token kind, each in a
/// named group (`(?P<number>[0-9]+)|(?P<string>"...")`), with the group name as the label.
pub fn first_named_group(pattern: &Regex, captures: &Captures<'_>) -> Option<StyleLabel> {
    pattern
        .capture_names()
        .flatten()
        .find(|name| captures.name(name).is_some())
        .map(str::to_string)
}
