//! Caret-driven span factories.
//!
//! Both factories only look at the snapshot's caret and text, so they are cheap enough to run on
//! every caret move.

use ide_core::matcher::scan_pattern;
use ide_core::{EditorSnapshot, Match, SpanFactory, StyleLabel, StyleSpanSet};
use regex::Regex;
use std::sync::LazyLock;

/// Label for occurrences of the identifier under the caret.
pub const CARET_WORD_LABEL: &str = "caret-word";
/// Label for the bracket next to the caret and its partner.
pub const BRACKET_MATCH_LABEL: &str = "bracket-match";

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b").expect("valid identifier regex")
});

const BRACKET_PAIRS: &[(char, char)] = &[('(', ')'), ('[', ']'), ('{', '}')];

/// Marks every whole-word occurrence of the identifier touching the caret.
#[derive(Debug, Clone)]
pub struct CaretOccurrencesFactory {
    label: StyleLabel,
}

impl CaretOccurrencesFactory {
    /// Create a factory using the `caret-word` label.
    pub fn new() -> Self {
        Self::with_label(CARET_WORD_LABEL)
    }

    /// Create a factory that applies `label` instead.
    pub fn with_label(label: impl Into<StyleLabel>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl Default for CaretOccurrencesFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl SpanFactory for CaretOccurrencesFactory {
    fn name(&self) -> &str {
        "caret-occurrences"
    }

    fn create(&self, snapshot: &EditorSnapshot) -> StyleSpanSet {
        // The word itself is used as the temporary label, so equal words compare equal.
        let words = scan_pattern(snapshot.text(), &IDENTIFIER, |caps| Some(caps[0].to_string()));
        let caret = snapshot.caret();

        let Some(current) = words.iter().find(|m| m.start <= caret && caret <= m.end) else {
            return StyleSpanSet::plain(snapshot.len());
        };

        let hits: Vec<Match> = words
            .iter()
            .filter(|m| m.labels == current.labels)
            .map(|m| Match::labeled(m.start, m.end, self.label.as_str()))
            .collect();
        StyleSpanSet::from_matches(&hits, snapshot.len())
    }
}

/// Marks the bracket at (or just before) the caret together with its partner.
///
/// Nesting is tracked per bracket kind. An unbalanced bracket gets no styling.
#[derive(Debug, Clone)]
pub struct BracketMatchFactory {
    label: StyleLabel,
}

impl BracketMatchFactory {
    /// Create a factory using the `bracket-match` label.
    pub fn new() -> Self {
        Self::with_label(BRACKET_MATCH_LABEL)
    }

    /// Create a factory that applies `label` instead.
    pub fn with_label(label: impl Into<StyleLabel>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl Default for BracketMatchFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl SpanFactory for BracketMatchFactory {
    fn name(&self) -> &str {
        "bracket-match"
    }

    fn create(&self, snapshot: &EditorSnapshot) -> StyleSpanSet {
        let chars: Vec<char> = snapshot.text().chars().collect();
        let caret = snapshot.caret();
        let candidates = [Some(caret), caret.checked_sub(1)];

        for pos in candidates.into_iter().flatten() {
            if let Some(partner) = find_partner(&chars, pos) {
                let (first, second) = (pos.min(partner), pos.max(partner));
                let hits = [
                    Match::labeled(first, first + 1, self.label.as_str()),
                    Match::labeled(second, second + 1, self.label.as_str()),
                ];
                return StyleSpanSet::from_matches(&hits, snapshot.len());
            }
        }

        StyleSpanSet::plain(snapshot.len())
    }
}

fn find_partner(chars: &[char], pos: usize) -> Option<usize> {
    let c = *chars.get(pos)?;

    if let Some(&(open, close)) = BRACKET_PAIRS.iter().find(|(open, _)| *open == c) {
        let mut depth = 0usize;
        for (i, &ch) in chars.iter().enumerate().skip(pos) {
            if ch == open {
                depth += 1;
            } else if ch == close {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
        }
        return None;
    }

    if let Some(&(open, close)) = BRACKET_PAIRS.iter().find(|(_, close)| *close == c) {
        let mut depth = 0usize;
        for i in (0..=pos).rev() {
            let ch = chars[i];
            if ch == close {
                depth += 1;
            } else if ch == open {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
        }
    }

    None
}
