//! Errors raised while assembling a language.

use thiserror::Error;

/// Errors raised while assembling a language.
#[derive(Debug, Error)]
pub enum LanguageError {
    #[error("invalid pattern for rule '{label}' in language '{language}': {source}")]
    /// A rule's pattern (or the combined pattern) does not compile.
    Pattern {
        /// Language being built.
        language: String,
        /// Label of the faulty rule (`*` for the combined pattern).
        label: String,
        /// Compilation error.
        #[source]
        source: regex::Error,
    },

    #[error("language '{0}' has a rule with an empty style label")]
    /// A rule was given an empty label.
    EmptyLabel(String),
}
