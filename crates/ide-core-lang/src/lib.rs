//! `ide-core-lang` ships ready-made languages and span factories for `ide-core`.
//!
//! - [`LanguageDescriptor`] builds a [`LanguageSupport`](ide_core::LanguageSupport) out of
//!   `(label, pattern)` rules.
//! - [`java`], [`css`], [`json`] and [`ini`] are built on it; [`plain_text`] disables highlighting.
//! - [`language_for_path`] picks one of them from a file name.
//! - [`CaretOccurrencesFactory`] and [`BracketMatchFactory`] add caret-driven styling.
//!
//! # Example
//!
//! ```rust
//! use ide_core::{CancellationToken, EditorSnapshot, HighlightRequest, Highlighter, RequestId};
//! use ide_core_lang::json;
//!
//! let language = json().unwrap();
//! let request = HighlightRequest::new(RequestId(1), EditorSnapshot::new(r#"{"n": 1}"#, 0));
//! let spans = Highlighter::new()
//!     .create_style_spans(&request, &language, &CancellationToken::new())
//!     .unwrap();
//! assert_eq!(spans.total_len(), 8);
//! ```

#![warn(missing_docs)]

pub mod descriptor;
pub mod error;
pub mod factories;
pub mod languages;

pub use descriptor::{LabelFn, LanguageDescriptor, LanguageDescriptorBuilder};
pub use error::LanguageError;
pub use factories::{
    BRACKET_MATCH_LABEL, BracketMatchFactory, CARET_WORD_LABEL, CaretOccurrencesFactory,
};
pub use languages::{
    NUMBER_PATTERN, STRING_PATTERN, css, ini, java, json, language_for_extension,
    language_for_path, plain_text,
};
