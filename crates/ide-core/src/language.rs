//! The language plug-in boundary.
//!
//! A language tells the highlighter how to scan text ([`LanguageSupport::pattern`]), how to
//! label each match ([`LanguageSupport::style_class_for`]), and which extra
//! [`SpanFactory`]s contribute styling on top of the lexical pass.
//!
//! Concrete languages live in `ide-core-lang`; this crate only ships [`PlainText`].

use crate::factory::SpanFactory;
use crate::spans::StyleLabel;
use regex::{Captures, Regex};
use std::fmt;
use std::sync::Arc;

/// Stylesheet used by languages that do not provide their own.
pub const DEFAULT_STYLE_SHEET: &str = "styles/plain.css";

/// Capability set of a language, swappable at runtime on an open editor.
pub trait LanguageSupport: Send + Sync {
    /// Display name (e.g. `"Java"`).
    fn name(&self) -> &str;

    /// The compiled scan pattern, or `None` to opt out of highlighting entirely.
    fn pattern(&self) -> Option<&Regex>;

    /// Style label for one match of [`Self::pattern`], or `None` for default styling.
    fn style_class_for(&self, captures: &Captures<'_>) -> Option<StyleLabel>;

    /// Extra span contributors, merged after the regex pass in this order.
    fn span_factories(&self) -> &[Arc<dyn SpanFactory>] {
        &[]
    }

    /// Stylesheet mapping this language's labels to visual styles.
    fn style_sheet(&self) -> &str {
        DEFAULT_STYLE_SHEET
    }

    /// Whether the host's "run" action applies to documents in this language.
    fn is_runnable(&self) -> bool {
        false
    }

    /// Whether the host should populate the autocomplete popup for this language.
    fn uses_autocomplete(&self) -> bool {
        false
    }
}

impl fmt::Debug for dyn LanguageSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageSupport")
            .field("name", &self.name())
            .field("has_pattern", &self.pattern().is_some())
            .field("span_factories", &self.span_factories().len())
            .finish()
    }
}

/// Unhighlighted text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainText;

impl LanguageSupport for PlainText {
    fn name(&self) -> &str {
        "Plain Text"
    }

    fn pattern(&self) -> Option<&Regex> {
        None
    }

    fn style_class_for(&self, _captures: &Captures<'_>) -> Option<StyleLabel> {
        None
    }
}
