//! Composes the lexical pass and every span factory into one [`StyleSpanSet`].

use crate::error::HighlightError;
use crate::factory::SpanFactory;
use crate::language::LanguageSupport;
use crate::matcher;
use crate::request::HighlightRequest;
use crate::scheduler::CancellationToken;
use crate::spans::StyleSpanSet;
use std::sync::Arc;
use tracing::trace;

/// Builds the styling of a document snapshot.
///
/// The regex spans come first, then the language's own factories, then the factories registered
/// on the highlighter itself (editor extensions), each merged by label union.
#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    factories: Vec<Arc<dyn SpanFactory>>,
}

impl Highlighter {
    /// Create a highlighter with no extension factories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a highlighter with the given extension factories.
    pub fn with_factories(factories: Vec<Arc<dyn SpanFactory>>) -> Self {
        Self { factories }
    }

    /// Extension factories, in merge order.
    pub fn factories(&self) -> &[Arc<dyn SpanFactory>] {
        &self.factories
    }

    /// Register an extension factory (merged after all existing ones).
    pub fn add_factory(&mut self, factory: Arc<dyn SpanFactory>) {
        self.factories.push(factory);
    }

    /// Compute the full styling for `request`.
    ///
    /// `cancel` is polled after the regex scan and after every factory. A cancelled computation
    /// returns [`HighlightError::Cancelled`]; it is never aborted in the middle of a scan.
    ///
    /// A language without a pattern yields one unstyled run and runs neither the matcher nor any
    /// factory.
    pub fn create_style_spans(
        &self,
        request: &HighlightRequest,
        language: &dyn LanguageSupport,
        cancel: &CancellationToken,
    ) -> Result<StyleSpanSet, HighlightError> {
        let snapshot = request.snapshot();
        let len = snapshot.len();

        let Some(pattern) = language.pattern() else {
            trace!(request = %request.id(), language = language.name(), "no pattern; plain styling");
            return Ok(StyleSpanSet::plain(len));
        };

        let matches =
            matcher::scan_pattern(snapshot.text(), pattern, |caps| language.style_class_for(caps));
        let mut spans = StyleSpanSet::from_matches(&matches, len);
        checkpoint(request, cancel, "scan")?;

        for factory in language.span_factories().iter().chain(&self.factories) {
            let contributed = factory.create(snapshot);
            if contributed.total_len() != len {
                return Err(HighlightError::FactoryLengthMismatch {
                    factory: factory.name().to_string(),
                    expected: len,
                    actual: contributed.total_len(),
                });
            }
            spans = spans.merge(&contributed);
            checkpoint(request, cancel, factory.name())?;
        }

        Ok(spans)
    }
}

fn checkpoint(
    request: &HighlightRequest,
    cancel: &CancellationToken,
    stage: &str,
) -> Result<(), HighlightError> {
    if cancel.is_cancelled() {
        trace!(request = %request.id(), stage, "cancellation observed");
        return Err(HighlightError::Cancelled(request.id()));
    }
    Ok(())
}
