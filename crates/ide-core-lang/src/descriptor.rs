//! Data-driven [`LanguageSupport`] built from labeled regex rules.

use crate::error::LanguageError;
use ide_core::{DEFAULT_STYLE_SHEET, LanguageSupport, SpanFactory, StyleLabel};
use regex::{Captures, Regex};
use std::fmt;
use std::sync::Arc;

/// Custom match-to-label function.
pub type LabelFn = Arc<dyn Fn(&Captures<'_>) -> Option<StyleLabel> + Send + Sync>;

/// A language assembled from rules.
///
/// Every rule becomes one alternative of a single combined pattern (in rule order, so earlier
/// rules win ties). By default a match is labeled with the label of the rule that produced it.
pub struct LanguageDescriptor {
    name: String,
    pattern: Option<Regex>,
    /// `(group name, label)` per rule, in rule order.
    rule_groups: Vec<(String, StyleLabel)>,
    label_for: Option<LabelFn>,
    span_factories: Vec<Arc<dyn SpanFactory>>,
    style_sheet: String,
    runnable: bool,
    autocomplete: bool,
}

impl LanguageDescriptor {
    /// Start describing a language called `name`.
    pub fn builder(name: impl Into<String>) -> LanguageDescriptorBuilder {
        LanguageDescriptorBuilder::new(name)
    }

    /// Labels of the rules, in precedence order.
    pub fn rule_labels(&self) -> impl Iterator<Item = &str> {
        self.rule_groups.iter().map(|(_, label)| label.as_str())
    }
}

impl LanguageSupport for LanguageDescriptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    fn style_class_for(&self, captures: &Captures<'_>) -> Option<StyleLabel> {
        if let Some(label_for) = &self.label_for {
            return label_for(captures);
        }
        self.rule_groups
            .iter()
            .find(|(group, _)| captures.name(group).is_some())
            .map(|(_, label)| label.clone())
    }

    fn span_factories(&self) -> &[Arc<dyn SpanFactory>] {
        &self.span_factories
    }

    fn style_sheet(&self) -> &str {
        &self.style_sheet
    }

    fn is_runnable(&self) -> bool {
        self.runnable
    }

    fn uses_autocomplete(&self) -> bool {
        self.autocomplete
    }
}

impl fmt::Debug for LanguageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageDescriptor")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_ref().map(Regex::as_str))
            .field("rules", &self.rule_groups.len())
            .field("span_factories", &self.span_factories)
            .field("style_sheet", &self.style_sheet)
            .field("runnable", &self.runnable)
            .field("autocomplete", &self.autocomplete)
            .finish()
    }
}

/// Builder for [`LanguageDescriptor`].
pub struct LanguageDescriptorBuilder {
    name: String,
    rules: Vec<(StyleLabel, String)>,
    label_for: Option<LabelFn>,
    span_factories: Vec<Arc<dyn SpanFactory>>,
    style_sheet: String,
    runnable: bool,
    autocomplete: bool,
}

impl LanguageDescriptorBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            label_for: None,
            span_factories: Vec::new(),
            style_sheet: DEFAULT_STYLE_SHEET.to_string(),
            runnable: false,
            autocomplete: false,
        }
    }

    /// Add a rule: text matching `pattern` is labeled `label`.
    ///
    /// Patterns are compiled in multi-line mode (`^`/`$` match at line boundaries).
    pub fn rule(mut self, label: impl Into<StyleLabel>, pattern: impl Into<String>) -> Self {
        self.rules.push((label.into(), pattern.into()));
        self
    }

    /// Replace the default rule-based labeling.
    pub fn label_for<F>(mut self, label_for: F) -> Self
    where
        F: Fn(&Captures<'_>) -> Option<StyleLabel> + Send + Sync + 'static,
    {
        self.label_for = Some(Arc::new(label_for));
        self
    }

    /// Add a span factory (merged after the regex pass, in insertion order).
    pub fn span_factory(mut self, factory: Arc<dyn SpanFactory>) -> Self {
        self.span_factories.push(factory);
        self
    }

    /// Set the stylesheet reference.
    pub fn style_sheet(mut self, style_sheet: impl Into<String>) -> Self {
        self.style_sheet = style_sheet.into();
        self
    }

    /// Mark the language as runnable.
    pub fn runnable(mut self, runnable: bool) -> Self {
        self.runnable = runnable;
        self
    }

    /// Enable autocomplete for the language.
    pub fn autocomplete(mut self, autocomplete: bool) -> Self {
        self.autocomplete = autocomplete;
        self
    }

    /// Compile the rules.
    ///
    /// A descriptor without rules has no pattern and is never highlighted.
    pub fn build(self) -> Result<LanguageDescriptor, LanguageError> {
        let mut rule_groups = Vec::with_capacity(self.rules.len());
        let mut alternatives = Vec::with_capacity(self.rules.len());

        for (index, (label, pattern)) in self.rules.iter().enumerate() {
            if label.is_empty() {
                return Err(LanguageError::EmptyLabel(self.name.clone()));
            }
            // Compile each rule on its own first so errors point at the faulty rule.
            Regex::new(pattern).map_err(|source| LanguageError::Pattern {
                language: self.name.clone(),
                label: label.clone(),
                source,
            })?;

            let group = format!("__rule{index}");
            alternatives.push(format!("(?P<{group}>{pattern})"));
            rule_groups.push((group, label.clone()));
        }

        let pattern = if alternatives.is_empty() {
            None
        } else {
            let combined = format!("(?m){}", alternatives.join("|"));
            let regex = Regex::new(&combined).map_err(|source| LanguageError::Pattern {
                language: self.name.clone(),
                label: "*".to_string(),
                source,
            })?;
            Some(regex)
        };

        Ok(LanguageDescriptor {
            name: self.name,
            pattern,
            rule_groups,
            label_for: self.label_for,
            span_factories: self.span_factories,
            style_sheet: self.style_sheet,
            runnable: self.runnable,
            autocomplete: self.autocomplete,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_label_by_rule() {
        let language = LanguageDescriptor::builder("calc")
            .rule("number", "[0-9]+")
            .rule("operator", r"[+\-*/]")
            .build()
            .unwrap();

        let pattern = language.pattern().unwrap();
        let caps = pattern.captures("+").unwrap();
        assert_eq!(language.style_class_for(&caps).as_deref(), Some("operator"));
        let caps = pattern.captures("42").unwrap();
        assert_eq!(language.style_class_for(&caps).as_deref(), Some("number"));
        assert_eq!(language.rule_labels().collect::<Vec<_>>(), vec!["number", "operator"]);
    }

    #[test]
    fn test_no_rules_means_no_pattern() {
        let language = LanguageDescriptor::builder("notes").build().unwrap();
        assert!(language.pattern().is_none());
        assert_eq!(language.style_sheet(), DEFAULT_STYLE_SHEET);
        assert!(!language.is_runnable());
        assert!(!language.uses_autocomplete());
    }

    #[test]
    fn test_custom_label_function() {
        let language = LanguageDescriptor::builder("shout")
            .rule("word", "[a-z]+")
            .label_for(|caps| (caps[0].len() > 3).then(|| "long".to_string()))
            .runnable(true)
            .autocomplete(true)
            .build()
            .unwrap();

        let pattern = language.pattern().unwrap();
        assert_eq!(
            language.style_class_for(&pattern.captures("abcd").unwrap()),
            Some("long".to_string())
        );
        assert_eq!(language.style_class_for(&pattern.captures("ab").unwrap()), None);
        assert!(language.is_runnable());
        assert!(language.uses_autocomplete());
    }

    #[test]
    fn test_bad_rule_is_reported() {
        let err = LanguageDescriptor::builder("broken")
            .rule("number", "[0-9]+")
            .rule("oops", "(unclosed")
            .build()
            .unwrap_err();
        assert!(matches!(err, LanguageError::Pattern { ref label, .. } if label == "oops"));

        let err = LanguageDescriptor::builder("unlabeled")
            .rule("", "x")
            .build()
            .unwrap_err();
        assert!(matches!(err, LanguageError::EmptyLabel(ref name) if name == "unlabeled"));
    }
}
