//! Built-in languages.

use crate::descriptor::LanguageDescriptor;
use crate::error::LanguageError;
use crate::factories::{BracketMatchFactory, CaretOccurrencesFactory};
use ide_core::{LanguageSupport, PlainText};
use std::path::Path;
use std::sync::Arc;

/// Decimal integers.
pub const NUMBER_PATTERN: &str = "[0-9]+";
/// Double-quoted string literal with backslash escapes.
pub const STRING_PATTERN: &str = r#""(?:\\.|[^"\\])*""#;

const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "package", "private", "protected", "public", "return", "short", "static",
    "strictfp", "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try",
    "void", "volatile", "while",
];

/// The plain-text language: no pattern, no highlighting.
pub fn plain_text() -> Arc<dyn LanguageSupport> {
    Arc::new(PlainText)
}

/// Java, with caret-word and bracket matching.
pub fn java() -> Result<LanguageDescriptor, LanguageError> {
    LanguageDescriptor::builder("Java")
        .rule("comment", r"//[^\n]*|/\*(?s:.*?)\*/")
        .rule("string", STRING_PATTERN)
        .rule("char", r"'(?:\\.|[^'\\])'")
        .rule("keyword", format!(r"\b(?:{})\b", JAVA_KEYWORDS.join("|")))
        .rule("annotation", r"@[A-Za-z_][A-Za-z0-9_]*")
        .rule("number", r"\b[0-9]+(?:\.[0-9]+)?[fFdDlL]?\b")
        .rule("paren", r"[()]")
        .rule("brace", r"[{}]")
        .rule("bracket", r"[\[\]]")
        .rule("semicolon", ";")
        .span_factory(Arc::new(CaretOccurrencesFactory::new()))
        .span_factory(Arc::new(BracketMatchFactory::new()))
        .style_sheet("styles/java.css")
        .build()
}

/// CSS stylesheets.
pub fn css() -> Result<LanguageDescriptor, LanguageError> {
    LanguageDescriptor::builder("CSS")
        .rule("comment", r"/\*(?s:.*?)\*/")
        .rule("string", format!(r#"{STRING_PATTERN}|'(?:\\.|[^'\\])*'"#))
        .rule("at-rule", r"@[A-Za-z-]+")
        .rule("color", r"#[0-9a-fA-F]{3,8}\b")
        .rule("selector", r"[.#][A-Za-z_-][A-Za-z0-9_-]*")
        .rule("number", r"-?[0-9]+(?:\.[0-9]+)?(?:px|em|rem|vh|vw|ms|s|%)?")
        .rule("brace", r"[{}]")
        .span_factory(Arc::new(BracketMatchFactory::new()))
        .style_sheet("styles/css.css")
        .build()
}

/// JSON documents (strings, numbers, booleans, null).
pub fn json() -> Result<LanguageDescriptor, LanguageError> {
    LanguageDescriptor::builder("JSON")
        .rule("string", STRING_PATTERN)
        .rule("number", r"-?(?:0|[1-9]\d*)(?:\.\d+)?(?:[eE][+-]?\d+)?")
        .rule("boolean", r"\b(?:true|false)\b")
        .rule("null", r"\bnull\b")
        .span_factory(Arc::new(BracketMatchFactory::new()))
        .style_sheet("styles/json.css")
        .build()
}

/// INI files (sections, keys, comments).
///
/// A key match includes the trailing `=`.
pub fn ini() -> Result<LanguageDescriptor, LanguageError> {
    LanguageDescriptor::builder("INI")
        .rule("section", r"^[ \t]*\[[^\]\n]+\]")
        .rule("comment", r"^[ \t]*[;#][^\n]*")
        .rule("key", r"^[ \t]*[^=\s;#\[][^=\n]*=")
        .style_sheet("styles/ini.css")
        .build()
}

/// Pick a language from a file extension (case-insensitive, without the dot).
///
/// Unknown extensions fall back to plain text.
pub fn language_for_extension(extension: &str) -> Result<Arc<dyn LanguageSupport>, LanguageError> {
    let language: Arc<dyn LanguageSupport> = match extension.to_ascii_lowercase().as_str() {
        "java" => Arc::new(java()?),
        "css" => Arc::new(css()?),
        "json" => Arc::new(json()?),
        "ini" | "cfg" | "conf" => Arc::new(ini()?),
        other => {
            tracing::debug!(extension = other, "no language for extension; using plain text");
            plain_text()
        }
    };
    Ok(language)
}

/// Pick a language from a file path's extension.
pub fn language_for_path(path: impl AsRef<Path>) -> Result<Arc<dyn LanguageSupport>, LanguageError> {
    let extension = path
        .as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    language_for_extension(extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_language_lookup() {
        assert_eq!(language_for_path("src/Main.java").unwrap().name(), "Java");
        assert_eq!(language_for_path("theme.CSS").unwrap().name(), "CSS");
        assert_eq!(language_for_path("package.json").unwrap().name(), "JSON");
        assert_eq!(language_for_path("setup.cfg").unwrap().name(), "INI");
        assert_eq!(language_for_path("README").unwrap().name(), "Plain Text");
        assert_eq!(language_for_extension("rs").unwrap().name(), "Plain Text");
    }

    #[test]
    fn test_plain_text_has_no_pattern() {
        assert!(plain_text().pattern().is_none());
    }

    #[test]
    fn test_built_ins_compile() {
        let java = java().unwrap();
        assert_eq!(java.span_factories().len(), 2);
        assert_eq!(java.style_sheet(), "styles/java.css");
        assert!(css().unwrap().pattern().is_some());
        assert!(json().unwrap().pattern().is_some());
        assert!(ini().unwrap().span_factories().is_empty());
    }
}
