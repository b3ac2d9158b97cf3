#![warn(missing_docs)]
//! IDE Core - headless, incremental syntax highlighting for the IDE's text editor
//!
//! # Overview
//!
//! `ide-core` keeps a document's styling up to date without blocking the thread that owns the
//! editor. On every text or caret change the editor issues a highlight request; the request is
//! computed on a background thread, older requests are cancelled, and only the newest result is
//! ever applied.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  EditorCore (text, caret, apply step)       │  ← UI thread
//! ├─────────────────────────────────────────────┤
//! │  RecomputeScheduler (cancel + arbitrate)    │  ← Concurrency
//! ├─────────────────────────────────────────────┤
//! │  Highlighter (regex pass + span factories)  │  ← Worker threads
//! ├─────────────────────────────────────────────┤
//! │  PatternMatcher / SpanFactory               │  ← Language plug-ins
//! ├─────────────────────────────────────────────┤
//! │  StyleSpanSet (run-length styling)          │  ← Data model
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use ide_core::{EditorCore, LanguageSupport, StyleLabel, StyleRun, first_named_group};
//! use regex::{Captures, Regex};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! struct Numbers(Regex);
//!
//! impl LanguageSupport for Numbers {
//!     fn name(&self) -> &str {
//!         "numbers"
//!     }
//!     fn pattern(&self) -> Option<&Regex> {
//!         Some(&self.0)
//!     }
//!     fn style_class_for(&self, captures: &Captures<'_>) -> Option<StyleLabel> {
//!         first_named_group(&self.0, captures)
//!     }
//! }
//!
//! let language = Arc::new(Numbers(Regex::new(r"(?P<number>[0-9]+)").unwrap()));
//! let mut editor = EditorCore::new("x = 42", language);
//! editor.highlight().unwrap();
//! editor.wait_for_highlight(Duration::from_secs(5)).unwrap();
//!
//! assert_eq!(
//!     editor.styles().runs(),
//!     &[StyleRun::plain(4), StyleRun::labeled(2, "number")]
//! );
//! ```
//!
//! # Module Description
//!
//! - [`spans`] - style runs and span sets
//! - [`matcher`] - the lexical regex pass
//! - [`factory`] - pluggable span contributors
//! - [`language`] - the language capability trait
//! - [`highlighter`] - composition of matcher and factories
//! - [`scheduler`] - background recompute and cancellation
//! - [`editor`] - the owning editor component
//!
//! All offsets are char offsets (Unicode scalar values).

pub mod config;
pub mod editor;
pub mod error;
pub mod factory;
pub mod highlighter;
pub mod language;
pub mod matcher;
pub mod request;
pub mod scheduler;
pub mod spans;

pub use config::EditorConfig;
pub use editor::{EditorCore, EditorEvent, EditorEventCallback};
pub use error::{ApplyOutcome, DiscardReason, EditorError, HighlightError, SpanError};
pub use factory::{FnSpanFactory, SpanFactory};
pub use highlighter::Highlighter;
pub use language::{DEFAULT_STYLE_SHEET, LanguageSupport, PlainText};
pub use matcher::{Match, first_named_group};
pub use request::{EditorSnapshot, HighlightRequest, RequestId};
pub use scheduler::{CancellationToken, ReadyStyles, RecomputeScheduler, SchedulerState};
pub use spans::{LabelSet, StyleLabel, StyleRun, StyleSpanSet, StyleSpanSetBuilder};
