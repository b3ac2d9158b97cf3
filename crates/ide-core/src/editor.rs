//! The editor component that owns the document and drives highlighting.
//!
//! [`EditorCore`] lives on a single thread (the UI thread). It holds the live text, caret and
//! selection, raises a highlight request for every qualifying change, and applies finished
//! results when [`EditorCore::process_pending`] is called from that thread.
//!
//! # Example
//!
//! ```rust
//! use ide_core::{EditorCore, PlainText};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let mut editor = EditorCore::new("hello", Arc::new(PlainText));
//! editor.insert(5, ", world").unwrap();
//! assert_eq!(editor.text(), "hello, world");
//! assert_eq!(editor.caret(), 12);
//!
//! editor.wait_for_highlight(Duration::from_secs(1)).unwrap();
//! assert_eq!(editor.styles().total_len(), 12);
//! ```

use crate::config::EditorConfig;
use crate::error::{ApplyOutcome, DiscardReason, EditorError, HighlightError};
use crate::factory::SpanFactory;
use crate::highlighter::Highlighter;
use crate::language::{LanguageSupport, PlainText};
use crate::request::{EditorSnapshot, RequestId};
use crate::scheduler::{Completion, ReadyStyles, RecomputeScheduler};
use crate::spans::StyleSpanSet;
use ropey::Rope;
use std::fmt;
use std::ops::Range;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};
use tracing::debug;

/// Something observable happened to an editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// Document text changed.
    TextChanged {
        /// Start char offset of the edit.
        start: usize,
        /// Chars removed at `start`.
        removed_len: usize,
        /// Chars inserted at `start`.
        inserted_len: usize,
        /// Document version after the edit.
        version: u64,
    },
    /// Caret moved.
    CaretMoved {
        /// New caret offset.
        offset: usize,
    },
    /// Selection changed.
    SelectionChanged {
        /// New selection (`None` = nothing selected).
        selection: Option<Range<usize>>,
    },
    /// Language was swapped.
    LanguageChanged {
        /// Name of the new language.
        name: String,
    },
    /// New styles now cover the document.
    StylesApplied {
        /// The request they were computed for (`None` for a direct [`EditorCore::apply_styles`]).
        request: Option<RequestId>,
    },
}

/// Editor event callback function type.
pub type EditorEventCallback = Box<dyn FnMut(&EditorEvent) + Send>;

#[derive(Debug, Clone)]
enum LinkEvent {
    Caret(usize),
    Selection(Option<Range<usize>>),
    Language(Arc<dyn LanguageSupport>),
}

/// A highlightable text editor, without any rendering.
pub struct EditorCore {
    text: Rope,
    caret: usize,
    selection: Option<Range<usize>>,
    editable: bool,
    version: u64,
    language: Arc<dyn LanguageSupport>,
    scheduler: RecomputeScheduler,
    styles: StyleSpanSet,
    applied_request: Option<RequestId>,
    config: EditorConfig,
    callbacks: Vec<EditorEventCallback>,
    links: Vec<mpsc::Sender<LinkEvent>>,
    inbox_tx: mpsc::Sender<LinkEvent>,
    inbox_rx: mpsc::Receiver<LinkEvent>,
}

impl EditorCore {
    /// Create an editor with the default configuration.
    ///
    /// Nothing is highlighted until the first change or an explicit [`Self::highlight`].
    pub fn new(text: &str, language: Arc<dyn LanguageSupport>) -> Self {
        Self::with_config(text, language, EditorConfig::default())
    }

    /// Create a plain-text editor.
    pub fn plain(text: &str) -> Self {
        Self::new(text, Arc::new(PlainText))
    }

    /// Create an editor with an explicit configuration.
    pub fn with_config(text: &str, language: Arc<dyn LanguageSupport>, config: EditorConfig) -> Self {
        let text = Rope::from_str(text);
        let styles = StyleSpanSet::plain(text.len_chars());
        let scheduler =
            RecomputeScheduler::new(Highlighter::new()).with_thread_name(&config.worker_thread_name);
        let (inbox_tx, inbox_rx) = mpsc::channel();

        Self {
            text,
            caret: 0,
            selection: None,
            editable: true,
            version: 0,
            language,
            scheduler,
            styles,
            applied_request: None,
            config,
            callbacks: Vec::new(),
            links: Vec::new(),
            inbox_tx,
            inbox_rx,
        }
    }

    /// Full document text.
    pub fn text(&self) -> String {
        self.text.to_string()
    }

    /// The document rope.
    pub fn rope(&self) -> &Rope {
        &self.text
    }

    /// Document length in chars.
    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    /// Caret offset (chars).
    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Current selection.
    pub fn selection(&self) -> Option<Range<usize>> {
        self.selection.clone()
    }

    /// Document version, incremented by every text change.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether user edits are accepted.
    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Allow or refuse user edits ([`Self::replace`], [`Self::insert`], [`Self::delete`]).
    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    /// Active language.
    pub fn language(&self) -> &Arc<dyn LanguageSupport> {
        &self.language
    }

    /// Active configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Toggle re-highlighting on caret-only moves.
    pub fn set_highlight_on_caret_move(&mut self, enabled: bool) {
        self.config.highlight_on_caret_move = enabled;
    }

    /// Styles currently covering the document.
    pub fn styles(&self) -> &StyleSpanSet {
        &self.styles
    }

    /// Request whose result produced [`Self::styles`], if any.
    pub fn applied_request(&self) -> Option<RequestId> {
        self.applied_request
    }

    /// The scheduler driving background highlighting.
    pub fn scheduler(&self) -> &RecomputeScheduler {
        &self.scheduler
    }

    /// The highlighter used for new requests.
    pub fn highlighter(&self) -> &Highlighter {
        self.scheduler.highlighter()
    }

    /// Immutable copy of the state a background computation needs. Copies the text.
    pub fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot::from_rope(&self.text, self.caret)
            .with_selection(self.selection.clone())
            .with_version(self.version)
    }

    /// Subscribe to editor events.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&EditorEvent) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Replace `range` with `text` as a user edit. The caret moves to the end of the insertion.
    ///
    /// Replacing text with identical text changes nothing and does not re-highlight (unless the
    /// caret moved).
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> Result<(), EditorError> {
        if !self.editable {
            return Err(EditorError::ReadOnly);
        }
        self.apply_edit(range, text)
    }

    /// Insert `text` at `offset` as a user edit.
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<(), EditorError> {
        self.replace(offset..offset, text)
    }

    /// Delete `range` as a user edit.
    pub fn delete(&mut self, range: Range<usize>) -> Result<(), EditorError> {
        self.replace(range, "")
    }

    /// Replace the whole document. Works on read-only editors too.
    pub fn set_text(&mut self, text: &str) -> Result<(), EditorError> {
        self.apply_edit(0..self.len_chars(), text)
    }

    /// Move the caret, clearing the selection.
    pub fn set_caret(&mut self, offset: usize) -> Result<(), EditorError> {
        let len = self.len_chars();
        if offset > len {
            return Err(EditorError::OffsetOutOfRange { offset, len });
        }
        self.update_selection(None);
        let moved = self.move_caret(offset);
        self.rehighlight_after(false, moved)?;
        Ok(())
    }

    /// Select `start..end`; the caret moves to `end`.
    pub fn select_range(&mut self, start: usize, end: usize) -> Result<(), EditorError> {
        let len = self.len_chars();
        if start > end || end > len {
            return Err(EditorError::InvalidRange { start, end, len });
        }
        self.select_range_unchecked(start, end)?;
        Ok(())
    }

    /// Swap the language and re-highlight.
    pub fn set_language(&mut self, language: Arc<dyn LanguageSupport>) -> Result<(), HighlightError> {
        debug!(language = language.name(), "language changed");
        self.language = language;
        self.emit(EditorEvent::LanguageChanged {
            name: self.language.name().to_string(),
        });
        self.forward(LinkEvent::Language(Arc::clone(&self.language)));
        self.highlight()?;
        Ok(())
    }

    /// Replace the highlighter (and its extension factories) and re-highlight.
    pub fn set_highlighter(&mut self, highlighter: Highlighter) -> Result<(), HighlightError> {
        self.scheduler.set_highlighter(highlighter);
        self.highlight()?;
        Ok(())
    }

    /// Register an editor-level span factory and re-highlight.
    pub fn register_span_factory(
        &mut self,
        factory: Arc<dyn SpanFactory>,
    ) -> Result<(), HighlightError> {
        self.scheduler.highlighter_mut().add_factory(factory);
        self.highlight()?;
        Ok(())
    }

    /// Start recomputing the styling of the current text, superseding any computation in flight.
    ///
    /// Returns `None` when the language has no pattern: nothing is computed, any in-flight work
    /// is cancelled and the document is shown unstyled.
    pub fn highlight(&mut self) -> Result<Option<RequestId>, HighlightError> {
        if self.language.pattern().is_none() {
            self.scheduler.cancel_current();
            debug!(language = self.language.name(), "language has no pattern; highlighting skipped");
            if !self.styles.is_plain() {
                self.styles = StyleSpanSet::plain(self.len_chars());
                self.applied_request = None;
                self.emit(EditorEvent::StylesApplied { request: None });
            }
            return Ok(None);
        }

        // Rope clones are O(1); the text is copied out on the worker.
        let rope = self.text.clone();
        let (caret, selection, version) = (self.caret, self.selection.clone(), self.version);
        let id = self.scheduler.submit_with(
            move || {
                EditorSnapshot::from_rope(&rope, caret)
                    .with_selection(selection)
                    .with_version(version)
            },
            Arc::clone(&self.language),
        )?;
        Ok(Some(id))
    }

    /// Apply `spans` directly (display-layer surface).
    ///
    /// A set whose length differs from the live text is silently dropped.
    pub fn apply_styles(&mut self, spans: StyleSpanSet) -> ApplyOutcome {
        let len = self.len_chars();
        if let Err(err) = spans.check_len(len) {
            debug!("ignoring out-of-range style application: {}", err);
            return ApplyOutcome::Discarded(DiscardReason::OutOfRangeApply {
                expected: len,
                actual: spans.total_len(),
            });
        }
        self.styles = spans;
        self.applied_request = None;
        self.emit(EditorEvent::StylesApplied { request: None });
        ApplyOutcome::Applied
    }

    /// Drain everything queued for this thread: mirrored updates and finished computations.
    ///
    /// Returns how many results were applied. Only plugin failures are reported as errors; stale
    /// results are dropped silently.
    pub fn process_pending(&mut self) -> Result<usize, HighlightError> {
        self.drain_links()?;

        let mut applied = 0;
        while let Some(ready) = self.scheduler.poll()? {
            applied += usize::from(self.apply_ready(ready).is_applied());
        }
        Ok(applied)
    }

    /// Block this thread until the current computation has been applied (or dropped), or until
    /// `timeout` elapses.
    pub fn wait_for_highlight(&mut self, timeout: Duration) -> Result<usize, HighlightError> {
        let deadline = Instant::now() + timeout;
        let mut applied = self.process_pending()?;

        while !self.scheduler.is_idle() {
            let now = Instant::now();
            if now >= deadline {
                debug!(state = ?self.scheduler.state(), "timed out waiting for highlighting");
                break;
            }
            if let Some(completion) = self.scheduler.recv_timeout(deadline - now) {
                applied += self.handle_completion(completion)?;
            }
        }

        Ok(applied)
    }

    /// Make `mirror` follow `source`'s caret, selection and language.
    ///
    /// The mirror becomes read-only. Updates are delivered through the mirror's
    /// [`Self::process_pending`]; a caret or selection reaching past the mirror's text is dropped.
    pub fn control_from(source: &mut EditorCore, mirror: &mut EditorCore) {
        mirror.set_editable(false);
        source.links.push(mirror.inbox_tx.clone());
    }

    fn apply_edit(&mut self, range: Range<usize>, inserted: &str) -> Result<(), EditorError> {
        let len = self.len_chars();
        if range.start > range.end || range.end > len {
            return Err(EditorError::InvalidRange {
                start: range.start,
                end: range.end,
                len,
            });
        }

        let inserted_len = inserted.chars().count();
        let text_changed =
            range.len() != inserted_len || self.text.slice(range.clone()).to_string() != inserted;

        if text_changed {
            self.text.remove(range.clone());
            self.text.insert(range.start, inserted);
            self.version += 1;

            if let Err(err) = self.styles.splice(range.clone(), inserted_len) {
                debug!("applied styles out of sync ({}); resetting", err);
                self.styles = StyleSpanSet::plain(self.len_chars());
            }
            self.update_selection(None);
            self.emit(EditorEvent::TextChanged {
                start: range.start,
                removed_len: range.len(),
                inserted_len,
                version: self.version,
            });
        }

        let moved = self.move_caret(range.start + inserted_len);
        self.rehighlight_after(text_changed, moved)?;
        Ok(())
    }

    fn select_range_unchecked(&mut self, start: usize, end: usize) -> Result<(), HighlightError> {
        self.update_selection((start < end).then_some(start..end));
        let moved = self.move_caret(end);
        self.rehighlight_after(false, moved)
    }

    fn update_selection(&mut self, selection: Option<Range<usize>>) {
        if self.selection == selection {
            return;
        }
        self.selection = selection.clone();
        self.emit(EditorEvent::SelectionChanged {
            selection: selection.clone(),
        });
        self.forward(LinkEvent::Selection(selection));
    }

    fn move_caret(&mut self, offset: usize) -> bool {
        if self.caret == offset {
            return false;
        }
        self.caret = offset;
        self.emit(EditorEvent::CaretMoved { offset });
        self.forward(LinkEvent::Caret(offset));
        true
    }

    fn rehighlight_after(&mut self, text_changed: bool, caret_moved: bool) -> Result<(), HighlightError> {
        if text_changed || (caret_moved && self.config.highlight_on_caret_move) {
            self.highlight()?;
        }
        Ok(())
    }

    fn handle_completion(&mut self, completion: Completion) -> Result<usize, HighlightError> {
        match self.scheduler.accept(completion)? {
            Some(ready) => Ok(usize::from(self.apply_ready(ready).is_applied())),
            None => Ok(0),
        }
    }

    /// The apply step. Runs on the owning thread; any mismatch is a benign race.
    fn apply_ready(&mut self, ready: ReadyStyles) -> ApplyOutcome {
        let len = self.len_chars();
        if ready.target_len != len || ready.spans.total_len() != len {
            debug!(request = %ready.id, expected = len, actual = ready.spans.total_len(), "ignoring out-of-range style application");
            return ApplyOutcome::Discarded(DiscardReason::OutOfRangeApply {
                expected: len,
                actual: ready.spans.total_len(),
            });
        }
        if ready.version != self.version {
            debug!(request = %ready.id, computed_for = ready.version, current = self.version, "document changed since request; dropping result");
            return ApplyOutcome::Discarded(DiscardReason::StaleResult);
        }

        self.styles = ready.spans;
        self.applied_request = Some(ready.id);
        self.emit(EditorEvent::StylesApplied {
            request: Some(ready.id),
        });
        ApplyOutcome::Applied
    }

    fn drain_links(&mut self) -> Result<(), HighlightError> {
        let mut latest_caret = None;

        while let Ok(event) = self.inbox_rx.try_recv() {
            match event {
                LinkEvent::Caret(offset) => latest_caret = Some(offset),
                LinkEvent::Selection(None) => self.update_selection(None),
                LinkEvent::Selection(Some(range)) => {
                    if range.end <= self.len_chars() {
                        self.select_range_unchecked(range.start, range.end)?;
                    } else {
                        debug!(?range, len = self.len_chars(), "dropping mirrored selection past end of text");
                    }
                }
                LinkEvent::Language(language) => self.set_language(language)?,
            }
        }

        // Only the most recent caret position matters.
        if let Some(offset) = latest_caret {
            if offset <= self.len_chars() {
                let moved = self.move_caret(offset);
                self.rehighlight_after(false, moved)?;
            } else {
                debug!(offset, len = self.len_chars(), "dropping mirrored caret past end of text");
            }
        }
        Ok(())
    }

    fn emit(&mut self, event: EditorEvent) {
        for callback in &mut self.callbacks {
            callback(&event);
        }
    }

    fn forward(&mut self, event: LinkEvent) {
        // A failed send means the mirror was dropped.
        self.links.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl fmt::Debug for EditorCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorCore")
            .field("len_chars", &self.len_chars())
            .field("caret", &self.caret)
            .field("selection", &self.selection)
            .field("editable", &self.editable)
            .field("version", &self.version)
            .field("language", &self.language.name())
            .field("scheduler", &self.scheduler.state())
            .field("applied_request", &self.applied_request)
            .finish_non_exhaustive()
    }
}
