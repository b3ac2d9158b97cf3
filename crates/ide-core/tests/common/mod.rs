#![allow(dead_code)]

use ide_core::{
    EditorSnapshot, LanguageSupport, SpanFactory, StyleLabel, StyleSpanSet, first_named_group,
};
use regex::{Captures, Regex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, mpsc};

pub const NUMBER_PATTERN: &str = "[0-9]+";
pub const STRING_PATTERN: &str = r#""([^"\\]|\\.)*""#;

/// Numbers and strings, with optional extra factories and a label-call counter.
pub struct TestLanguage {
    pattern: Option<Regex>,
    factories: Vec<Arc<dyn SpanFactory>>,
    pub label_calls: AtomicUsize,
}

impl TestLanguage {
    pub fn numbers_and_strings() -> Self {
        let pattern = format!("(?P<number>{NUMBER_PATTERN})|(?P<string>{STRING_PATTERN})");
        Self {
            pattern: Some(Regex::new(&pattern).unwrap()),
            factories: Vec::new(),
            label_calls: AtomicUsize::new(0),
        }
    }

    pub fn without_pattern() -> Self {
        Self {
            pattern: None,
            factories: Vec::new(),
            label_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_factory(mut self, factory: Arc<dyn SpanFactory>) -> Self {
        self.factories.push(factory);
        self
    }
}

impl LanguageSupport for TestLanguage {
    fn name(&self) -> &str {
        "test"
    }

    fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    fn style_class_for(&self, captures: &Captures<'_>) -> Option<StyleLabel> {
        self.label_calls.fetch_add(1, Ordering::SeqCst);
        first_named_group(self.pattern.as_ref()?, captures)
    }

    fn span_factories(&self) -> &[Arc<dyn SpanFactory>] {
        &self.factories
    }
}

/// Counts invocations and contributes nothing.
#[derive(Default)]
pub struct CountingFactory {
    pub calls: AtomicUsize,
}

impl SpanFactory for CountingFactory {
    fn name(&self) -> &str {
        "counting"
    }

    fn create(&self, snapshot: &EditorSnapshot) -> StyleSpanSet {
        self.calls.fetch_add(1, Ordering::SeqCst);
        StyleSpanSet::plain(snapshot.len())
    }
}

/// Blocks every computation until the test hands out a permit.
///
/// Each entry is announced on `entered`, so a test can tell that a computation is in flight.
pub struct GateFactory {
    permits: Mutex<mpsc::Receiver<()>>,
    entered: Mutex<mpsc::Sender<()>>,
}

impl GateFactory {
    pub fn new() -> (Arc<Self>, mpsc::Sender<()>, mpsc::Receiver<()>) {
        let (permit_tx, permit_rx) = mpsc::channel();
        let (entered_tx, entered_rx) = mpsc::channel();
        let gate = Arc::new(Self {
            permits: Mutex::new(permit_rx),
            entered: Mutex::new(entered_tx),
        });
        (gate, permit_tx, entered_rx)
    }
}

impl SpanFactory for GateFactory {
    fn name(&self) -> &str {
        "gate"
    }

    fn create(&self, snapshot: &EditorSnapshot) -> StyleSpanSet {
        let _ = self.entered.lock().unwrap().send(());
        let _ = self.permits.lock().unwrap().recv();
        StyleSpanSet::plain(snapshot.len())
    }
}
