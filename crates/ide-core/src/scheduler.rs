//! Background recompute with cooperative cancellation.
//!
//! Every highlight request runs on its own short-lived worker thread. Starting a new request
//! cancels the previous one by flipping its [`CancellationToken`]; the old worker notices at its
//! next checkpoint, or runs to completion and has its result thrown away.
//!
//! Results travel back over a channel that only the thread owning the editor drains (the "UI
//! thread"). Whether a result is still wanted is decided there, by request id, not by trusting
//! the worker to have stopped in time:
//!
//! ```text
//! Idle ──submit──▶ Running(n) ──complete(n)──▶ Idle
//!                  Running(n) ──submit──▶ Running(n+1), cancel(n)
//!                  Running(n) ──complete(m ≠ n)──▶ Running(n)   (result dropped)
//! ```

use crate::error::HighlightError;
use crate::highlighter::Highlighter;
use crate::language::LanguageSupport;
use crate::request::{EditorSnapshot, HighlightRequest, RequestId};
use crate::spans::StyleSpanSet;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, trace};

/// Default name prefix of highlighting worker threads.
pub const DEFAULT_WORKER_THREAD_NAME: &str = "ide-highlight";

/// A shared "please stop" flag handed to a background computation.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns `true` once [`Self::cancel`] has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Scheduler state for one editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No computation is current.
    Idle,
    /// The computation for this request is current.
    Running(RequestId),
}

/// A finished computation, still on its way to the UI thread.
#[derive(Debug)]
pub(crate) struct Completion {
    id: RequestId,
    token: CancellationToken,
    version: u64,
    target_len: usize,
    result: Result<StyleSpanSet, HighlightError>,
}

/// A result that passed the recency check and may be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyStyles {
    /// Request the spans were computed for.
    pub id: RequestId,
    /// Document version of the request's snapshot.
    pub version: u64,
    /// Length of the snapshot the spans describe.
    pub target_len: usize,
    /// The computed spans.
    pub spans: StyleSpanSet,
}

#[derive(Debug)]
struct InFlight {
    id: RequestId,
    token: CancellationToken,
}

/// Starts, cancels and arbitrates background highlight computations for one editor.
#[derive(Debug)]
pub struct RecomputeScheduler {
    highlighter: Arc<Highlighter>,
    in_flight: Option<InFlight>,
    last_id: u64,
    thread_name: String,
    tx: mpsc::Sender<Completion>,
    rx: mpsc::Receiver<Completion>,
}

impl RecomputeScheduler {
    /// Create an idle scheduler using `highlighter`.
    pub fn new(highlighter: Highlighter) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            highlighter: Arc::new(highlighter),
            in_flight: None,
            last_id: 0,
            thread_name: DEFAULT_WORKER_THREAD_NAME.to_string(),
            tx,
            rx,
        }
    }

    /// Override the worker thread name prefix.
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// The highlighter used for new requests.
    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    /// Replace the highlighter. In-flight work keeps the one it started with.
    pub fn set_highlighter(&mut self, highlighter: Highlighter) {
        self.highlighter = Arc::new(highlighter);
    }

    /// Mutable access to the highlighter for new requests (copy-on-write).
    pub fn highlighter_mut(&mut self) -> &mut Highlighter {
        Arc::make_mut(&mut self.highlighter)
    }

    /// Current state.
    pub fn state(&self) -> SchedulerState {
        match &self.in_flight {
            Some(in_flight) => SchedulerState::Running(in_flight.id),
            None => SchedulerState::Idle,
        }
    }

    /// Returns `true` if no computation is current.
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_none()
    }

    /// Id of the most recently created request, if any.
    pub fn last_request_id(&self) -> Option<RequestId> {
        (self.last_id > 0).then_some(RequestId(self.last_id))
    }

    /// Cancel whatever is current and start computing `snapshot` in the background.
    pub fn submit(
        &mut self,
        snapshot: EditorSnapshot,
        language: Arc<dyn LanguageSupport>,
    ) -> Result<RequestId, HighlightError> {
        self.submit_with(move || snapshot, language)
    }

    /// Like [`Self::submit`], but the snapshot is built on the worker thread.
    ///
    /// Lets the owner hand over a cheap handle (a rope clone) instead of copying the text on its
    /// own thread.
    pub fn submit_with<F>(
        &mut self,
        snapshot: F,
        language: Arc<dyn LanguageSupport>,
    ) -> Result<RequestId, HighlightError>
    where
        F: FnOnce() -> EditorSnapshot + Send + 'static,
    {
        self.cancel_current();

        self.last_id += 1;
        let id = RequestId(self.last_id);
        let token = CancellationToken::new();
        let worker = Worker {
            id,
            snapshot: Box::new(snapshot),
            language,
            highlighter: Arc::clone(&self.highlighter),
            token: token.clone(),
            tx: self.tx.clone(),
        };

        // Detached: a worker never blocks editor or process shutdown.
        thread::Builder::new()
            .name(format!("{}-{}", self.thread_name, id.0))
            .spawn(move || worker.run())?;

        debug!(request = %id, "started highlight computation");
        self.in_flight = Some(InFlight { id, token });
        Ok(id)
    }

    /// Cancel the current computation, if any, and return to [`SchedulerState::Idle`].
    pub fn cancel_current(&mut self) -> Option<RequestId> {
        let in_flight = self.in_flight.take()?;
        in_flight.token.cancel();
        debug!(request = %in_flight.id, "cancelled highlight computation");
        Some(in_flight.id)
    }

    /// Drain finished computations without blocking and return the first one that is current.
    ///
    /// Stale results are dropped on the way. Must be called from the thread that owns the editor.
    pub fn poll(&mut self) -> Result<Option<ReadyStyles>, HighlightError> {
        while let Some(completion) = self.try_recv() {
            if let Some(ready) = self.accept(completion)? {
                return Ok(Some(ready));
            }
        }
        Ok(None)
    }

    pub(crate) fn try_recv(&self) -> Option<Completion> {
        self.rx.try_recv().ok()
    }

    pub(crate) fn recv_timeout(&self, timeout: Duration) -> Option<Completion> {
        // The scheduler keeps a sender alive, so the channel never disconnects.
        self.rx.recv_timeout(timeout).ok()
    }

    /// Recency check: keep a completion only if it is the current request and not cancelled.
    pub(crate) fn accept(
        &mut self,
        completion: Completion,
    ) -> Result<Option<ReadyStyles>, HighlightError> {
        let is_current = matches!(&self.in_flight, Some(in_flight) if in_flight.id == completion.id);
        if !is_current || completion.token.is_cancelled() {
            debug!(request = %completion.id, "discarding stale highlight result");
            return Ok(None);
        }

        self.in_flight = None;
        match completion.result {
            Ok(spans) => Ok(Some(ReadyStyles {
                id: completion.id,
                version: completion.version,
                target_len: completion.target_len,
                spans,
            })),
            Err(err) if err.is_cancelled() => Ok(None),
            Err(err) => {
                error!(request = %completion.id, "highlighting failed: {}", err);
                Err(err)
            }
        }
    }
}

impl Default for RecomputeScheduler {
    fn default() -> Self {
        Self::new(Highlighter::default())
    }
}

struct Worker {
    id: RequestId,
    snapshot: Box<dyn FnOnce() -> EditorSnapshot + Send>,
    language: Arc<dyn LanguageSupport>,
    highlighter: Arc<Highlighter>,
    token: CancellationToken,
    tx: mpsc::Sender<Completion>,
}

impl Worker {
    fn run(self) {
        let Worker {
            id,
            snapshot,
            language,
            highlighter,
            token,
            tx,
        } = self;

        if token.is_cancelled() {
            trace!(request = %id, "cancelled before start");
            return;
        }
        let request = HighlightRequest::new(id, snapshot());

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            highlighter.create_style_spans(&request, language.as_ref(), &token)
        }))
        .unwrap_or_else(|payload| {
            Err(HighlightError::LanguagePanicked {
                language: language.name().to_string(),
                message: panic_message(payload.as_ref()),
            })
        });

        if token.is_cancelled() {
            trace!(request = %request.id(), "cancelled; result dropped on the worker");
            return;
        }

        let completion = Completion {
            id: request.id(),
            token,
            version: request.snapshot().version(),
            target_len: request.target_len(),
            result,
        };
        // A closed channel means the editor is gone.
        let _ = tx.send(completion);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlainText;

    #[test]
    fn test_token_is_shared_between_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_submit_cancels_previous() {
        let mut scheduler = RecomputeScheduler::default();
        assert_eq!(scheduler.state(), SchedulerState::Idle);

        let first = scheduler
            .submit(EditorSnapshot::new("a", 0), Arc::new(PlainText))
            .unwrap();
        let second = scheduler
            .submit(EditorSnapshot::new("ab", 0), Arc::new(PlainText))
            .unwrap();

        assert!(second > first);
        assert_eq!(scheduler.state(), SchedulerState::Running(second));
        assert_eq!(scheduler.last_request_id(), Some(second));

        assert_eq!(scheduler.cancel_current(), Some(second));
        assert!(scheduler.is_idle());
        assert_eq!(scheduler.cancel_current(), None);
    }

    #[test]
    fn test_accept_drops_stale_completion() {
        let mut scheduler = RecomputeScheduler::default();
        let current = scheduler
            .submit(EditorSnapshot::new("abc", 0), Arc::new(PlainText))
            .unwrap();

        let stale = Completion {
            id: RequestId(current.0 + 100),
            token: CancellationToken::new(),
            version: 0,
            target_len: 3,
            result: Ok(StyleSpanSet::plain(3)),
        };
        assert!(scheduler.accept(stale).unwrap().is_none());
        assert_eq!(scheduler.state(), SchedulerState::Running(current));
    }

    fn completion(id: u64, token: CancellationToken, len: usize) -> Completion {
        Completion {
            id: RequestId(id),
            token,
            version: 0,
            target_len: len,
            result: Ok(StyleSpanSet::plain(len)),
        }
    }

    #[test]
    fn test_poll_skips_stale_and_returns_current() {
        let mut scheduler = RecomputeScheduler::default();
        let token = CancellationToken::new();
        scheduler.last_id = 2;
        scheduler.in_flight = Some(InFlight {
            id: RequestId(2),
            token: token.clone(),
        });

        scheduler.tx.send(completion(1, CancellationToken::new(), 4)).unwrap();
        scheduler.tx.send(completion(2, token, 5)).unwrap();

        let ready = scheduler.poll().unwrap().expect("current result");
        assert_eq!(ready.id, RequestId(2));
        assert_eq!(ready.target_len, 5);
        assert_eq!(ready.spans, StyleSpanSet::plain(5));
        assert!(scheduler.is_idle());
        assert_eq!(scheduler.poll().unwrap(), None);
    }

    #[test]
    fn test_poll_drops_cancelled_current_request() {
        let mut scheduler = RecomputeScheduler::default();
        let token = CancellationToken::new();
        scheduler.in_flight = Some(InFlight {
            id: RequestId(1),
            token: token.clone(),
        });
        token.cancel();

        scheduler.tx.send(completion(1, token, 3)).unwrap();
        assert_eq!(scheduler.poll().unwrap(), None);
        assert_eq!(scheduler.state(), SchedulerState::Running(RequestId(1)));
    }

    #[test]
    fn test_submit_with_builds_snapshot_on_worker() {
        let mut scheduler = RecomputeScheduler::default();
        let id = scheduler
            .submit_with(|| EditorSnapshot::new("abcd", 0), Arc::new(PlainText))
            .unwrap();

        let completion = scheduler
            .recv_timeout(Duration::from_secs(10))
            .expect("worker finished");
        let ready = scheduler.accept(completion).unwrap().expect("current result");
        assert_eq!(ready.id, id);
        assert_eq!(ready.target_len, 4);
    }

    #[test]
    fn test_panic_message_extracts_strings() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(5u8);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
