//! Editor configuration.

use crate::scheduler::DEFAULT_WORKER_THREAD_NAME;
use serde::{Deserialize, Serialize};

/// Tunables for an [`EditorCore`](crate::EditorCore).
///
/// Deserializable so hosts can keep it in their settings file; missing fields take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Re-highlight when only the caret moves (needed by caret-aware span factories).
    pub highlight_on_caret_move: bool,
    /// Name prefix for background highlighting threads.
    pub worker_thread_name: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            highlight_on_caret_move: true,
            worker_thread_name: DEFAULT_WORKER_THREAD_NAME.to_string(),
        }
    }
}
