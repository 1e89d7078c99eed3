//! Per-path debounce ledger.
//!
//! Editors often write a file several times for a single save (truncate,
//! write, fsync, metadata). Only the first event per path inside the window
//! is accepted.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Remembers when each path last produced an accepted event.
///
/// Entries are never evicted; the working set is bounded by the source tree.
#[derive(Debug)]
pub struct DebounceLedger {
    /// path -> timestamp of last accepted event.
    accepted: HashMap<PathBuf, Instant>,
    /// Minimum interval between two accepted events on the same path.
    window: Duration,
}

impl DebounceLedger {
    pub fn new(window: Duration) -> Self {
        Self {
            accepted: HashMap::new(),
            window,
        }
    }

    /// Create a ledger with the given window in milliseconds.
    pub fn from_millis(window_ms: u64) -> Self {
        Self::new(Duration::from_millis(window_ms))
    }

    /// Accept or reject an event observed at `at`.
    ///
    /// Rejected events do not move the timestamp, so a steady stream of
    /// writes is accepted once per window rather than starved.
    pub fn accept(&mut self, path: &Path, at: Instant) -> bool {
        if let Some(last) = self.accepted.get(path) {
            if at.saturating_duration_since(*last) < self.window {
                return false;
            }
        }
        self.accepted.insert(path.to_path_buf(), at);
        true
    }

    /// Number of paths seen so far.
    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }
}
