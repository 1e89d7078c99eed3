//! Change events normalized from raw `notify` events.

use std::path::{Path, PathBuf};
use std::time::Instant;

use notify::event::{EventKind, ModifyKind, RenameMode};

/// How a file changed. Only used for status lines once an event is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Modified,
    Moved,
}

impl ChangeKind {
    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::Modified => "modified",
            ChangeKind::Moved => "moved",
        }
    }
}

/// A single filesystem change, ready for the filter chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    /// Changed file, or the destination of a move. `None` for a move whose
    /// destination the backend did not report.
    pub path: Option<PathBuf>,
    pub is_directory: bool,
    pub observed_at: Instant,
}

impl ChangeEvent {
    pub fn modified(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: ChangeKind::Modified,
            path: Some(path.into()),
            is_directory: false,
            observed_at: Instant::now(),
        }
    }

    pub fn moved(destination: Option<PathBuf>) -> Self {
        Self {
            kind: ChangeKind::Moved,
            path: destination,
            is_directory: false,
            observed_at: Instant::now(),
        }
    }

    /// Override the observation time.
    pub fn at(mut self, observed_at: Instant) -> Self {
        self.observed_at = observed_at;
        self
    }

    /// Mark the event as directory-level.
    pub fn directory(mut self) -> Self {
        self.is_directory = true;
        self
    }

    /// Normalize a raw `notify` event.
    ///
    /// Only modifications and moves are relevant: creations, removals and
    /// accesses produce nothing. Directory status is read from the filesystem
    /// at observation time.
    pub fn from_notify(event: &notify::Event) -> Vec<ChangeEvent> {
        let observed_at = Instant::now();
        let stamp = |change: ChangeEvent| ChangeEvent {
            is_directory: change.path.as_deref().is_some_and(Path::is_dir),
            ..change.at(observed_at)
        };

        match event.kind {
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                // paths = [from, to]
                vec![stamp(ChangeEvent::moved(event.paths.get(1).cloned()))]
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
                if event.paths.is_empty() {
                    return vec![stamp(ChangeEvent::moved(None))];
                }
                event
                    .paths
                    .iter()
                    .map(|p| stamp(ChangeEvent::moved(Some(p.clone()))))
                    .collect()
            }
            // Backends that cannot pair rename halves (FSEvents) report each
            // side as `Any`; the side that still exists is the destination.
            EventKind::Modify(ModifyKind::Name(RenameMode::Any)) => event
                .paths
                .iter()
                .filter(|p| p.exists())
                .map(|p| stamp(ChangeEvent::moved(Some(p.clone()))))
                .collect(),
            EventKind::Modify(ModifyKind::Name(_)) => Vec::new(),
            EventKind::Modify(_) => event
                .paths
                .iter()
                .map(|p| stamp(ChangeEvent::modified(p.clone())))
                .collect(),
            _ => Vec::new(),
        }
    }
}
