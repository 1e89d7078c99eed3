//! Installing and tearing down the recursive directory watch.

use std::path::{Path, PathBuf};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::error::WatchError;
use super::event::ChangeEvent;
use super::supervisor::WatchSupervisor;

/// Capacity of the backend-to-supervisor channel.
const EVENT_BUFFER: usize = 256;

/// A running watch: the `notify` backend plus its supervisor task.
///
/// Dropping the handle stops the backend; `teardown` also waits for the
/// supervisor to finish.
pub struct WatchHandle {
    root: PathBuf,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
    /// The underlying file watcher (kept alive by storing it).
    _watcher: RecommendedWatcher,
}

impl WatchHandle {
    /// Start watching `root` recursively and spawn the supervisor.
    pub fn install(root: &Path, supervisor: WatchSupervisor) -> Result<Self, WatchError> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    for change in ChangeEvent::from_notify(&event) {
                        // Receiver gone means the watch is being torn down
                        if tx.blocking_send(change).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => {
                    tracing::error!("[watch] file watch error: {e}");
                }
            }
        })?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|e| WatchError::PathWatchFailed {
                path: root.to_path_buf(),
                reason: e.to_string(),
            })?;

        let shutdown = CancellationToken::new();
        let task = tokio::spawn(supervisor.run(rx, shutdown.clone()));

        crate::log_event!("watch", "started", "{}", root.display());
        Ok(Self {
            root: root.to_path_buf(),
            shutdown,
            task,
            _watcher: watcher,
        })
    }

    /// Stop the backend and wait for the supervisor to exit.
    pub async fn teardown(self) {
        let Self {
            root,
            shutdown,
            task,
            _watcher: watcher,
        } = self;

        drop(watcher);
        shutdown.cancel();
        if let Err(e) = task.await {
            if e.is_panic() {
                tracing::error!("[watch] supervisor panicked: {e}");
            }
        }
        crate::log_event!("watch", "stopped", "{}", root.display());
    }
}
