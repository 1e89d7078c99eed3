#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use qml_hotreload::config::{LinkMode, Settings};
use qml_hotreload::link::{Acknowledgement, Link, LinkError, Message};

/// In-process companion that records what it was sent.
pub struct ScriptedLink {
    reachable: AtomicBool,
    deliverable: AtomicBool,
    delay: Duration,
    probes: AtomicUsize,
    messages: Mutex<Vec<String>>,
}

impl ScriptedLink {
    pub fn new() -> Arc<Self> {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reachable: AtomicBool::new(true),
            deliverable: AtomicBool::new(true),
            delay,
            probes: AtomicUsize::new(0),
            messages: Mutex::new(Vec::new()),
        })
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Keep answering probes but refuse deliveries.
    pub fn set_deliverable(&self, deliverable: bool) {
        self.deliverable.store(deliverable, Ordering::SeqCst);
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    fn unreachable(&self) -> LinkError {
        LinkError::Unreachable {
            endpoint: PathBuf::from("scripted"),
            source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
        }
    }
}

#[async_trait]
impl Link for ScriptedLink {
    fn endpoint(&self) -> String {
        "scripted".to_string()
    }

    async fn deliver(&self, message: &Message) -> Result<Acknowledgement, LinkError> {
        if !self.reachable.load(Ordering::SeqCst) || !self.deliverable.load(Ordering::SeqCst) {
            return Err(self.unreachable());
        }
        tokio::time::sleep(self.delay).await;
        self.messages.lock().push(message.to_string());
        Ok(Acknowledgement::from_bytes(b"OK"))
    }

    async fn probe(&self) -> Result<(), LinkError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(self.unreachable())
        }
    }
}

/// Settings pointed at `root` with short timers.
pub fn test_settings(root: &Path, mode: LinkMode) -> Settings {
    let mut settings = Settings::default();
    settings.watch.root = root.to_path_buf();
    settings.watch.debounce_ms = 300;
    settings.link.mode = mode;
    settings.link.poll_interval_ms = 50;
    settings.link.probe_timeout_ms = 200;
    settings.link.delivery_timeout_ms = 500;
    settings
}

/// Poll `check` until it holds or `limit` elapses.
pub async fn wait_for(limit: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
