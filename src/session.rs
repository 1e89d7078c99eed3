//! Session controller.
//!
//! Owns the operating mode, the connection/watch state object and the poll
//! timer. The timer, delivery reports and the shutdown token all arrive in a
//! single `select!` loop, so the state has exactly one writer.
//!
//! - Reactive: the watch is installed at startup and stays up.
//! - Polling: the endpoint is probed every `poll_interval`; the watch only
//!   runs while the companion answers.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

use crate::config::{LinkConfig, LinkMode, Settings};
use crate::error::Result;
use crate::link::{
    Acknowledgement, Link, LinkState, Message, NotifierLink, SessionState, Transition, WatchState,
    deliver_logged,
};
use crate::watcher::{DeliveryReport, FileFilter, WatchError, WatchHandle, WatchSupervisor};

/// Snapshot of the session published after every state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    pub mode: LinkMode,
    pub link: LinkState,
    pub watch: WatchState,
    /// How many times the watch has been installed.
    pub installs: u64,
    /// Delivery attempts that got an acknowledgement.
    pub deliveries: u64,
    /// Delivery attempts that failed.
    pub failures: u64,
}

/// Read-only view shared with observers.
pub type SharedStatus = Arc<RwLock<SessionStatus>>;

pub struct Session {
    settings: Settings,
    link: Arc<dyn Link>,
    status: SharedStatus,
    state: SessionState,
    watch: Option<WatchHandle>,
    generation: u64,
    installs: u64,
    deliveries: u64,
    failures: u64,
}

impl Session {
    /// Create a session talking to the configured Unix socket.
    pub fn new(settings: Settings) -> Self {
        let link = Arc::new(NotifierLink::from_config(&settings.link));
        Self::with_link(settings, link)
    }

    /// Create a session with a custom link.
    pub fn with_link(settings: Settings, link: Arc<dyn Link>) -> Self {
        let state = SessionState::new(settings.link.mode);
        let status = Arc::new(RwLock::new(SessionStatus {
            mode: state.mode(),
            link: state.link(),
            watch: state.watch(),
            installs: 0,
            deliveries: 0,
            failures: 0,
        }));

        Self {
            settings,
            link,
            status,
            state,
            watch: None,
            generation: 0,
            installs: 0,
            deliveries: 0,
            failures: 0,
        }
    }

    pub fn status(&self) -> SharedStatus {
        Arc::clone(&self.status)
    }

    /// Run until `shutdown` is cancelled.
    ///
    /// Fails only for configuration problems, or when the reactive-mode watch
    /// cannot be installed at startup.
    pub async fn run(mut self, shutdown: CancellationToken) -> Result<()> {
        self.settings.validate()?;

        let mode = self.state.mode();
        crate::log_event!(
            "session",
            "watching",
            "*.{} files in {}",
            self.settings.watch.extension,
            self.settings.watch.root.display()
        );
        crate::log_event!("session", "endpoint", "{}", self.link.endpoint());

        let (reports_tx, mut reports_rx) = mpsc::unbounded_channel();

        match mode {
            LinkMode::Reactive => {
                self.install(&reports_tx)?;
                crate::log_event!(
                    "session",
                    "reactive",
                    "connection status will be shown when files change"
                );
            }
            LinkMode::Polling => {
                crate::log_event!(
                    "session",
                    "polling",
                    "waiting for companion, probing every {:?}",
                    self.settings.link.poll_interval()
                );
            }
        }
        self.publish();

        let mut ticker = (mode == LinkMode::Polling).then(|| {
            let mut ticker = interval(self.settings.link.poll_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker
        });

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,

                _ = next_tick(&mut ticker) => {
                    self.poll(&reports_tx).await;
                }

                Some(report) = reports_rx.recv() => {
                    self.on_report(report).await;
                }
            }
            self.publish();
        }

        crate::log_event!("session", "stopping hot reload watcher");
        self.teardown().await;
        self.publish();
        Ok(())
    }

    /// One polling-mode probe and the transition it causes.
    async fn poll(&mut self, reports: &mpsc::UnboundedSender<DeliveryReport>) {
        let reachable = match self.link.probe().await {
            Ok(()) => true,
            Err(e) => {
                crate::debug_event!("link", "probe", "{e}");
                false
            }
        };

        let previous = self.state.link();
        let transition = self.state.on_probe(reachable);
        let reconnected = reachable && previous == LinkState::Disconnected;

        if reconnected {
            crate::log_event!("link", "companion reachable", "{}", self.link.endpoint());
        } else if !reachable && previous == LinkState::Connected {
            tracing::warn!("[link] connection lost: {}", self.link.endpoint());
        }

        match transition {
            Transition::Install => {
                if reconnected && self.settings.link.reload_on_connect {
                    // Result is already logged; reachability is re-checked on the next tick
                    let _ = deliver_logged(self.link.as_ref(), &Message::Reload).await;
                }
                if let Err(e) = self.install(reports) {
                    tracing::warn!("[watch] {e}; retrying on next probe");
                }
            }
            Transition::Teardown => {
                crate::log_event!("session", "pausing watch", "waiting for companion");
                self.teardown().await;
            }
            Transition::Stay => {}
        }
    }

    async fn on_report(&mut self, report: DeliveryReport) {
        if report.delivered() {
            self.deliveries += 1;
        } else {
            self.failures += 1;
        }

        // Reports from a watch that was already torn down carry no news
        if report.generation != self.generation || self.watch.is_none() {
            crate::debug_event!("session", "stale report", "generation {}", report.generation);
            return;
        }

        if self.state.on_delivery(report.delivered()) == Transition::Teardown {
            crate::log_event!("session", "pausing watch", "companion did not answer");
            self.teardown().await;
        }
    }

    fn install(
        &mut self,
        reports: &mpsc::UnboundedSender<DeliveryReport>,
    ) -> std::result::Result<(), WatchError> {
        self.generation += 1;
        let supervisor = WatchSupervisor::new(
            FileFilter::new(&self.settings.watch.extension),
            self.settings.watch.debounce(),
            Arc::clone(&self.link),
        )
        .with_reports(reports.clone(), self.generation);

        let handle = WatchHandle::install(&self.settings.watch.root, supervisor)?;
        self.watch = Some(handle);
        self.state.mark_installed();
        self.installs += 1;
        Ok(())
    }

    async fn teardown(&mut self) {
        if let Some(handle) = self.watch.take() {
            handle.teardown().await;
        }
        self.state.mark_torn_down();
    }

    fn publish(&self) {
        *self.status.write() = SessionStatus {
            mode: self.state.mode(),
            link: self.state.link(),
            watch: self.state.watch(),
            installs: self.installs,
            deliveries: self.deliveries,
            failures: self.failures,
        };
    }
}

/// Resolves on the next poll tick; never resolves in reactive mode.
async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Send a single message outside of any watch, e.g. a manual `reload`.
pub async fn send_once(config: &LinkConfig, message: &Message) -> Result<Acknowledgement> {
    config.validate()?;
    let link = NotifierLink::from_config(config);
    Ok(deliver_logged(&link, message).await?)
}
