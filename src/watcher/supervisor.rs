//! Watch supervisor: filters, debounces and coalesces changes into deliveries.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::debouncer::DebounceLedger;
use super::event::ChangeEvent;
use super::filter::{FileFilter, Rejection};
use super::gate::DeliveryGate;
use crate::link::{Acknowledgement, Link, LinkError, Message, deliver_logged};

/// Outcome of one delivery attempt, reported to the session controller.
#[derive(Debug)]
pub struct DeliveryReport {
    /// Which watch installation made the attempt.
    pub generation: u64,
    pub message: Message,
    pub outcome: Result<Acknowledgement, LinkError>,
}

impl DeliveryReport {
    pub fn delivered(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Owns the debounce ledger and the pending notification for one watch.
pub struct WatchSupervisor {
    filter: FileFilter,
    ledger: DebounceLedger,
    gate: DeliveryGate,
    link: Arc<dyn Link>,
    reports: Option<mpsc::UnboundedSender<DeliveryReport>>,
    generation: u64,
}

impl WatchSupervisor {
    pub fn new(filter: FileFilter, debounce: Duration, link: Arc<dyn Link>) -> Self {
        Self {
            filter,
            ledger: DebounceLedger::new(debounce),
            gate: DeliveryGate::new(),
            link,
            reports: None,
            generation: 0,
        }
    }

    /// Report every delivery outcome, tagged with `generation`.
    pub fn with_reports(
        mut self,
        reports: mpsc::UnboundedSender<DeliveryReport>,
        generation: u64,
    ) -> Self {
        self.reports = Some(reports);
        self.generation = generation;
        self
    }

    /// Run the filter chain and the debounce check.
    ///
    /// Returns the accepted path; rejected events leave no trace above `trace`.
    pub fn accept(&mut self, event: &ChangeEvent) -> Option<PathBuf> {
        let path = match self.filter.check(event) {
            Ok(path) => path,
            Err(reason) => {
                tracing::trace!("[watch] skipped {:?}: {reason:?}", event.path);
                return None;
            }
        };

        if !self.ledger.accept(path, event.observed_at) {
            tracing::trace!("[watch] skipped {}: {:?}", path.display(), Rejection::Debounced);
            return None;
        }

        crate::log_event!("watch", event.kind.label(), "{}", path.display());
        Some(path.to_path_buf())
    }

    /// Process events in arrival order until the channel closes or `shutdown` fires.
    pub async fn run(mut self, mut events: mpsc::Receiver<ChangeEvent>, shutdown: CancellationToken) {
        let (done_tx, mut done_rx) = mpsc::channel::<()>(1);
        let mut in_flight: Option<JoinHandle<()>> = None;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,

                event = events.recv() => {
                    let Some(event) = event else { break };
                    let Some(path) = self.accept(&event) else { continue };

                    match self.gate.offer(path) {
                        Some(path) => {
                            in_flight = Some(self.spawn_delivery(path, done_tx.clone()));
                        }
                        None => {
                            crate::debug_event!("watch", "coalesced", "delivery already in flight");
                        }
                    }
                }

                Some(()) = done_rx.recv() => {
                    in_flight = self
                        .gate
                        .complete()
                        .map(|path| self.spawn_delivery(path, done_tx.clone()));
                }
            }
        }

        if let Some(task) = in_flight {
            task.abort();
        }
        crate::debug_event!("watch", "supervisor stopped", "{} paths seen", self.ledger.len());
    }

    fn spawn_delivery(&self, path: PathBuf, done: mpsc::Sender<()>) -> JoinHandle<()> {
        let link = Arc::clone(&self.link);
        let reports = self.reports.clone();
        let generation = self.generation;

        tokio::spawn(async move {
            let message = Message::File(path);
            let outcome = deliver_logged(link.as_ref(), &message).await;

            if let Some(reports) = reports {
                // Session gone means the process is shutting down
                let _ = reports.send(DeliveryReport {
                    generation,
                    message,
                    outcome,
                });
            }
            // Supervisor gone means the watch is being torn down
            let _ = done.send(()).await;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;
    use std::time::Instant;

    struct SilentLink;

    #[async_trait]
    impl Link for SilentLink {
        fn endpoint(&self) -> String {
            "silent".to_string()
        }

        async fn deliver(&self, _message: &Message) -> Result<Acknowledgement, LinkError> {
            Ok(Acknowledgement::default())
        }

        async fn probe(&self) -> Result<(), LinkError> {
            Ok(())
        }
    }

    fn supervisor(debounce_ms: u64) -> WatchSupervisor {
        WatchSupervisor::new(
            FileFilter::new("qml"),
            Duration::from_millis(debounce_ms),
            Arc::new(SilentLink),
        )
    }

    #[test]
    fn test_accept_runs_filter_then_debounce() {
        let mut supervisor = supervisor(300);
        let start = Instant::now();

        let first = ChangeEvent::modified("src/qml/Main.qml").at(start);
        let second =
            ChangeEvent::modified("src/qml/Main.qml").at(start + Duration::from_millis(50));

        assert_eq!(supervisor.accept(&first).as_deref(), Some(Path::new("src/qml/Main.qml")));
        assert_eq!(supervisor.accept(&second), None);
    }

    #[test]
    fn test_rejected_events_do_not_touch_ledger() {
        let mut supervisor = supervisor(300);

        assert_eq!(supervisor.accept(&ChangeEvent::modified("src/qml/.backup.qml~")), None);
        assert_eq!(supervisor.accept(&ChangeEvent::modified("src/qml/app.js")), None);
        assert_eq!(supervisor.accept(&ChangeEvent::moved(None)), None);
        assert!(supervisor.ledger.is_empty());
    }

    #[test]
    fn test_moves_and_modifications_share_the_window() {
        let mut supervisor = supervisor(300);
        let start = Instant::now();

        let saved = ChangeEvent::moved(Some("src/qml/Main.qml".into())).at(start);
        let touched =
            ChangeEvent::modified("src/qml/Main.qml").at(start + Duration::from_millis(10));

        assert!(supervisor.accept(&saved).is_some());
        assert!(supervisor.accept(&touched).is_none());
    }
}
