//! Unix socket delivery to the companion application.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::timeout;

use super::error::{LinkError, Stage};
use super::message::{Acknowledgement, Message};
use crate::config::LinkConfig;

/// Something that can carry notifications to the companion.
///
/// The watch supervisor and the session controller only see this trait,
/// so tests can substitute a scripted companion.
#[async_trait]
pub trait Link: Send + Sync {
    /// Human-readable endpoint for status lines.
    fn endpoint(&self) -> String;

    /// One connect-send-receive-close cycle.
    async fn deliver(&self, message: &Message) -> Result<Acknowledgement, LinkError>;

    /// Connect and close without sending anything.
    async fn probe(&self) -> Result<(), LinkError>;
}

/// Delivers messages over a Unix domain socket.
#[derive(Debug, Clone)]
pub struct NotifierLink {
    endpoint: PathBuf,
    delivery_timeout: Duration,
    probe_timeout: Duration,
    response_limit: usize,
}

impl NotifierLink {
    /// Create a link with default timeouts.
    pub fn new(endpoint: impl Into<PathBuf>) -> Self {
        Self::from_config(&LinkConfig {
            socket_path: endpoint.into(),
            ..LinkConfig::default()
        })
    }

    pub fn from_config(config: &LinkConfig) -> Self {
        Self {
            endpoint: config.socket_path.clone(),
            delivery_timeout: config.delivery_timeout(),
            probe_timeout: config.probe_timeout(),
            response_limit: config.response_limit.max(1),
        }
    }

    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.endpoint
    }

    async fn connect(&self, limit: Duration) -> Result<UnixStream, LinkError> {
        match timeout(limit, UnixStream::connect(&self.endpoint)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(source)) => Err(LinkError::Unreachable {
                endpoint: self.endpoint.clone(),
                source,
            }),
            Err(_) => Err(self.timed_out(Stage::Connect, limit)),
        }
    }

    async fn exchange(
        &self,
        stream: &mut UnixStream,
        message: &Message,
    ) -> Result<Acknowledgement, LinkError> {
        let payload = message.encode();
        match timeout(self.delivery_timeout, stream.write_all(&payload)).await {
            Ok(Ok(())) => {}
            Ok(Err(source)) => return Err(self.io_failed(Stage::Send, source)),
            Err(_) => return Err(self.timed_out(Stage::Send, self.delivery_timeout)),
        }

        let mut buf = vec![0u8; self.response_limit];
        let read = match timeout(self.delivery_timeout, stream.read(&mut buf)).await {
            Ok(Ok(read)) => read,
            Ok(Err(source)) => return Err(self.io_failed(Stage::Receive, source)),
            Err(_) => return Err(self.timed_out(Stage::Receive, self.delivery_timeout)),
        };

        Ok(Acknowledgement::from_bytes(&buf[..read]))
    }

    fn timed_out(&self, stage: Stage, timeout: Duration) -> LinkError {
        LinkError::Timeout {
            endpoint: self.endpoint.clone(),
            stage,
            timeout,
        }
    }

    fn io_failed(&self, stage: Stage, source: std::io::Error) -> LinkError {
        LinkError::Io {
            endpoint: self.endpoint.clone(),
            stage,
            source,
        }
    }
}

#[async_trait]
impl Link for NotifierLink {
    fn endpoint(&self) -> String {
        self.endpoint.display().to_string()
    }

    async fn deliver(&self, message: &Message) -> Result<Acknowledgement, LinkError> {
        let mut stream = self.connect(self.delivery_timeout).await?;
        crate::debug_event!("link", "connected", "{}", self.endpoint.display());

        let result = self.exchange(&mut stream, message).await;

        // Dropping the stream closes it; shutdown first so the peer sees EOF promptly
        if let Err(e) = stream.shutdown().await {
            crate::debug_event!("link", "shutdown", "{e}");
        }
        result
    }

    async fn probe(&self) -> Result<(), LinkError> {
        let stream = self.connect(self.probe_timeout).await?;
        drop(stream);
        Ok(())
    }
}

/// Deliver a message and turn the outcome into status lines.
///
/// Failures are logged here and handed back only as a value, never raised.
pub async fn deliver_logged(
    link: &dyn Link,
    message: &Message,
) -> Result<Acknowledgement, LinkError> {
    crate::debug_event!("link", "sending", "{message}");
    let result = link.deliver(message).await;
    match &result {
        Ok(ack) => crate::log_event!("link", "response", "{ack}"),
        Err(e) => tracing::warn!("[link] failed to send reload signal: {e}"),
    }
    result
}
