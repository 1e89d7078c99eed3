//! Error types for the notifier link.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Which part of a delivery attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Connect,
    Send,
    Receive,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Connect => write!(f, "connect"),
            Stage::Send => write!(f, "send"),
            Stage::Receive => write!(f, "receive"),
        }
    }
}

/// Transient failures talking to the companion application.
///
/// These never escape the watch loop; they are logged where they occur.
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("companion not reachable at {}: {source}", endpoint.display())]
    Unreachable {
        endpoint: PathBuf,
        source: std::io::Error,
    },

    #[error("{stage} timed out after {timeout:?} on {}", endpoint.display())]
    Timeout {
        endpoint: PathBuf,
        stage: Stage,
        timeout: Duration,
    },

    #[error("{stage} failed on {}: {source}", endpoint.display())]
    Io {
        endpoint: PathBuf,
        stage: Stage,
        source: std::io::Error,
    },
}

impl LinkError {
    /// Stage at which the attempt failed.
    pub fn stage(&self) -> Stage {
        match self {
            LinkError::Unreachable { .. } => Stage::Connect,
            LinkError::Timeout { stage, .. } | LinkError::Io { stage, .. } => *stage,
        }
    }
}
