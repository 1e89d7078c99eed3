//! Crate-level error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::link::LinkError;
use crate::watcher::WatchError;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, HotReloadError>;

/// Errors that end a session. Delivery failures inside a running watch are
/// logged where they happen and never reach this type.
#[derive(Error, Debug)]
pub enum HotReloadError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Watch(#[from] WatchError),

    #[error(transparent)]
    Link(#[from] LinkError),
}
