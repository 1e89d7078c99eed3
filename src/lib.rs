pub mod cli;
pub mod config;
pub mod error;
pub mod link;
pub mod logging;
pub mod session;
pub mod watcher;

pub use config::{LinkMode, Settings};
pub use error::{HotReloadError, Result};
pub use link::{Acknowledgement, Link, LinkError, Message, NotifierLink};
pub use session::{Session, SessionStatus, SharedStatus, send_once};
pub use watcher::{ChangeEvent, WatchError, WatchHandle, WatchSupervisor};
