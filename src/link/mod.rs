//! Notifier link to the companion application.
//!
//! A delivery attempt is one connect-send-receive-close cycle against a
//! Unix domain socket. The link also tracks reachability for polling mode.

mod error;
mod message;
mod notifier;
mod state;

pub use error::{LinkError, Stage};
pub use message::{Acknowledgement, Message};
pub use notifier::{Link, NotifierLink, deliver_logged};
pub use state::{LinkState, SessionState, Transition, WatchState};
