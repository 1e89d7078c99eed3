//! Watch supervisor for QML sources.
//!
//! Raw `notify` events are normalized into [`ChangeEvent`]s, run through the
//! filter chain and the per-path debounce ledger, and coalesced so that at
//! most one delivery to the companion is in flight.
//!
//! # Architecture
//!
//! ```text
//! notify backend thread
//!   - ChangeEvent::from_notify
//!         |  (bounded mpsc, arrival order)
//!         v
//! WatchSupervisor task
//!   - FileFilter -> DebounceLedger -> DeliveryGate
//!         |
//!         v
//! delivery task (one at a time) -> Link -> DeliveryReport
//! ```

mod debouncer;
mod error;
mod event;
mod filter;
mod gate;
mod handle;
mod supervisor;

pub use debouncer::DebounceLedger;
pub use error::WatchError;
pub use event::{ChangeEvent, ChangeKind};
pub use filter::{FileFilter, Rejection, TRANSIENT_SUFFIXES, is_transient};
pub use gate::DeliveryGate;
pub use handle::WatchHandle;
pub use supervisor::{DeliveryReport, WatchSupervisor};
