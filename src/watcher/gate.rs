//! At-most-one-in-flight delivery gate with latest-wins coalescing.

use std::path::PathBuf;

/// Tracks the pending notification and whether a delivery is running.
///
/// Accepted changes that arrive while a delivery is in flight overwrite the
/// pending path; when the delivery completes exactly one follow-up is issued
/// with whatever is pending at that moment.
#[derive(Debug, Default)]
pub struct DeliveryGate {
    pending: Option<PathBuf>,
    in_flight: bool,
    newer: bool,
}

impl DeliveryGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted change.
    ///
    /// Returns the path to deliver now, or `None` if it was coalesced into
    /// the running delivery's follow-up.
    pub fn offer(&mut self, path: PathBuf) -> Option<PathBuf> {
        self.pending = Some(path);
        if self.in_flight {
            self.newer = true;
            return None;
        }
        self.in_flight = true;
        self.pending.clone()
    }

    /// The running delivery finished (successfully or not).
    ///
    /// Returns the follow-up to deliver immediately, if a newer change exists.
    pub fn complete(&mut self) -> Option<PathBuf> {
        if self.newer {
            self.newer = false;
            return self.pending.clone();
        }
        self.in_flight = false;
        None
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Most recent accepted path.
    pub fn pending(&self) -> Option<&PathBuf> {
        self.pending.as_ref()
    }
}
