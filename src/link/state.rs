//! Explicit connection and watch state.
//!
//! Both the poll timer and delivery reports drive the same state object;
//! the session controller is its only owner.

use crate::config::LinkMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Disconnected,
    Connected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchState {
    #[default]
    Idle,
    Watching,
}

/// What the controller must do after a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Install,
    Teardown,
    Stay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    mode: LinkMode,
    link: LinkState,
    watch: WatchState,
}

impl SessionState {
    pub fn new(mode: LinkMode) -> Self {
        Self {
            mode,
            link: LinkState::Disconnected,
            watch: WatchState::Idle,
        }
    }

    pub fn mode(&self) -> LinkMode {
        self.mode
    }

    pub fn link(&self) -> LinkState {
        self.link
    }

    pub fn watch(&self) -> WatchState {
        self.watch
    }

    /// Result of a reachability probe.
    ///
    /// Probes only steer the watch in polling mode.
    pub fn on_probe(&mut self, reachable: bool) -> Transition {
        self.link = if reachable {
            LinkState::Connected
        } else {
            LinkState::Disconnected
        };

        if self.mode != LinkMode::Polling {
            return Transition::Stay;
        }

        match (reachable, self.watch) {
            (true, WatchState::Idle) => Transition::Install,
            (false, WatchState::Watching) => Transition::Teardown,
            _ => Transition::Stay,
        }
    }

    /// Result of a delivery attempt made by the running watch.
    pub fn on_delivery(&mut self, delivered: bool) -> Transition {
        if delivered {
            self.link = LinkState::Connected;
            return Transition::Stay;
        }

        self.link = LinkState::Disconnected;
        if self.mode == LinkMode::Polling && self.watch == WatchState::Watching {
            Transition::Teardown
        } else {
            Transition::Stay
        }
    }

    pub fn mark_installed(&mut self) {
        self.watch = WatchState::Watching;
    }

    pub fn mark_torn_down(&mut self) {
        self.watch = WatchState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polling_installs_when_reachable() {
        let mut state = SessionState::new(LinkMode::Polling);
        assert_eq!(state.on_probe(false), Transition::Stay);
        assert_eq!(state.link(), LinkState::Disconnected);

        assert_eq!(state.on_probe(true), Transition::Install);
        state.mark_installed();
        assert_eq!(state.watch(), WatchState::Watching);
        assert_eq!(state.link(), LinkState::Connected);

        // Still reachable: nothing to do
        assert_eq!(state.on_probe(true), Transition::Stay);
    }

    #[test]
    fn test_polling_tears_down_on_lost_probe() {
        let mut state = SessionState::new(LinkMode::Polling);
        state.on_probe(true);
        state.mark_installed();

        assert_eq!(state.on_probe(false), Transition::Teardown);
        state.mark_torn_down();
        assert_eq!(state.watch(), WatchState::Idle);

        // Reachable again: reinstall
        assert_eq!(state.on_probe(true), Transition::Install);
    }

    #[test]
    fn test_polling_tears_down_on_failed_delivery() {
        let mut state = SessionState::new(LinkMode::Polling);
        state.on_probe(true);
        state.mark_installed();

        assert_eq!(state.on_delivery(true), Transition::Stay);
        assert_eq!(state.on_delivery(false), Transition::Teardown);
        assert_eq!(state.link(), LinkState::Disconnected);

        // A late failure from the old watch changes nothing once idle
        state.mark_torn_down();
        assert_eq!(state.on_delivery(false), Transition::Stay);
    }

    #[test]
    fn test_reactive_never_tears_down() {
        let mut state = SessionState::new(LinkMode::Reactive);
        state.mark_installed();

        assert_eq!(state.on_delivery(false), Transition::Stay);
        assert_eq!(state.on_probe(false), Transition::Stay);
        assert_eq!(state.watch(), WatchState::Watching);
        assert_eq!(state.link(), LinkState::Disconnected);

        assert_eq!(state.on_delivery(true), Transition::Stay);
        assert_eq!(state.link(), LinkState::Connected);
    }
}
