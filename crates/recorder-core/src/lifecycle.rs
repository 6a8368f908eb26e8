//! Session lifecycle state machine.
//!
//! The machine replaces ad-hoc flag checking with enumerated transitions:
//! fragment requests racing a terminal event are answered by state alone, and
//! anything arriving after `Stopped` is structurally a no-op. The machine is
//! single-threaded on purpose; the dispatcher serializes access to it.

use tracing::debug;

/// Controller state for one recording session. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Stopped)
    }
}

/// Why the session left `Running`. Recorded at the first terminal event;
/// later terminal events never overwrite it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// The stream ended normally.
    EndOfStream,
    /// The engine reported a fatal stream error.
    Error(String),
}

/// Transition machine for `SessionState` plus the shutdown reason and the
/// count of fragments named during the session.
#[derive(Debug)]
pub struct Lifecycle {
    state: SessionState,
    reason: Option<ShutdownReason>,
    fragments_named: u64,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            reason: None,
            fragments_named: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn reason(&self) -> Option<&ShutdownReason> {
        self.reason.as_ref()
    }

    pub fn fragments_named(&self) -> u64 {
        self.fragments_named
    }

    /// Idle -> Running. A no-op in any other state.
    pub fn start(&mut self) {
        if self.state == SessionState::Idle {
            self.state = SessionState::Running;
        }
    }

    /// Whether a fragment request received now may be answered with a name.
    ///
    /// True only in `Running`; the caller bumps the fragment count via
    /// `record_fragment` once it has produced the name.
    pub fn accepts_fragments(&self) -> bool {
        self.state == SessionState::Running
    }

    pub fn record_fragment(&mut self) {
        self.fragments_named += 1;
    }

    /// Enter `Stopping` with the given reason. The first terminal event wins;
    /// anything after that is discarded. Honored from `Idle` as well, since a
    /// stream can fail before its first fragment.
    ///
    /// Returns true if the event caused the transition.
    pub fn begin_stop(&mut self, reason: ShutdownReason) -> bool {
        match self.state {
            SessionState::Idle | SessionState::Running => {
                self.state = SessionState::Stopping;
                self.reason = Some(reason);
                true
            }
            SessionState::Stopping | SessionState::Stopped => {
                debug!(?reason, state = ?self.state, "discarding duplicate terminal event");
                false
            }
        }
    }

    /// Stopping -> Stopped, once the engine confirms its teardown finished.
    pub fn confirm_stop(&mut self) -> bool {
        if self.state == SessionState::Stopping {
            self.state = SessionState::Stopped;
            true
        } else {
            false
        }
    }

    /// Escape hatch: jump to `Stopped` from any non-terminal state without
    /// waiting for the engine. The recorded reason, if any, is kept.
    pub fn force_stop(&mut self) -> bool {
        if self.state == SessionState::Stopped {
            false
        } else {
            self.state = SessionState::Stopped;
            true
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_normal_path() {
        let mut lc = Lifecycle::new();
        assert_eq!(lc.state(), SessionState::Idle);
        assert!(!lc.accepts_fragments());

        lc.start();
        assert_eq!(lc.state(), SessionState::Running);
        assert!(lc.accepts_fragments());

        assert!(lc.begin_stop(ShutdownReason::EndOfStream));
        assert_eq!(lc.state(), SessionState::Stopping);
        assert!(!lc.accepts_fragments());

        assert!(lc.confirm_stop());
        assert_eq!(lc.state(), SessionState::Stopped);
        assert_eq!(lc.reason(), Some(&ShutdownReason::EndOfStream));
    }

    #[test]
    fn first_terminal_event_wins() {
        let mut lc = Lifecycle::new();
        lc.start();
        assert!(lc.begin_stop(ShutdownReason::Error("decoder fault".into())));
        assert!(!lc.begin_stop(ShutdownReason::EndOfStream));
        assert_eq!(
            lc.reason(),
            Some(&ShutdownReason::Error("decoder fault".into()))
        );
    }

    #[test]
    fn error_before_running_still_stops() {
        let mut lc = Lifecycle::new();
        assert!(lc.begin_stop(ShutdownReason::Error("decoder fault".into())));
        assert_eq!(lc.state(), SessionState::Stopping);
        // start() after a terminal event must not resurrect the session
        lc.start();
        assert_eq!(lc.state(), SessionState::Stopping);
    }

    #[test]
    fn stopped_is_terminal() {
        let mut lc = Lifecycle::new();
        lc.start();
        lc.begin_stop(ShutdownReason::EndOfStream);
        lc.confirm_stop();

        lc.start();
        assert!(!lc.begin_stop(ShutdownReason::Error("late".into())));
        assert!(!lc.confirm_stop());
        assert!(!lc.force_stop());
        assert_eq!(lc.state(), SessionState::Stopped);
        assert_eq!(lc.reason(), Some(&ShutdownReason::EndOfStream));
    }

    #[test]
    fn force_stop_skips_confirmation() {
        let mut lc = Lifecycle::new();
        lc.start();
        assert!(lc.force_stop());
        assert_eq!(lc.state(), SessionState::Stopped);
        assert_eq!(lc.reason(), None);
    }
}
