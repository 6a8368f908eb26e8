//! Serialized event dispatch for one recording session.
//!
//! Every notification the media engine delivers (fragment request, end of
//! stream, error) funnels through this component, whatever engine thread it
//! arrives on. A single mutex around the lifecycle machine linearizes all
//! state mutation, so a fragment request observed after a terminal event is
//! always answered with "no file", never a stale name. State transitions are
//! published on a watch channel, which is what `await_completion` and the
//! engine adapter block on.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::lifecycle::{Lifecycle, SessionState, ShutdownReason};
use crate::namer::FragmentNamer;
use crate::policy::FragmentIndex;

#[derive(Debug)]
struct Shared {
    lifecycle: Mutex<Lifecycle>,
    namer: FragmentNamer,
    state_tx: watch::Sender<SessionState>,
}

/// Handle to the session controller. Cheap to clone; every clone observes and
/// mutates the same session.
///
/// All inbound callbacks are synchronous and bounded-time (a lock acquisition
/// plus a path computation), so the engine may invoke them from its own
/// worker threads while it is blocked on the answer.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    shared: Arc<Shared>,
}

impl EventDispatcher {
    pub fn new(namer: FragmentNamer) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Idle);
        Self {
            shared: Arc::new(Shared {
                lifecycle: Mutex::new(Lifecycle::new()),
                namer,
                state_tx,
            }),
        }
    }

    /// Current state, read under the same lock the mutations take.
    pub fn state(&self) -> SessionState {
        self.shared.lifecycle.lock().state()
    }

    /// Number of fragment requests answered with a name so far.
    pub fn fragments_named(&self) -> u64 {
        self.shared.lifecycle.lock().fragments_named()
    }

    /// Subscribe to state transitions. The engine adapter watches this to
    /// learn when `Stopping` is entered and its teardown should begin.
    pub fn state_changes(&self) -> watch::Receiver<SessionState> {
        self.shared.state_tx.subscribe()
    }

    /// Move the session from `Idle` to `Running`.
    pub fn start(&self) {
        let mut lifecycle = self.shared.lifecycle.lock();
        lifecycle.start();
        self.publish(&lifecycle);
    }

    /// Inbound fragment-request callback.
    ///
    /// Returns the path the engine should open for this fragment, or `None`
    /// once the session is shutting down. `None` instructs the engine to stop
    /// segmenting; it is not an error. Repeated indices yield the identical
    /// path, so engine-side retries are harmless.
    pub fn on_fragment_request(&self, index: FragmentIndex) -> Option<PathBuf> {
        let mut lifecycle = self.shared.lifecycle.lock();
        if !lifecycle.accepts_fragments() {
            debug!(index, state = ?lifecycle.state(), "late fragment request, answering with no file");
            return None;
        }
        lifecycle.record_fragment();
        let path = self.shared.namer.name_for(index);
        debug!(index, path = %path.display(), "fragment requested");
        Some(path)
    }

    /// Inbound end-of-stream notification.
    pub fn on_end_of_stream(&self) {
        info!("end of stream");
        self.begin_stop(ShutdownReason::EndOfStream);
    }

    /// Inbound error notification. The first terminal event wins; errors
    /// reported after `Stopping` is entered are discarded.
    pub fn on_error(&self, message: impl Into<String>) {
        let message = message.into();
        warn!(%message, "stream error reported by engine");
        self.begin_stop(ShutdownReason::Error(message));
    }

    /// Engine confirmation that its teardown finished: `Stopping` -> `Stopped`.
    pub fn on_stop_confirmed(&self) {
        let mut lifecycle = self.shared.lifecycle.lock();
        if lifecycle.confirm_stop() {
            self.publish(&lifecycle);
        }
    }

    /// Escape hatch for forced teardown (e.g. an interrupt signal): jump to
    /// `Stopped` without waiting for engine confirmation.
    pub fn force_stop(&self) {
        let mut lifecycle = self.shared.lifecycle.lock();
        if lifecycle.force_stop() {
            info!("session force-stopped");
            self.publish(&lifecycle);
        }
    }

    /// Wait until the session reaches `Stopped` and return the shutdown
    /// reason recorded at the first terminal event. `None` means the session
    /// was force-stopped before any terminal event arrived.
    pub async fn await_completion(&self) -> Option<ShutdownReason> {
        let mut state_rx = self.shared.state_tx.subscribe();
        // The sender lives in `self.shared`, so this cannot fail while we
        // hold `&self`; if it somehow does, the state can no longer change
        // and the lock below still yields the final answer.
        let _ = state_rx.wait_for(SessionState::is_terminal).await;
        self.shared.lifecycle.lock().reason().cloned()
    }

    fn begin_stop(&self, reason: ShutdownReason) {
        let mut lifecycle = self.shared.lifecycle.lock();
        if lifecycle.begin_stop(reason) {
            self.publish(&lifecycle);
        }
    }

    // Called with the lifecycle lock held so published states appear in
    // mutation order.
    fn publish(&self, lifecycle: &Lifecycle) {
        self.shared.state_tx.send_replace(lifecycle.state());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::DurationPolicy;
    use std::path::Path;

    fn dispatcher() -> EventDispatcher {
        let policy = DurationPolicy::new(10, 1000).unwrap();
        EventDispatcher::new(FragmentNamer::new(Path::new("/tmp/rec"), policy))
    }

    #[test]
    fn answers_requests_only_while_running() {
        let dispatcher = dispatcher();
        assert_eq!(dispatcher.on_fragment_request(0), None);

        dispatcher.start();
        assert_eq!(
            dispatcher.on_fragment_request(0),
            Some(PathBuf::from("/tmp/rec/media/live_0.mp4"))
        );

        dispatcher.on_end_of_stream();
        assert_eq!(dispatcher.on_fragment_request(1), None);
        assert_eq!(dispatcher.fragments_named(), 1);
    }

    #[test]
    fn duplicate_index_yields_identical_path() {
        let dispatcher = dispatcher();
        dispatcher.start();
        let first = dispatcher.on_fragment_request(3);
        let second = dispatcher.on_fragment_request(3);
        assert_eq!(first, second);
    }

    #[test]
    fn late_error_does_not_overwrite_reason() {
        let dispatcher = dispatcher();
        dispatcher.start();
        dispatcher.on_end_of_stream();
        dispatcher.on_error("too late");
        dispatcher.on_stop_confirmed();
        assert_eq!(dispatcher.state(), SessionState::Stopped);
        assert_eq!(
            dispatcher.shared.lifecycle.lock().reason(),
            Some(&ShutdownReason::EndOfStream)
        );
    }

    #[tokio::test]
    async fn await_completion_returns_recorded_reason() {
        let dispatcher = dispatcher();
        dispatcher.start();
        dispatcher.on_error("decoder fault");
        dispatcher.on_stop_confirmed();
        assert_eq!(
            dispatcher.await_completion().await,
            Some(ShutdownReason::Error("decoder fault".into()))
        );
    }

    #[tokio::test]
    async fn await_completion_sees_forced_stop() {
        let dispatcher = dispatcher();
        dispatcher.start();
        let waiter = dispatcher.clone();
        let handle = tokio::spawn(async move { waiter.await_completion().await });
        dispatcher.force_stop();
        assert_eq!(handle.await.unwrap(), None);
    }
}
