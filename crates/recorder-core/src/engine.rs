//! Boundary contract with the media engine.
//!
//! The engine owns capture, encoding, muxing, fragment-boundary detection and
//! every file write; the controller only supplies names and duration policy
//! and receives notifications back. Implementations deliver those
//! notifications through the [`EventDispatcher`] handle they are given at
//! start, from whatever threads they run internally.

use crate::dispatcher::EventDispatcher;
use crate::session::EngineSettings;

/// A media-processing engine driven by the segmentation controller.
///
/// Contract for implementations:
/// - call `dispatcher.on_fragment_request(index)` whenever a new fragment is
///   about to be opened, with a non-decreasing index, and treat a `None`
///   answer as "stop segmenting", not as an error;
/// - deliver `on_end_of_stream` at most once, `on_error` on the first fatal
///   failure;
/// - watch `dispatcher.state_changes()` for `Stopping`, tear down, and
///   confirm with `dispatcher.on_stop_confirmed()`.
pub trait MediaEngine {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Bring the engine up with the session's segmentation settings. Called
    /// once, before the controller enters `Running`; a failure here is a
    /// setup error and aborts the session.
    fn start(
        &mut self,
        settings: &EngineSettings,
        dispatcher: EventDispatcher,
    ) -> Result<(), Self::Error>;
}
