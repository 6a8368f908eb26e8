//! Test-source media engine.
//!
//! Stands in for a real capture/encode/mux pipeline: a timer task requests a
//! new fragment from the controller at every fragment boundary, raises
//! end-of-stream after an optional fragment count, and confirms the stop once
//! it observes the controller shutting down. No media is produced; the
//! fragment index is echoed to standard output exactly as a recording
//! pipeline would report its segments.

use recorder_core::{EngineSettings, EventDispatcher, FragmentIndex, MediaEngine, SessionState};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine already started")]
    AlreadyStarted,
}

pub struct TestSourceEngine {
    fragment_limit: Option<u32>,
    task: Option<JoinHandle<()>>,
}

impl TestSourceEngine {
    pub fn new(fragment_limit: Option<u32>) -> Self {
        Self {
            fragment_limit,
            task: None,
        }
    }

    /// Wait for the engine task to finish its teardown.
    pub async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl MediaEngine for TestSourceEngine {
    type Error = EngineError;

    fn start(
        &mut self,
        settings: &EngineSettings,
        dispatcher: EventDispatcher,
    ) -> Result<(), Self::Error> {
        if self.task.is_some() {
            return Err(EngineError::AlreadyStarted);
        }
        let period = Duration::from_secs(settings.fragment_duration_secs as u64);
        info!(
            period_secs = settings.fragment_duration_secs,
            base_dir = %settings.base_dir.display(),
            "starting test source"
        );
        self.task = Some(tokio::spawn(run_source(
            period,
            self.fragment_limit,
            dispatcher,
        )));
        Ok(())
    }
}

async fn run_source(period: Duration, limit: Option<u32>, dispatcher: EventDispatcher) {
    let mut state_rx = dispatcher.state_changes();
    let mut boundary = tokio::time::interval(period);
    boundary.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut index: FragmentIndex = 0;
    loop {
        tokio::select! {
            _ = boundary.tick() => {
                if limit.is_some_and(|limit| index >= limit) {
                    dispatcher.on_end_of_stream();
                    break;
                }
                match dispatcher.on_fragment_request(index) {
                    Some(path) => {
                        info!(index, path = %path.display(), "fragment opened");
                        println!("{index}");
                        index += 1;
                    }
                    // "no file" means stop segmenting, not an error
                    None => break,
                }
            }
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *state_rx.borrow_and_update();
                if matches!(state, SessionState::Stopping | SessionState::Stopped) {
                    debug!(?state, "test source halting");
                    break;
                }
            }
        }
    }

    dispatcher.on_stop_confirmed();
}
