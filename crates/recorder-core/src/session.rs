//! Recording session setup.
//!
//! Everything that can fail does so here, before the session enters
//! `Running`: policy validation, base-directory resolution and creation of
//! the `media` subdirectory. The namer downstream relies on that, which is
//! why it has no error path of its own. The base directory is canonicalized
//! exactly once, so a working-directory change mid-session cannot move where
//! fragments land.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::dispatcher::EventDispatcher;
use crate::namer::FragmentNamer;
use crate::policy::{DurationPolicy, PolicyError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid duration policy: {0}")]
    Policy(#[from] PolicyError),

    #[error("base directory {path} could not be resolved: {source}")]
    BaseDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("base directory {path} is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("media directory {path} could not be created: {source}")]
    MediaDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// User-facing session parameters, prior to validation.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Directory the `media` subdirectory is created under. Relative paths
    /// are resolved against the working directory at session start.
    pub base_dir: PathBuf,
    pub fragment_duration_secs: u32,
    pub timescale: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let policy = DurationPolicy::default();
        Self {
            base_dir: PathBuf::from("."),
            fragment_duration_secs: policy.fragment_duration_secs(),
            timescale: policy.timescale(),
        }
    }
}

/// One-shot segmentation configuration handed to the media engine when it
/// starts. The controller never re-sends these; the engine's own timer works
/// from this and reports back only fragment indices.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub fragment_duration_secs: u32,
    pub timescale: u32,
    pub base_dir: PathBuf,
}

/// A validated recording session: resolved directories, a namer and the
/// dispatcher that owns all mutable session state.
#[derive(Debug)]
pub struct RecordingSession {
    dispatcher: EventDispatcher,
    settings: EngineSettings,
}

impl RecordingSession {
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let policy = DurationPolicy::new(config.fragment_duration_secs, config.timescale)?;
        let base_dir = resolve_base_dir(&config.base_dir)?;

        let namer = FragmentNamer::new(&base_dir, policy);
        fs::create_dir_all(namer.media_dir()).map_err(|source| SessionError::MediaDir {
            path: namer.media_dir().to_path_buf(),
            source,
        })?;
        info!(path = %namer.media_dir().display(), "media directory ensured");

        let settings = EngineSettings {
            fragment_duration_secs: policy.fragment_duration_secs(),
            timescale: policy.timescale(),
            base_dir,
        };

        Ok(Self {
            dispatcher: EventDispatcher::new(namer),
            settings,
        })
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    pub fn engine_settings(&self) -> &EngineSettings {
        &self.settings
    }
}

fn resolve_base_dir(path: &Path) -> Result<PathBuf, SessionError> {
    let resolved = path.canonicalize().map_err(|source| SessionError::BaseDir {
        path: path.to_path_buf(),
        source,
    })?;
    if !resolved.is_dir() {
        return Err(SessionError::NotADirectory { path: resolved });
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_creates_media_dir() {
        let dir = tempfile::tempdir().unwrap();
        let session = RecordingSession::new(SessionConfig {
            base_dir: dir.path().to_path_buf(),
            ..SessionConfig::default()
        })
        .unwrap();

        let media = session.engine_settings().base_dir.join("media");
        assert!(media.is_dir());
    }

    #[test]
    fn missing_base_dir_is_a_setup_error() {
        let err = RecordingSession::new(SessionConfig {
            base_dir: PathBuf::from("/nonexistent/liverec-base"),
            ..SessionConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, SessionError::BaseDir { .. }));
    }

    #[test]
    fn zero_duration_is_a_setup_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RecordingSession::new(SessionConfig {
            base_dir: dir.path().to_path_buf(),
            fragment_duration_secs: 0,
            timescale: 1000,
        })
        .unwrap_err();
        assert!(matches!(err, SessionError::Policy(PolicyError::ZeroDuration)));
    }

    #[test]
    fn base_dir_is_resolved_once() {
        let dir = tempfile::tempdir().unwrap();
        let session = RecordingSession::new(SessionConfig {
            base_dir: dir.path().to_path_buf(),
            ..SessionConfig::default()
        })
        .unwrap();
        assert!(session.engine_settings().base_dir.is_absolute());
    }
}
