//! Deterministic fragment naming.
//!
//! The namer is a pure function of the fragment index and the session's
//! duration policy. It never touches the filesystem; the media engine is the
//! sole writer of the files these paths refer to. Directory validity is a
//! session-setup concern (see `session`), so there is no error path here.

use std::path::{Path, PathBuf};

use crate::policy::{DurationPolicy, FragmentIndex};

/// Subdirectory of the base directory that fragment files land in.
pub const MEDIA_SUBDIR: &str = "media";

/// Maps fragment indices to output paths of the form
/// `<base>/media/live_<offset>.mp4`, where the offset is the fragment's
/// nominal start expressed in timescale units.
#[derive(Debug, Clone)]
pub struct FragmentNamer {
    media_dir: PathBuf,
    policy: DurationPolicy,
}

impl FragmentNamer {
    /// `base_dir` must already be resolved (absolute, existing); the session
    /// layer guarantees that before a namer is built.
    pub fn new(base_dir: &Path, policy: DurationPolicy) -> Self {
        Self {
            media_dir: base_dir.join(MEDIA_SUBDIR),
            policy,
        }
    }

    /// Output path for the fragment at `index`.
    ///
    /// Pure and strictly monotonic in `index`: for a fixed policy, a larger
    /// index always yields a larger offset, so names never collide within a
    /// session.
    pub fn name_for(&self, index: FragmentIndex) -> PathBuf {
        self.media_dir
            .join(format!("live_{}.mp4", self.policy.offset_for(index)))
    }

    pub fn policy(&self) -> &DurationPolicy {
        &self.policy
    }

    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }
}
