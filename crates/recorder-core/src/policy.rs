//! Per-session duration policy and fragment index handling.
//!
//! The media engine assigns the fragment index; the controller only observes
//! it. The policy is built once at session start and never mutated.

use thiserror::Error;

/// Index of a fragment within one recording session, assigned by the media
/// engine per fragment request. Non-decreasing over a session; repeats and
/// gaps are allowed, so everything derived from an index must be idempotent.
pub type FragmentIndex = u32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("fragment duration must be positive")]
    ZeroDuration,
    #[error("timescale must be positive")]
    ZeroTimescale,
}

/// Immutable per-session segmentation parameters.
///
/// `timescale` is the number of offset units per second; fragment offsets in
/// file names are expressed in these units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationPolicy {
    fragment_duration_secs: u32,
    timescale: u32,
}

impl DurationPolicy {
    pub fn new(fragment_duration_secs: u32, timescale: u32) -> Result<Self, PolicyError> {
        if fragment_duration_secs == 0 {
            return Err(PolicyError::ZeroDuration);
        }
        if timescale == 0 {
            return Err(PolicyError::ZeroTimescale);
        }
        Ok(Self {
            fragment_duration_secs,
            timescale,
        })
    }

    pub fn fragment_duration_secs(&self) -> u32 {
        self.fragment_duration_secs
    }

    pub fn timescale(&self) -> u32 {
        self.timescale
    }

    /// Nominal start offset of a fragment, in timescale units.
    ///
    /// Strictly increasing in `index` for any valid policy, which is what
    /// keeps fragment names collision-free on disk.
    pub fn offset_for(&self, index: FragmentIndex) -> u64 {
        index as u64 * self.fragment_duration_secs as u64 * self.timescale as u64
    }
}

impl Default for DurationPolicy {
    /// 10-second fragments with a millisecond timescale.
    fn default() -> Self {
        Self {
            fragment_duration_secs: 10,
            timescale: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn rejects_zero_values() {
        assert_eq!(DurationPolicy::new(0, 1000), Err(PolicyError::ZeroDuration));
        assert_eq!(DurationPolicy::new(10, 0), Err(PolicyError::ZeroTimescale));
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 10_000)]
    #[case(2, 20_000)]
    #[case(360, 3_600_000)]
    fn offsets_follow_index(#[case] index: FragmentIndex, #[case] expected: u64) {
        let policy = DurationPolicy::new(10, 1000).unwrap();
        assert_eq!(policy.offset_for(index), expected);
    }

    #[test]
    fn offsets_do_not_overflow_u32_range() {
        let policy = DurationPolicy::new(u32::MAX, u32::MAX).unwrap();
        // u32::MAX^2 fits in u64; a full u32 index range on top would not,
        // but indices in one session never get near that.
        assert_eq!(
            policy.offset_for(1),
            u32::MAX as u64 * u32::MAX as u64
        );
    }

    #[test]
    fn offsets_are_strictly_increasing() {
        let policy = DurationPolicy::default();
        let mut last = policy.offset_for(0);
        for index in 1..100 {
            let offset = policy.offset_for(index);
            assert!(offset > last);
            last = offset;
        }
    }
}
