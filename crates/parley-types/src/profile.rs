//! Difficulty profiles controlling per-topic intel generation.

use serde::{Deserialize, Serialize};

use crate::enums::Difficulty;

/// How much intel one topic generates, by kind.
///
/// A profile with all counts zero produces an empty topic -- degenerate
/// but legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// Number of unfavorable intel (score 100, one knower each).
    pub bad_intel_count: u32,
    /// Number of 300-score favorable intel (two knowers each).
    pub good_300_count: u32,
    /// Number of 100-score favorable intel (one knower each).
    pub good_100_count: u32,
}

impl DifficultyProfile {
    /// Total intel generated per topic under this profile.
    pub const fn total(&self) -> u32 {
        self.bad_intel_count
            .saturating_add(self.good_300_count)
            .saturating_add(self.good_100_count)
    }
}

/// Per-topic intel counts on easy difficulty.
pub const EASY_PROFILE: DifficultyProfile = DifficultyProfile {
    bad_intel_count: 1,
    good_300_count: 2,
    good_100_count: 1,
};

/// Per-topic intel counts on hard difficulty.
pub const HARD_PROFILE: DifficultyProfile = DifficultyProfile {
    bad_intel_count: 3,
    good_300_count: 2,
    good_100_count: 1,
};

impl Difficulty {
    /// Return the intel-generation profile for this difficulty.
    pub const fn profile(self) -> DifficultyProfile {
        match self {
            Self::Easy => EASY_PROFILE,
            Self::Hard => HARD_PROFILE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easy_profile_counts() {
        let p = Difficulty::Easy.profile();
        assert_eq!(p.bad_intel_count, 1);
        assert_eq!(p.good_300_count, 2);
        assert_eq!(p.good_100_count, 1);
        assert_eq!(p.total(), 4);
    }

    #[test]
    fn hard_profile_counts() {
        let p = Difficulty::Hard.profile();
        assert_eq!(p.bad_intel_count, 3);
        assert_eq!(p.good_300_count, 2);
        assert_eq!(p.good_100_count, 1);
        assert_eq!(p.total(), 6);
    }
}
