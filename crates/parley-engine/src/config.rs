//! Configurable parameters for a run.
//!
//! Defaults match the original game constants: three topics, ten action
//! points, three of four candidates participating, and a 30--70% starting
//! reveal.

use serde::{Deserialize, Serialize};

/// Tunable run parameters, owned by the [`Game`](crate::engine::Game).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of negotiation topics per run.
    pub topic_count: u8,
    /// Action points granted at run start; also the refund ceiling.
    pub max_action_points: u32,
    /// How many candidates from the pool participate in a run.
    pub participant_count: usize,
    /// Lower bound (inclusive, percent) of the starting intel reveal.
    pub reveal_min_pct: u32,
    /// Upper bound (inclusive, percent) of the starting intel reveal.
    pub reveal_max_pct: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            topic_count: 3,
            max_action_points: 10,
            participant_count: 3,
            reveal_min_pct: 30,
            reveal_max_pct: 70,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_original_constants() {
        let config = GameConfig::default();
        assert_eq!(config.topic_count, 3);
        assert_eq!(config.max_action_points, 10);
        assert_eq!(config.participant_count, 3);
        assert_eq!(config.reveal_min_pct, 30);
        assert_eq!(config.reveal_max_pct, 70);
    }
}
