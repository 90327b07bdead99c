//! The NPC entity and the fixed candidate pool.
//!
//! Four candidates exist per run; three are drawn to participate. The
//! rest stay idle with no intel. An NPC's base rate drives the
//! knowledge-alignment checks during the event phase; the current rate
//! (which only the engine mutates, as a response to player action
//! outcomes) drives collection and creeps upward after failed attempts.

use std::collections::BTreeSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use parley_types::IntelId;

use crate::dice::roll_die;

/// Hard ceiling on the collection rate.
pub const MAX_COLLECT_RATE: u32 = 100;

/// How much a failed collection raises the rate.
pub const COLLECT_RATE_STEP: u32 = 10;

/// Upper bound (inclusive) of the randomly rolled base rate.
pub const MAX_BASE_RATE: u32 = 90;

/// The fixed candidate pool: `(name, role)`.
const CANDIDATE_POOL: [(&str, &str); 4] = [
    ("Harlan", "team lead"),
    ("Vera", "opposing lead"),
    ("Quinn", "product manager"),
    ("Sable", "designer"),
];

/// One non-player character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Npc {
    /// Unique display name -- the NPC's key everywhere in the engine.
    pub name: String,
    /// Role shown next to the name; display only.
    pub role: String,
    /// Alignment probability (percent) fixed at creation, `0..=90`.
    pub base_rate: u32,
    /// Collection probability (percent); starts at `base_rate`, raised
    /// by the engine after failed collections, capped at 100.
    pub current_rate: u32,
    /// Intel this NPC knows; append-only, mirrors `Intel::knowers`.
    pub known_intels: BTreeSet<IntelId>,
    /// Standing die number for the current topic, spent and re-rolled
    /// whenever the NPC assists a resolution.
    pub current_number: Option<u8>,
}

impl Npc {
    /// Create an NPC with a uniformly rolled base rate.
    pub fn new(name: &str, role: &str, rng: &mut impl Rng) -> Self {
        let rate = rng.random_range(0..=MAX_BASE_RATE);
        Self::with_rate(name, role, rate)
    }

    /// Create an NPC with a fixed rate (scripted setups and tests).
    pub fn with_rate(name: &str, role: &str, rate: u32) -> Self {
        Self {
            name: String::from(name),
            role: String::from(role),
            base_rate: rate,
            current_rate: rate,
            known_intels: BTreeSet::new(),
            current_number: None,
        }
    }

    /// Roll a fresh die value without storing it.
    pub fn roll_number(rng: &mut impl Rng) -> u8 {
        roll_die(rng)
    }

    /// Replace the standing number with a fresh roll.
    ///
    /// Called for every participant at topic start and again immediately
    /// after the number is spent in a resolution.
    pub fn refresh_number(&mut self, rng: &mut impl Rng) {
        self.current_number = Some(Self::roll_number(rng));
    }

    /// Whether this NPC knows the given intel.
    pub fn knows_intel(&self, id: IntelId) -> bool {
        self.known_intels.contains(&id)
    }

    /// Record that this NPC knows an intel. Returns `false` if it
    /// already did.
    pub fn learn_intel(&mut self, id: IntelId) -> bool {
        self.known_intels.insert(id)
    }
}

/// Build the four-candidate pool with freshly rolled base rates.
pub fn candidate_pool(rng: &mut impl Rng) -> Vec<Npc> {
    CANDIDATE_POOL
        .iter()
        .map(|(name, role)| Npc::new(name, role, rng))
        .collect()
}

/// Draw `count` distinct participant names from the pool, uniformly.
///
/// Fisher-Yates partial shuffle over indices; `count` is clamped to the
/// pool size.
pub fn draw_participants(pool: &[Npc], count: usize, rng: &mut impl Rng) -> Vec<String> {
    let len = pool.len();
    let count = count.min(len);

    let mut indices: Vec<usize> = (0..len).collect();
    for i in 0..count {
        let j = rng.random_range(i..len);
        indices.swap(i, j);
    }

    indices
        .iter()
        .take(count)
        .filter_map(|&idx| pool.get(idx).map(|npc| npc.name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn base_rate_stays_in_bounds() {
        for seed in 0..100 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let npc = Npc::new("Quinn", "product manager", &mut rng);
            assert!(npc.base_rate <= MAX_BASE_RATE);
            assert_eq!(npc.current_rate, npc.base_rate);
        }
    }

    #[test]
    fn refresh_number_rolls_one_to_six() {
        let mut rng = SmallRng::seed_from_u64(21);
        let mut npc = Npc::with_rate("Vera", "opposing lead", 50);
        assert_eq!(npc.current_number, None);
        for _ in 0..50 {
            npc.refresh_number(&mut rng);
            assert!(npc.current_number.is_some_and(|n| (1..=6).contains(&n)));
        }
    }

    #[test]
    fn learn_and_knows_agree() {
        let mut npc = Npc::with_rate("Harlan", "team lead", 40);
        let id = IntelId::new();
        assert!(!npc.knows_intel(id));
        assert!(npc.learn_intel(id));
        assert!(npc.knows_intel(id));
        assert!(!npc.learn_intel(id));
    }

    #[test]
    fn pool_has_four_distinct_candidates() {
        let mut rng = SmallRng::seed_from_u64(5);
        let pool = candidate_pool(&mut rng);
        assert_eq!(pool.len(), 4);
        let names: BTreeSet<&str> = pool.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn draw_yields_distinct_names_from_the_pool() {
        let mut rng = SmallRng::seed_from_u64(42);
        let pool = candidate_pool(&mut rng);
        let drawn = draw_participants(&pool, 3, &mut rng);
        assert_eq!(drawn.len(), 3);
        let unique: BTreeSet<&String> = drawn.iter().collect();
        assert_eq!(unique.len(), 3);
        for name in &drawn {
            assert!(pool.iter().any(|npc| &npc.name == name));
        }
    }

    #[test]
    fn draw_clamps_to_pool_size() {
        let mut rng = SmallRng::seed_from_u64(42);
        let pool = candidate_pool(&mut rng);
        let drawn = draw_participants(&pool, 10, &mut rng);
        assert_eq!(drawn.len(), 4);
    }
}
