//! The intel entity: a discoverable fact with a score, a growing set of
//! matching die numbers, and the NPCs who know it.
//!
//! Identity and polarity are fixed at creation. Everything else mutates
//! through the run: the score is deducted on failed resolutions, the
//! number set grows through processing, the knower set grows through
//! generation and sharing, and an unfavorable intel is neutralized
//! exactly once when the player resolves it. Intel are never deleted;
//! they persist through the result screen.

use std::collections::BTreeSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use parley_types::{IntelClass, IntelId, IntelPolarity};

use crate::dice::DIE_FACES;

/// Score of a standard intel (three starting numbers).
pub const STANDARD_SCORE: u32 = 100;

/// Score of a premium intel (two starting numbers -- harder to hit).
pub const PREMIUM_SCORE: u32 = 300;

/// Score lost when resolving an unfavorable intel fails.
pub const FAILURE_DEDUCTION: u32 = 100;

/// How many starting numbers an intel of the given score carries.
const fn initial_number_count(score: u32) -> usize {
    if score == STANDARD_SCORE { 3 } else { 2 }
}

/// One piece of information in the negotiation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intel {
    /// Unique identity, fixed at creation.
    id: IntelId,
    /// Flavor name shown on the card.
    name: String,
    /// Topic this intel belongs to (1-based).
    topic: u8,
    /// Which side it was generated on; never changes.
    polarity: IntelPolarity,
    /// Set when an unfavorable intel is successfully resolved.
    neutralized: bool,
    /// Current score value; deducted on resolution failure, floored at 0.
    score: u32,
    /// Distinct die values in `1..=6` that count as matches.
    numbers: BTreeSet<u8>,
    /// Names of NPCs aware of this intel; append-only.
    knowers: BTreeSet<String>,
    /// Creation-time coin deciding rumor vs. public for well-known
    /// unfavorable intel.
    rumor_coin: bool,
}

impl Intel {
    /// Create a new intel with a freshly sampled number set.
    ///
    /// The number set holds 3 distinct values for 100-score intel and
    /// 2 for 300-score intel, each uniform in `1..=6`.
    pub fn new(
        name: String,
        topic: u8,
        polarity: IntelPolarity,
        score: u32,
        rng: &mut impl Rng,
    ) -> Self {
        let count = initial_number_count(score);
        let mut numbers = BTreeSet::new();
        while numbers.len() < count {
            numbers.insert(rng.random_range(1..=DIE_FACES));
        }

        Self {
            id: IntelId::new(),
            name,
            topic,
            polarity,
            neutralized: false,
            score,
            numbers,
            knowers: BTreeSet::new(),
            rumor_coin: rng.random_bool(0.5),
        }
    }

    /// Create an intel with an explicit number set instead of a sampled
    /// one (scripted setups and tests).
    ///
    /// The classification coin defaults to public.
    pub fn with_numbers(
        name: String,
        topic: u8,
        polarity: IntelPolarity,
        score: u32,
        numbers: BTreeSet<u8>,
    ) -> Self {
        Self {
            id: IntelId::new(),
            name,
            topic,
            polarity,
            neutralized: false,
            score,
            numbers,
            knowers: BTreeSet::new(),
            rumor_coin: false,
        }
    }

    /// This intel's identity.
    pub const fn id(&self) -> IntelId {
        self.id
    }

    /// The flavor name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The topic this intel belongs to.
    pub const fn topic(&self) -> u8 {
        self.topic
    }

    /// The generation-time polarity.
    pub const fn polarity(&self) -> IntelPolarity {
        self.polarity
    }

    /// Whether this unfavorable intel has been resolved in the player's
    /// favor.
    pub const fn is_neutralized(&self) -> bool {
        self.neutralized
    }

    /// Whether the intel currently works for the player: favorable by
    /// generation, or unfavorable but neutralized.
    pub const fn is_good(&self) -> bool {
        matches!(self.polarity, IntelPolarity::Favorable) || self.neutralized
    }

    /// Current score value.
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// The matching numbers, sorted ascending.
    pub const fn numbers(&self) -> &BTreeSet<u8> {
        &self.numbers
    }

    /// Whether a rolled value is among the matching numbers.
    pub fn has_number(&self, value: u8) -> bool {
        self.numbers.contains(&value)
    }

    /// The NPCs aware of this intel.
    pub const fn knowers(&self) -> &BTreeSet<String> {
        &self.knowers
    }

    /// Number of NPCs aware of this intel.
    pub fn knower_count(&self) -> usize {
        self.knowers.len()
    }

    /// Record that an NPC knows this intel. Returns `false` if it
    /// already did.
    pub fn add_knower(&mut self, npc_name: &str) -> bool {
        self.knowers.insert(String::from(npc_name))
    }

    /// Mark an unfavorable intel as resolved in the player's favor.
    ///
    /// Called exactly once, by the resolution that succeeds. Favorable
    /// intel never need it.
    pub const fn neutralize(&mut self) {
        self.neutralized = true;
    }

    /// Deduct the resolution-failure penalty, flooring the score at 0.
    ///
    /// Returns the amount actually deducted.
    pub const fn deduct_score(&mut self) -> u32 {
        let deducted = if self.score < FAILURE_DEDUCTION {
            self.score
        } else {
            FAILURE_DEDUCTION
        };
        self.score = self.score.saturating_sub(deducted);
        deducted
    }

    /// Append one uniformly-chosen missing number to the match set.
    ///
    /// Returns the new number, or `None` when all six faces are already
    /// present. The set only ever grows.
    pub fn add_random_number(&mut self, rng: &mut impl Rng) -> Option<u8> {
        let available: Vec<u8> = (1..=DIE_FACES)
            .filter(|n| !self.numbers.contains(n))
            .collect();
        if available.is_empty() {
            return None;
        }
        let idx = rng.random_range(0..available.len());
        let new_number = available.into_iter().nth(idx)?;
        self.numbers.insert(new_number);
        Some(new_number)
    }

    /// Classify the intel from its current knower count.
    ///
    /// Exactly one knower makes a secret. A well-known unfavorable intel
    /// (three or more knowers) circulates as a rumor or as public
    /// knowledge according to its creation-time coin. Everything else is
    /// public. Informational only -- gameplay never branches on it.
    pub fn classify(&self) -> IntelClass {
        let count = self.knower_count();
        if count == 1 {
            return IntelClass::Secret;
        }
        if matches!(self.polarity, IntelPolarity::Unfavorable) && count >= 3 {
            return if self.rumor_coin {
                IntelClass::Rumor
            } else {
                IntelClass::Public
            };
        }
        IntelClass::Public
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn sample(score: u32, polarity: IntelPolarity, seed: u64) -> Intel {
        let mut rng = SmallRng::seed_from_u64(seed);
        Intel::new(String::from("test intel"), 1, polarity, score, &mut rng)
    }

    #[test]
    fn standard_intel_starts_with_three_numbers() {
        for seed in 0..50 {
            let intel = sample(STANDARD_SCORE, IntelPolarity::Favorable, seed);
            assert_eq!(intel.numbers().len(), 3);
            assert!(intel.numbers().iter().all(|n| (1..=6).contains(n)));
        }
    }

    #[test]
    fn premium_intel_starts_with_two_numbers() {
        for seed in 0..50 {
            let intel = sample(PREMIUM_SCORE, IntelPolarity::Favorable, seed);
            assert_eq!(intel.numbers().len(), 2);
            assert!(intel.numbers().iter().all(|n| (1..=6).contains(n)));
        }
    }

    #[test]
    fn numbers_grow_without_duplicates() {
        let mut intel = sample(PREMIUM_SCORE, IntelPolarity::Favorable, 3);
        let mut rng = SmallRng::seed_from_u64(99);
        let mut previous = intel.numbers().len();
        while let Some(added) = intel.add_random_number(&mut rng) {
            assert!((1..=6).contains(&added));
            assert_eq!(intel.numbers().len(), previous.saturating_add(1));
            previous = intel.numbers().len();
        }
        // Exhausted: all six faces present, further adds are refused.
        assert_eq!(intel.numbers().len(), 6);
        assert_eq!(intel.add_random_number(&mut rng), None);
    }

    #[test]
    fn deduction_floors_at_zero() {
        let mut intel = sample(STANDARD_SCORE, IntelPolarity::Unfavorable, 5);
        assert_eq!(intel.deduct_score(), 100);
        assert_eq!(intel.score(), 0);
        assert_eq!(intel.deduct_score(), 0);
        assert_eq!(intel.score(), 0);
    }

    #[test]
    fn neutralization_makes_unfavorable_good() {
        let mut intel = sample(STANDARD_SCORE, IntelPolarity::Unfavorable, 8);
        assert!(!intel.is_good());
        intel.neutralize();
        assert!(intel.is_good());
        assert_eq!(intel.polarity(), IntelPolarity::Unfavorable);
    }

    #[test]
    fn single_knower_is_secret() {
        let mut intel = sample(STANDARD_SCORE, IntelPolarity::Favorable, 11);
        intel.add_knower("Quinn");
        assert_eq!(intel.classify(), IntelClass::Secret);
    }

    #[test]
    fn well_known_unfavorable_follows_the_coin() {
        let mut intel = sample(STANDARD_SCORE, IntelPolarity::Unfavorable, 13);
        for name in ["Quinn", "Vera", "Harlan"] {
            intel.add_knower(name);
        }
        intel.rumor_coin = true;
        assert_eq!(intel.classify(), IntelClass::Rumor);
        intel.rumor_coin = false;
        assert_eq!(intel.classify(), IntelClass::Public);
    }

    #[test]
    fn well_known_favorable_is_public() {
        let mut intel = sample(STANDARD_SCORE, IntelPolarity::Favorable, 17);
        for name in ["Quinn", "Vera", "Harlan"] {
            intel.add_knower(name);
        }
        intel.rumor_coin = true;
        assert_eq!(intel.classify(), IntelClass::Public);
    }

    #[test]
    fn add_knower_is_idempotent() {
        let mut intel = sample(STANDARD_SCORE, IntelPolarity::Favorable, 19);
        assert!(intel.add_knower("Quinn"));
        assert!(!intel.add_knower("Quinn"));
        assert_eq!(intel.knower_count(), 1);
    }
}
