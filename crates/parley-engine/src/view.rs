//! Read-only snapshots handed to the rendering collaborator.
//!
//! The engine is passive: the UI pulls these views after each command
//! and renders them however it likes. Nothing here feeds back into the
//! run state.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use parley_types::{EventStage, IntelClass, IntelId, IntelPolarity, Rating};

/// Snapshot of one intel for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntelView {
    /// Intel identity.
    pub id: IntelId,
    /// Flavor name.
    pub name: String,
    /// Topic it belongs to.
    pub topic: u8,
    /// Current score value.
    pub score: u32,
    /// Matching numbers, ascending.
    pub numbers: Vec<u8>,
    /// Generation-time polarity.
    pub polarity: IntelPolarity,
    /// Whether it currently works for the player.
    pub is_good: bool,
    /// Derived classification (secret / public / rumor).
    pub class: IntelClass,
    /// NPCs aware of it.
    pub knowers: Vec<String>,
    /// Whether the event phase has handled it.
    pub processed: bool,
    /// Whether the process stage touched it (informational only).
    pub processed_in_stage: bool,
}

/// Snapshot of one NPC for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcView {
    /// Display name.
    pub name: String,
    /// Display role.
    pub role: String,
    /// Alignment rate fixed at creation (percent).
    pub base_rate: u32,
    /// Current collection rate (percent).
    pub current_rate: u32,
    /// Standing die number, if rolled.
    pub current_number: Option<u8>,
    /// Whether this NPC participates in the run.
    pub participating: bool,
    /// Whether the player already got everything out of this NPC.
    pub interacted: bool,
}

/// What kind of action the current card is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    /// An unfavorable intel awaiting resolution.
    Resolve,
    /// A just-resolved intel awaiting its bonus roll.
    Bonus,
    /// A favorable intel ready to be played.
    Play,
}

/// The card the event phase currently presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentCard {
    /// The topic's sub-stage.
    pub stage: EventStage,
    /// What the card is waiting for; `None` once the topic is complete.
    pub kind: Option<CardKind>,
    /// The intel on display; `None` once the topic is complete.
    pub intel: Option<IntelId>,
    /// Cursor position within the stage.
    pub index: usize,
    /// Stage total the cursor runs against.
    pub total: usize,
}

/// Live score breakdown: settled total plus unsettled Fever earnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Score already folded in by past Fever settlements.
    pub settled: Decimal,
    /// Sum of the raw scores in the running Fever ledger.
    pub fever_base: u64,
    /// Multiplier the running streak has reached.
    pub fever_multiplier: Decimal,
    /// `fever_base` times the multiplier -- the provisional streak value.
    pub fever_total: Decimal,
    /// `settled + fever_total`, floored to an integer for display.
    pub display: i64,
}

impl ScoreBreakdown {
    /// Assemble a breakdown from the settled total and streak figures.
    pub fn assemble(settled: Decimal, fever_base: u64, fever_multiplier: Decimal) -> Self {
        let fever_total = Decimal::from(fever_base)
            .checked_mul(fever_multiplier)
            .unwrap_or(Decimal::ZERO);
        let display = settled
            .checked_add(fever_total)
            .unwrap_or(settled)
            .floor()
            .to_i64()
            .unwrap_or(i64::MAX);
        Self {
            settled,
            fever_base,
            fever_multiplier,
            fever_total,
            display,
        }
    }
}

/// The final result, computed once when the run enters the result phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalResult {
    /// Sum of every processed intel's score, un-multiplied.
    pub base_score: u64,
    /// First rating threshold: `base_score * 1.5`.
    pub tier1: Decimal,
    /// Second rating threshold: `base_score * 4`.
    pub tier2: Decimal,
    /// The settled display score, Fever bonuses included.
    pub total_score: Decimal,
    /// Rating of the run.
    pub rating: Rating,
}

impl FinalResult {
    /// Compute the result from the processed-intel sum and settled total.
    ///
    /// The tiers derive from `base_score` and the rating compares
    /// `base_score` against them; `total_score` is carried for display
    /// only.
    pub fn compute(base_score: u64, total_score: Decimal) -> Self {
        let base = Decimal::from(base_score);
        let tier1 = base.checked_mul(Decimal::new(15, 1)).unwrap_or(base);
        let tier2 = base.checked_mul(Decimal::from(4u32)).unwrap_or(base);
        Self {
            base_score,
            tier1,
            tier2,
            total_score,
            rating: rating_for(base_score, tier1, tier2),
        }
    }
}

/// Rate a base score against two tier thresholds.
///
/// `Perfect` at or above the second tier, `Success` at or above the
/// first, `Fail` below both. The comparison uses the un-multiplied base
/// score, never the Fever-boosted total.
pub fn rating_for(base_score: u64, tier1: Decimal, tier2: Decimal) -> Rating {
    let base = Decimal::from(base_score);
    if base >= tier2 {
        Rating::Perfect
    } else if base >= tier1 {
        Rating::Success
    } else {
        Rating::Fail
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn rating_against_fixed_tiers() {
        assert_eq!(rating_for(1200, dec!(1800), dec!(4800)), Rating::Fail);
        assert_eq!(rating_for(2000, dec!(1800), dec!(4800)), Rating::Success);
        assert_eq!(rating_for(5000, dec!(1800), dec!(4800)), Rating::Perfect);
    }

    #[test]
    fn rating_hits_tiers_inclusively() {
        assert_eq!(rating_for(1800, dec!(1800), dec!(4800)), Rating::Success);
        assert_eq!(rating_for(4800, dec!(1800), dec!(4800)), Rating::Perfect);
    }

    #[test]
    fn compute_derives_tiers_from_base() {
        let result = FinalResult::compute(1200, dec!(1500));
        assert_eq!(result.tier1, dec!(1800));
        assert_eq!(result.tier2, dec!(4800));
        assert_eq!(result.total_score, dec!(1500));
        // A positive base never reaches its own 1.5x tier.
        assert_eq!(result.rating, Rating::Fail);
    }

    #[test]
    fn breakdown_floors_the_display_score() {
        let breakdown = ScoreBreakdown::assemble(dec!(100), 300, dec!(1.1));
        assert_eq!(breakdown.fever_total, dec!(330));
        assert_eq!(breakdown.display, 430);

        let fractional = ScoreBreakdown::assemble(dec!(100.5), 100, dec!(1.1));
        // 100.5 + 110 = 210.5 -> floored.
        assert_eq!(fractional.display, 210);
    }

    #[test]
    fn breakdown_without_fever_shows_settled_only() {
        let breakdown = ScoreBreakdown::assemble(dec!(700), 0, Decimal::ONE);
        assert_eq!(breakdown.fever_total, Decimal::ZERO);
        assert_eq!(breakdown.display, 700);
    }
}
