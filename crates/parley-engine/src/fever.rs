//! The Fever streak: a momentum multiplier across consecutive successful
//! resolutions.
//!
//! The ledger holds RAW per-event scores (intel score times the match
//! multiplier) with no Fever factor baked in. The streak multiplier --
//! `1.0 + (streak - 1) * 0.1`, exact decimal, unbounded -- is applied
//! exactly once, to the ledger sum, when the streak settles. Until then
//! the earnings are provisional: shown live through
//! [`pending_total`](FeverState::pending_total) but only folded into the
//! settled total on exit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Streak step added to the multiplier per consecutive success (0.1).
const STREAK_STEP_TENTHS: i64 = 1;

/// The Fever streak tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeverState {
    active: bool,
    streak: u32,
    ledger: Vec<u64>,
}

impl FeverState {
    /// Create an inactive tracker.
    pub const fn new() -> Self {
        Self {
            active: false,
            streak: 0,
            ledger: Vec::new(),
        }
    }

    /// Whether a streak is currently running.
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Length of the current streak (0 when inactive).
    pub const fn streak(&self) -> u32 {
        self.streak
    }

    /// The raw scores recorded during the current streak.
    pub fn ledger(&self) -> &[u64] {
        &self.ledger
    }

    /// The current streak multiplier: `1.0 + (streak - 1) * 0.1`.
    ///
    /// A streak of 1 multiplies by exactly 1.0; the multiplier is
    /// unbounded above. When no streak is running this is 1.0.
    pub fn multiplier(&self) -> Decimal {
        let tenths = i64::from(self.streak.saturating_sub(1))
            .saturating_mul(STREAK_STEP_TENTHS);
        Decimal::ONE
            .checked_add(Decimal::new(tenths, 1))
            .unwrap_or(Decimal::ONE)
    }

    /// Register one more consecutive success.
    ///
    /// Activates the streak (resetting the ledger) if it was not already
    /// running, then increments the streak and thereby the multiplier.
    pub fn enter(&mut self) {
        if !self.active {
            self.active = true;
            self.streak = 0;
            self.ledger.clear();
        }
        self.streak = self.streak.saturating_add(1);
    }

    /// Record a raw event score into the streak ledger.
    pub fn record(&mut self, raw_score: u64) {
        self.ledger.push(raw_score);
    }

    /// Sum of the raw scores in the ledger.
    pub fn ledger_total(&self) -> u64 {
        self.ledger.iter().fold(0, |acc, s| acc.saturating_add(*s))
    }

    /// The provisional value of the streak: ledger sum times the current
    /// multiplier.
    pub fn pending_total(&self) -> Decimal {
        Decimal::from(self.ledger_total())
            .checked_mul(self.multiplier())
            .unwrap_or(Decimal::ZERO)
    }

    /// End the streak, settling its value.
    ///
    /// Returns `Some(amount)` -- the ledger sum times the multiplier in
    /// effect at exit -- when an active, non-empty streak was settled;
    /// `None` otherwise. State is fully reset either way, so calling
    /// this again immediately changes nothing.
    pub fn exit(&mut self) -> Option<Decimal> {
        let settled = if self.active && !self.ledger.is_empty() {
            Some(self.pending_total())
        } else {
            None
        };
        self.active = false;
        self.streak = 0;
        self.ledger.clear();
        settled
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn multiplier_matches_streak_formula() {
        let mut fever = FeverState::new();
        for n in 1..=10u32 {
            fever.enter();
            let expected = Decimal::ONE
                .checked_add(Decimal::new(i64::from(n.saturating_sub(1)), 1))
                .unwrap_or(Decimal::ONE);
            assert_eq!(fever.multiplier(), expected, "streak {n}");
        }
        assert_eq!(fever.streak(), 10);
        assert_eq!(fever.multiplier(), dec!(1.9));
    }

    #[test]
    fn inactive_multiplier_is_one() {
        let fever = FeverState::new();
        assert_eq!(fever.multiplier(), Decimal::ONE);
    }

    #[test]
    fn streak_five_multiplier_is_one_point_four() {
        let mut fever = FeverState::new();
        for _ in 0..5 {
            fever.enter();
        }
        assert_eq!(fever.multiplier(), dec!(1.4));
    }

    #[test]
    fn enter_after_exit_starts_fresh() {
        let mut fever = FeverState::new();
        fever.enter();
        fever.enter();
        fever.record(600);
        let settled = fever.exit();
        assert_eq!(settled, Some(dec!(660))); // 600 * 1.1

        fever.enter();
        assert_eq!(fever.streak(), 1);
        assert!(fever.ledger().is_empty());
        assert_eq!(fever.multiplier(), Decimal::ONE);
    }

    #[test]
    fn settlement_multiplies_the_ledger_sum_once() {
        let mut fever = FeverState::new();
        // Three consecutive successes: raw 300, 200, 100 at streak 3.
        fever.enter();
        fever.record(300);
        fever.enter();
        fever.record(200);
        fever.enter();
        fever.record(100);

        assert_eq!(fever.ledger_total(), 600);
        assert_eq!(fever.multiplier(), dec!(1.2));
        assert_eq!(fever.pending_total(), dec!(720));
        assert_eq!(fever.exit(), Some(dec!(720)));
    }

    #[test]
    fn exit_is_idempotent_when_ledger_is_empty() {
        let mut fever = FeverState::new();
        fever.enter();
        assert_eq!(fever.exit(), None);

        let before = fever.clone();
        assert_eq!(fever.exit(), None);
        assert_eq!(fever, before);
    }

    #[test]
    fn exit_without_any_activity_settles_nothing() {
        let mut fever = FeverState::new();
        assert_eq!(fever.exit(), None);
        assert!(!fever.is_active());
        assert_eq!(fever.streak(), 0);
    }
}
