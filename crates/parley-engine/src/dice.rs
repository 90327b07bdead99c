//! Dice primitives shared by every resolution path.
//!
//! Unfavorable-intel resolution, the follow-up bonus roll, and favorable
//! play all use the same mechanic: the player rolls one die, assisting
//! NPCs contribute their standing numbers, and the outcome is the count
//! of values that land inside the intel's number set. Only what happens
//! on zero versus nonzero matches differs, and that is decided by the
//! caller.

use std::collections::BTreeSet;

use rand::Rng;

/// Number of faces on the die; intel numbers live in `1..=DIE_FACES`.
pub const DIE_FACES: u8 = 6;

/// Roll one die, uniform over `1..=DIE_FACES`.
pub fn roll_die(rng: &mut impl Rng) -> u8 {
    rng.random_range(1..=DIE_FACES)
}

/// Outcome of matching a set of rolls against an intel's numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceResolution {
    /// Every value that entered the match, player roll first.
    pub rolls: Vec<u8>,
    /// The subset of `rolls` that landed inside the intel's numbers.
    pub matched: Vec<u8>,
    /// `matched.len()`, kept separately for convenience.
    pub match_count: usize,
}

impl DiceResolution {
    /// Whether at least one roll matched.
    pub const fn is_hit(&self) -> bool {
        self.match_count > 0
    }
}

/// Match the player roll plus assisting numbers against an intel's
/// number set.
///
/// Duplicate rolls count individually: two assistants both showing a
/// matching 4 contribute two matches, exactly as two matching dice on
/// the table would.
pub fn resolve_with_dice(
    numbers: &BTreeSet<u8>,
    player_roll: u8,
    assisting: &[u8],
) -> DiceResolution {
    let mut rolls = Vec::with_capacity(assisting.len().saturating_add(1));
    rolls.push(player_roll);
    rolls.extend_from_slice(assisting);

    let matched: Vec<u8> = rolls
        .iter()
        .copied()
        .filter(|r| numbers.contains(r))
        .collect();
    let match_count = matched.len();

    DiceResolution {
        rolls,
        matched,
        match_count,
    }
}

/// Score multiplier earned by a number of matches.
///
/// - 1 match -> x1
/// - 2 matches -> x2
/// - 3 matches -> x4
/// - 4 or more -> x8
///
/// Zero matches carry no multiplier; callers treat that as a miss before
/// consulting this table.
pub const fn multiplier_for_matches(match_count: usize) -> u32 {
    match match_count {
        0 => 0,
        1 => 1,
        2 => 2,
        3 => 4,
        _ => 8,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn roll_die_stays_in_range() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..200 {
            let roll = roll_die(&mut rng);
            assert!((1..=DIE_FACES).contains(&roll));
        }
    }

    #[test]
    fn resolution_counts_player_and_assists() {
        let numbers: BTreeSet<u8> = [1, 4, 6].into_iter().collect();
        let res = resolve_with_dice(&numbers, 6, &[4, 2]);
        assert_eq!(res.rolls, vec![6, 4, 2]);
        assert_eq!(res.matched, vec![6, 4]);
        assert_eq!(res.match_count, 2);
        assert!(res.is_hit());
    }

    #[test]
    fn resolution_with_no_match_is_a_miss() {
        let numbers: BTreeSet<u8> = [2, 5].into_iter().collect();
        let res = resolve_with_dice(&numbers, 3, &[]);
        assert_eq!(res.match_count, 0);
        assert!(!res.is_hit());
    }

    #[test]
    fn duplicate_rolls_each_count() {
        let numbers: BTreeSet<u8> = [4].into_iter().collect();
        let res = resolve_with_dice(&numbers, 4, &[4, 4]);
        assert_eq!(res.match_count, 3);
    }

    #[test]
    fn multiplier_table() {
        assert_eq!(multiplier_for_matches(0), 0);
        assert_eq!(multiplier_for_matches(1), 1);
        assert_eq!(multiplier_for_matches(2), 2);
        assert_eq!(multiplier_for_matches(3), 4);
        assert_eq!(multiplier_for_matches(4), 8);
        assert_eq!(multiplier_for_matches(9), 8);
    }
}
