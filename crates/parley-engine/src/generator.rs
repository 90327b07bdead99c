//! Intel generation and distribution for a run.
//!
//! - [`generate_topic_intels`] -- build one topic's roster from a
//!   difficulty profile
//! - [`distribute_intels_to_npcs`] -- sync knower sets onto NPCs and
//!   guarantee every NPC knows at least one intel
//!
//! Generation is total: any well-formed profile produces a valid roster,
//! and a profile of all zeros produces an empty topic.

use rand::Rng;

use parley_types::{DifficultyProfile, IntelPolarity};

use crate::intel::{Intel, PREMIUM_SCORE, STANDARD_SCORE};
use crate::npc::Npc;

/// Flavor names for favorable intel, indexed by topic.
const FAVORABLE_NAMES: [&[&str]; 3] = [
    &[
        "Requirements signed off",
        "Proposal approved",
        "Budget secured",
    ],
    &[
        "Milestone ahead of schedule",
        "Code review praise",
        "Test suite green",
    ],
    &[
        "Smooth launch day",
        "Glowing user feedback",
        "Metrics above target",
    ],
];

/// Flavor names for unfavorable intel, indexed by topic.
const UNFAVORABLE_NAMES: [&[&str]; 3] = [
    &[
        "Overnight scope change",
        "Staffing shortfall",
        "Proposal rejected",
    ],
    &["Bug count climbing", "Schedule slipping", "Flaky test suite"],
    &["Launch incident", "User complaints", "Metrics anomaly"],
];

/// Pick a flavor name for a new intel.
fn intel_name(topic: u8, polarity: IntelPolarity, rng: &mut impl Rng) -> String {
    let table = match polarity {
        IntelPolarity::Favorable => &FAVORABLE_NAMES,
        IntelPolarity::Unfavorable => &UNFAVORABLE_NAMES,
    };
    let names: &[&str] = table
        .get(usize::from(topic.saturating_sub(1)))
        .copied()
        .unwrap_or(&[]);
    if names.is_empty() {
        return format!("Topic {topic} intel");
    }
    let idx = rng.random_range(0..names.len());
    names
        .get(idx)
        .map_or_else(|| format!("Topic {topic} intel"), |s| String::from(*s))
}

/// Draw `count` distinct knower names from the participants, uniformly.
fn pick_knowers(participants: &[String], count: usize, rng: &mut impl Rng) -> Vec<String> {
    let len = participants.len();
    let count = count.min(len);

    let mut indices: Vec<usize> = (0..len).collect();
    for i in 0..count {
        let j = rng.random_range(i..len);
        indices.swap(i, j);
    }

    indices
        .iter()
        .take(count)
        .filter_map(|&idx| participants.get(idx).cloned())
        .collect()
}

/// Build one intel with freshly drawn knowers.
fn create_intel(
    topic: u8,
    polarity: IntelPolarity,
    score: u32,
    knower_count: usize,
    participants: &[String],
    rng: &mut impl Rng,
) -> Intel {
    let name = intel_name(topic, polarity, rng);
    let mut intel = Intel::new(name, topic, polarity, score, rng);
    for knower in pick_knowers(participants, knower_count, rng) {
        intel.add_knower(&knower);
    }
    intel
}

/// Generate one topic's intel roster from a difficulty profile.
///
/// Per profile: `bad_intel_count` unfavorable intel (score 100, one
/// knower each), `good_300_count` favorable at 300 (two knowers), and
/// `good_100_count` favorable at 100 (one knower). Knowers are drawn
/// uniformly without replacement per intel.
pub fn generate_topic_intels(
    topic: u8,
    profile: &DifficultyProfile,
    participants: &[String],
    rng: &mut impl Rng,
) -> Vec<Intel> {
    let mut intels = Vec::new();

    for _ in 0..profile.bad_intel_count {
        intels.push(create_intel(
            topic,
            IntelPolarity::Unfavorable,
            STANDARD_SCORE,
            1,
            participants,
            rng,
        ));
    }
    for _ in 0..profile.good_300_count {
        intels.push(create_intel(
            topic,
            IntelPolarity::Favorable,
            PREMIUM_SCORE,
            2,
            participants,
            rng,
        ));
    }
    for _ in 0..profile.good_100_count {
        intels.push(create_intel(
            topic,
            IntelPolarity::Favorable,
            STANDARD_SCORE,
            1,
            participants,
            rng,
        ));
    }

    intels
}

/// Sync knower sets onto NPCs and guarantee every covered NPC knows
/// something.
///
/// First mirrors every intel's knower set into the matching NPC's
/// `known_intels`, then attaches each covered-but-still-empty NPC as an
/// extra knower of one uniformly-random existing intel (both sides
/// updated). `covered` names the NPCs the guarantee applies to -- the
/// engine passes the run's participants, leaving the idle candidate
/// intel-free. Must run after all topics are generated and before any
/// gameplay reads `known_intels`.
///
/// With an empty roster there is nothing to attach and empty NPCs stay
/// empty -- the degenerate all-zero-profile case.
pub fn distribute_intels_to_npcs(
    intels: &mut [Intel],
    npcs: &mut [Npc],
    covered: &[String],
    rng: &mut impl Rng,
) {
    for npc in npcs.iter_mut() {
        for intel in intels.iter() {
            if intel.knowers().contains(&npc.name) {
                npc.learn_intel(intel.id());
            }
        }
    }

    if intels.is_empty() {
        return;
    }

    for npc in npcs.iter_mut() {
        if !covered.contains(&npc.name) || !npc.known_intels.is_empty() {
            continue;
        }
        let idx = rng.random_range(0..intels.len());
        if let Some(intel) = intels.get_mut(idx) {
            intel.add_knower(&npc.name);
            npc.learn_intel(intel.id());
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use parley_types::Difficulty;

    use super::*;

    fn participants() -> Vec<String> {
        vec![
            String::from("Harlan"),
            String::from("Vera"),
            String::from("Quinn"),
        ]
    }

    #[test]
    fn easy_topic_has_expected_composition() {
        let mut rng = SmallRng::seed_from_u64(1);
        let profile = Difficulty::Easy.profile();
        let intels = generate_topic_intels(1, &profile, &participants(), &mut rng);

        assert_eq!(intels.len(), 4);
        let bad = intels
            .iter()
            .filter(|i| i.polarity() == IntelPolarity::Unfavorable)
            .count();
        let premium = intels.iter().filter(|i| i.score() == 300).count();
        assert_eq!(bad, 1);
        assert_eq!(premium, 2);
    }

    #[test]
    fn knower_counts_follow_the_profile() {
        let mut rng = SmallRng::seed_from_u64(2);
        let profile = Difficulty::Hard.profile();
        let intels = generate_topic_intels(2, &profile, &participants(), &mut rng);

        for intel in &intels {
            let expected = if intel.score() == 300 { 2 } else { 1 };
            assert_eq!(intel.knower_count(), expected, "intel {}", intel.name());
            for knower in intel.knowers() {
                assert!(participants().contains(knower));
            }
        }
    }

    #[test]
    fn number_sets_follow_the_score() {
        let mut rng = SmallRng::seed_from_u64(3);
        let profile = Difficulty::Hard.profile();
        for topic in 1..=3 {
            let intels = generate_topic_intels(topic, &profile, &participants(), &mut rng);
            for intel in &intels {
                let expected = if intel.score() == 300 { 2 } else { 3 };
                assert_eq!(intel.numbers().len(), expected);
                assert!(intel.numbers().iter().all(|n| (1..=6).contains(n)));
            }
        }
    }

    #[test]
    fn empty_profile_is_legal() {
        let mut rng = SmallRng::seed_from_u64(4);
        let profile = parley_types::DifficultyProfile {
            bad_intel_count: 0,
            good_300_count: 0,
            good_100_count: 0,
        };
        let intels = generate_topic_intels(1, &profile, &participants(), &mut rng);
        assert!(intels.is_empty());
    }

    #[test]
    fn distribution_leaves_no_npc_empty() {
        for seed in 0..30 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let names = participants();
            let mut npcs: Vec<Npc> = names
                .iter()
                .map(|n| Npc::with_rate(n, "role", 50))
                .collect();

            let profile = Difficulty::Easy.profile();
            let mut intels = Vec::new();
            for topic in 1..=3 {
                intels.extend(generate_topic_intels(topic, &profile, &names, &mut rng));
            }

            distribute_intels_to_npcs(&mut intels, &mut npcs, &names, &mut rng);

            for npc in &npcs {
                assert!(
                    !npc.known_intels.is_empty(),
                    "{} knows nothing (seed {seed})",
                    npc.name
                );
            }
        }
    }

    #[test]
    fn distribution_keeps_both_sides_in_sync() {
        let mut rng = SmallRng::seed_from_u64(12);
        let names = participants();
        let mut npcs: Vec<Npc> = names
            .iter()
            .map(|n| Npc::with_rate(n, "role", 50))
            .collect();

        let profile = Difficulty::Hard.profile();
        let mut intels = Vec::new();
        for topic in 1..=3 {
            intels.extend(generate_topic_intels(topic, &profile, &names, &mut rng));
        }

        distribute_intels_to_npcs(&mut intels, &mut npcs, &names, &mut rng);

        for npc in &npcs {
            for id in &npc.known_intels {
                let intel = intels.iter().find(|i| i.id() == *id);
                assert!(intel.is_some_and(|i| i.knowers().contains(&npc.name)));
            }
        }
        for intel in &intels {
            for knower in intel.knowers() {
                let npc = npcs.iter().find(|n| &n.name == knower);
                assert!(npc.is_some_and(|n| n.knows_intel(intel.id())));
            }
        }
    }

    #[test]
    fn distribution_with_empty_roster_is_a_no_op() {
        let mut rng = SmallRng::seed_from_u64(13);
        let mut npcs = vec![Npc::with_rate("Quinn", "product manager", 50)];
        let mut intels: Vec<Intel> = Vec::new();
        let covered = vec![String::from("Quinn")];
        distribute_intels_to_npcs(&mut intels, &mut npcs, &covered, &mut rng);
        assert!(npcs.iter().all(|n| n.known_intels.is_empty()));
    }
}
