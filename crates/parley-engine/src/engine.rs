//! The game context: one [`Game`] value owns all mutable run state and
//! drives the phase machine.
//!
//! Phases advance strictly forward -- Setup, Collect, Process, Event,
//! Result -- with the three-topic loop living inside Event. Every public
//! command validates first and mutates second, so a rejected call
//! (`Err`) leaves the run exactly as it was. Probability-driven outcomes
//! (collection, resolution, bonus) are ordinary success/failure values,
//! never errors.
//!
//! All randomness flows through injected [`Rng`] parameters; the engine
//! holds no random source of its own.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use parley_types::{Difficulty, EventStage, GamePhase, IntelId, IntelPolarity};

use crate::config::GameConfig;
use crate::dice;
use crate::error::EngineError;
use crate::fever::FeverState;
use crate::generator;
use crate::intel::Intel;
use crate::log::GameLog;
use crate::npc::{self, COLLECT_RATE_STEP, MAX_COLLECT_RATE, Npc};
use crate::view::{CardKind, CurrentCard, FinalResult, IntelView, NpcView, ScoreBreakdown};

/// What came out of one collection attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectOutcome {
    /// Whether the NPC talked.
    pub success: bool,
    /// Intel the player did not have before.
    pub newly_collected: Vec<IntelId>,
    /// The NPC's collection rate after the attempt.
    pub current_rate: u32,
}

/// What came out of one processing attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOutcome {
    /// Whether the roll landed inside the intel's numbers.
    pub success: bool,
    /// The die value rolled.
    pub roll: u8,
    /// The number appended on success; `None` on failure or when all
    /// six faces were already present.
    pub added_number: Option<u8>,
}

/// What came out of one dice resolution (unfavorable, bonus, or
/// favorable play).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionOutcome {
    /// Whether at least one die matched.
    pub success: bool,
    /// The player's own roll.
    pub player_roll: u8,
    /// Every value that entered the match, player roll first.
    pub rolls: Vec<u8>,
    /// The values that landed inside the intel's numbers.
    pub matched: Vec<u8>,
    /// Multiplier earned by the match count (0 on a miss).
    pub multiplier: u32,
    /// Provisional score for this event under the streak multiplier in
    /// effect when it was recorded; `None` when nothing was scored.
    pub score: Option<Decimal>,
    /// Whether a bonus roll is now pending for the same intel.
    pub need_bonus: bool,
    /// Score deducted from the intel on a failed resolution.
    pub deducted: u32,
}

impl ResolutionOutcome {
    /// A missed roll with no score movement.
    fn miss(player_roll: u8, rolls: Vec<u8>) -> Self {
        Self {
            success: false,
            player_roll,
            rolls,
            matched: Vec::new(),
            multiplier: 0,
            score: None,
            need_bonus: false,
            deducted: 0,
        }
    }
}

/// The run context: every piece of mutable game state, plus the log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    config: GameConfig,
    difficulty: Option<Difficulty>,
    phase: GamePhase,
    current_topic: u8,
    action_points: u32,
    npcs: Vec<Npc>,
    participants: Vec<String>,
    intels: Vec<Intel>,
    collected: BTreeSet<IntelId>,
    processed: BTreeSet<IntelId>,
    processed_in_stage: BTreeSet<IntelId>,
    interacted: BTreeSet<String>,
    pending_shares: BTreeMap<IntelId, Vec<String>>,
    stage: EventStage,
    unfavorable_cursor: usize,
    favorable_cursor: usize,
    original_unfavorable: usize,
    original_favorable: usize,
    bonus_intel: Option<IntelId>,
    fever: FeverState,
    total_score: Decimal,
    final_result: Option<FinalResult>,
    log: GameLog,
}

impl Game {
    /// Create a fresh run in the Setup phase with a newly rolled
    /// candidate pool.
    pub fn new(config: GameConfig, rng: &mut impl Rng) -> Self {
        Self {
            config,
            difficulty: None,
            phase: GamePhase::Setup,
            current_topic: 1,
            action_points: config.max_action_points,
            npcs: npc::candidate_pool(rng),
            participants: Vec::new(),
            intels: Vec::new(),
            collected: BTreeSet::new(),
            processed: BTreeSet::new(),
            processed_in_stage: BTreeSet::new(),
            interacted: BTreeSet::new(),
            pending_shares: BTreeMap::new(),
            stage: EventStage::Unfavorable,
            unfavorable_cursor: 0,
            favorable_cursor: 0,
            original_unfavorable: 0,
            original_favorable: 0,
            bonus_intel: None,
            fever: FeverState::new(),
            total_score: Decimal::ZERO,
            final_result: None,
            log: GameLog::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Current phase.
    pub const fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Current topic (1-based).
    pub const fn current_topic(&self) -> u8 {
        self.current_topic
    }

    /// Action points remaining.
    pub const fn action_points(&self) -> u32 {
        self.action_points
    }

    /// The selected difficulty, once the run has started.
    pub const fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    /// Names of the participating NPCs.
    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    /// The sub-stage of the current topic.
    pub const fn event_stage(&self) -> EventStage {
        self.stage
    }

    /// The intel awaiting a bonus roll, if any.
    pub const fn pending_bonus(&self) -> Option<IntelId> {
        self.bonus_intel
    }

    /// Look up an intel by id.
    pub fn intel(&self, id: IntelId) -> Option<&Intel> {
        self.intels.iter().find(|i| i.id() == id)
    }

    /// Ids the player has collected so far.
    pub const fn collected(&self) -> &BTreeSet<IntelId> {
        &self.collected
    }

    /// Ids the event phase has handled.
    pub const fn processed(&self) -> &BTreeSet<IntelId> {
        &self.processed
    }

    /// The queued shares: intel id to NPC names, each pre-paid one
    /// action point.
    pub const fn pending_shares(&self) -> &BTreeMap<IntelId, Vec<String>> {
        &self.pending_shares
    }

    /// The Fever tracker.
    pub const fn fever(&self) -> &FeverState {
        &self.fever
    }

    /// The narration log.
    pub const fn log(&self) -> &GameLog {
        &self.log
    }

    /// The final result, available once the run reaches Result.
    pub const fn final_result(&self) -> Option<&FinalResult> {
        self.final_result.as_ref()
    }

    /// Live score breakdown: settled total plus unsettled Fever value.
    pub fn display_score(&self) -> ScoreBreakdown {
        ScoreBreakdown::assemble(
            self.total_score,
            self.fever.ledger_total(),
            self.fever.multiplier(),
        )
    }

    /// Snapshot every NPC for display.
    pub fn npc_views(&self) -> Vec<NpcView> {
        self.npcs
            .iter()
            .map(|n| NpcView {
                name: n.name.clone(),
                role: n.role.clone(),
                base_rate: n.base_rate,
                current_rate: n.current_rate,
                current_number: n.current_number,
                participating: self.participants.contains(&n.name),
                interacted: self.interacted.contains(&n.name),
            })
            .collect()
    }

    /// Snapshot every collected intel for display, in roster order.
    pub fn collected_intel_views(&self) -> Vec<IntelView> {
        self.intels
            .iter()
            .filter(|i| self.collected.contains(&i.id()))
            .map(|i| IntelView {
                id: i.id(),
                name: String::from(i.name()),
                topic: i.topic(),
                score: i.score(),
                numbers: i.numbers().iter().copied().collect(),
                polarity: i.polarity(),
                is_good: i.is_good(),
                class: i.classify(),
                knowers: i.knowers().iter().cloned().collect(),
                processed: self.processed.contains(&i.id()),
                processed_in_stage: self.processed_in_stage.contains(&i.id()),
            })
            .collect()
    }

    /// The card the event phase currently presents, or `None` outside
    /// the Event phase.
    pub fn current_card(&self) -> Option<CurrentCard> {
        if self.phase != GamePhase::Event {
            return None;
        }
        if let Some(id) = self.bonus_intel {
            return Some(CurrentCard {
                stage: self.stage,
                kind: Some(CardKind::Bonus),
                intel: Some(id),
                index: self.unfavorable_cursor,
                total: self.original_unfavorable,
            });
        }
        if let Some(id) = self.first_unprocessed(IntelPolarity::Unfavorable) {
            return Some(CurrentCard {
                stage: self.stage,
                kind: Some(CardKind::Resolve),
                intel: Some(id),
                index: self.unfavorable_cursor,
                total: self.original_unfavorable,
            });
        }
        if let Some(id) = self.first_unprocessed(IntelPolarity::Favorable) {
            return Some(CurrentCard {
                stage: self.stage,
                kind: Some(CardKind::Play),
                intel: Some(id),
                index: self.favorable_cursor,
                total: self.original_favorable,
            });
        }
        Some(CurrentCard {
            stage: EventStage::Complete,
            kind: None,
            intel: None,
            index: 0,
            total: 0,
        })
    }

    /// Participants who can legally assist with the given intel: a
    /// standing number is required, and knowers of a still-unfavorable
    /// intel are disqualified (foreknowledge works against the player).
    pub fn eligible_assistants(&self, intel_id: IntelId) -> Result<Vec<String>, EngineError> {
        let intel = self
            .intel(intel_id)
            .ok_or(EngineError::UnknownIntel(intel_id))?;
        let mut eligible = Vec::new();
        for name in &self.participants {
            let Some(npc) = self.npcs.iter().find(|n| &n.name == name) else {
                continue;
            };
            if npc.current_number.is_none() {
                continue;
            }
            if !intel.is_good() && npc.knows_intel(intel_id) {
                continue;
            }
            eligible.push(npc.name.clone());
        }
        Ok(eligible)
    }

    /// Roll the knowledge-alignment gate for one NPC against one intel.
    ///
    /// Knowers of favorable intel always align; knowers of unfavorable
    /// intel never do; everyone else aligns with probability
    /// `base_rate` percent. An NPC with no standing number cannot align.
    /// The UI runs this before offering an NPC for manual selection;
    /// resolution itself only re-checks legality, not alignment.
    pub fn check_alignment(
        &self,
        npc_name: &str,
        intel_id: IntelId,
        rng: &mut impl Rng,
    ) -> Result<bool, EngineError> {
        let intel = self
            .intel(intel_id)
            .ok_or(EngineError::UnknownIntel(intel_id))?;
        let npc = self
            .npcs
            .iter()
            .find(|n| n.name == npc_name)
            .ok_or_else(|| EngineError::UnknownNpc(String::from(npc_name)))?;

        if npc.current_number.is_none() {
            return Ok(false);
        }
        if npc.knows_intel(intel_id) {
            return Ok(intel.is_good());
        }
        Ok(rng.random_range(0..100) < npc.base_rate)
    }

    // -----------------------------------------------------------------------
    // Setup -> Collect
    // -----------------------------------------------------------------------

    /// Start the run: draw participants, generate every topic's intel,
    /// distribute it, and pre-reveal a 30--70% slice of the roster.
    pub fn start_game(
        &mut self,
        difficulty: Difficulty,
        rng: &mut impl Rng,
    ) -> Result<(), EngineError> {
        self.require_phase(GamePhase::Setup)?;

        self.difficulty = Some(difficulty);
        self.participants =
            npc::draw_participants(&self.npcs, self.config.participant_count, rng);

        let profile = difficulty.profile();
        for topic in 1..=self.config.topic_count {
            let generated =
                generator::generate_topic_intels(topic, &profile, &self.participants, rng);
            self.intels.extend(generated);
        }
        generator::distribute_intels_to_npcs(
            &mut self.intels,
            &mut self.npcs,
            &self.participants,
            rng,
        );

        let total = self.intels.len();
        if total > 0 {
            let pct = rng.random_range(self.config.reveal_min_pct..=self.config.reveal_max_pct);
            let count = total
                .saturating_mul(usize::try_from(pct).unwrap_or(0))
                .checked_div(100)
                .unwrap_or(0);
            for intel in self.intels.iter().take(count) {
                self.collected.insert(intel.id());
            }
            self.log
                .info(format!("Starting knowledge: {count}/{total} intel already in hand"));
        }

        // An NPC whose entire known set is already collected has nothing
        // left to give.
        for npc in &self.npcs {
            let nothing_new = npc
                .known_intels
                .iter()
                .all(|id| self.collected.contains(id));
            if nothing_new {
                self.interacted.insert(npc.name.clone());
            }
        }

        self.phase = GamePhase::Collect;
        self.log
            .info(format!("Run started on {difficulty} difficulty"));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Collect phase
    // -----------------------------------------------------------------------

    /// Question an NPC for everything it knows. Costs one action point
    /// whatever happens; a refusal raises the NPC's rate for next time.
    pub fn collect_from_npc(
        &mut self,
        npc_name: &str,
        rng: &mut impl Rng,
    ) -> Result<CollectOutcome, EngineError> {
        self.require_phase(GamePhase::Collect)?;
        let pos = self
            .npcs
            .iter()
            .position(|n| n.name == npc_name)
            .ok_or_else(|| EngineError::UnknownNpc(String::from(npc_name)))?;
        self.spend_action_point()?;

        let (current_rate, known): (u32, Vec<IntelId>) = self
            .npcs
            .get(pos)
            .map(|n| (n.current_rate, n.known_intels.iter().copied().collect()))
            .unwrap_or((0, Vec::new()));

        let success = rng.random_range(0..100) < current_rate;
        if success {
            let mut newly_collected = Vec::new();
            for id in known {
                if self.collected.insert(id) {
                    newly_collected.push(id);
                }
            }
            self.interacted.insert(String::from(npc_name));

            if newly_collected.is_empty() {
                self.log.info(format!("{npc_name} had nothing new"));
            } else {
                let names = newly_collected
                    .iter()
                    .filter_map(|id| self.intel(*id).map(Intel::name))
                    .collect::<Vec<_>>()
                    .join(", ");
                self.log.success(format!("{npc_name} shared: {names}"));
            }
            Ok(CollectOutcome {
                success: true,
                newly_collected,
                current_rate,
            })
        } else {
            let new_rate = current_rate
                .saturating_add(COLLECT_RATE_STEP)
                .min(MAX_COLLECT_RATE);
            if let Some(n) = self.npcs.get_mut(pos) {
                n.current_rate = new_rate;
            }
            self.log.fail(format!(
                "{npc_name} wouldn't talk -- rate rises to {new_rate}%"
            ));
            Ok(CollectOutcome {
                success: false,
                newly_collected: Vec::new(),
                current_rate: new_rate,
            })
        }
    }

    /// Advance from Collect to Process.
    pub fn start_process_stage(&mut self) -> Result<(), EngineError> {
        self.require_phase(GamePhase::Collect)?;
        self.phase = GamePhase::Process;
        self.log.info("Processing stage begins");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Process phase
    // -----------------------------------------------------------------------

    /// Try to strengthen an intel: costs one action point; if the roll
    /// already sits in the intel's numbers, a new number is appended.
    pub fn process_intel(
        &mut self,
        intel_id: IntelId,
        rng: &mut impl Rng,
    ) -> Result<ProcessOutcome, EngineError> {
        let roll = dice::roll_die(rng);
        self.process_intel_with_roll(intel_id, roll, rng)
    }

    /// [`process_intel`](Self::process_intel) with the player's die
    /// supplied by the caller.
    fn process_intel_with_roll(
        &mut self,
        intel_id: IntelId,
        roll: u8,
        rng: &mut impl Rng,
    ) -> Result<ProcessOutcome, EngineError> {
        self.require_phase(GamePhase::Process)?;
        self.require_collected(intel_id)?;
        self.spend_action_point()?;

        let Some(intel) = self.intels.iter_mut().find(|i| i.id() == intel_id) else {
            return Err(EngineError::UnknownIntel(intel_id));
        };
        let success = intel.has_number(roll);
        if success {
            let added_number = intel.add_random_number(rng);
            let name = String::from(intel.name());
            self.processed_in_stage.insert(intel_id);
            match added_number {
                Some(n) => self.log.success(format!(
                    "Processed \"{name}\": rolled {roll}, gained number {n}"
                )),
                None => self.log.success(format!(
                    "Processed \"{name}\": rolled {roll}, but it already matches everything"
                )),
            }
            Ok(ProcessOutcome {
                success: true,
                roll,
                added_number,
            })
        } else {
            let name = String::from(intel.name());
            self.log.fail(format!(
                "Processing \"{name}\" failed: rolled {roll}, no match"
            ));
            Ok(ProcessOutcome {
                success: false,
                roll,
                added_number: None,
            })
        }
    }

    /// Toggle a queued share of an intel with an NPC.
    ///
    /// Checking costs one action point immediately; unchecking refunds
    /// it. The queue is realized when the negotiation starts.
    pub fn set_pending_share(
        &mut self,
        intel_id: IntelId,
        npc_name: &str,
        checked: bool,
    ) -> Result<(), EngineError> {
        self.require_phase(GamePhase::Process)?;
        self.require_collected(intel_id)?;
        if !self.npcs.iter().any(|n| n.name == npc_name) {
            return Err(EngineError::UnknownNpc(String::from(npc_name)));
        }

        if checked {
            let already_knows = self
                .intel(intel_id)
                .is_some_and(|i| i.knowers().contains(npc_name));
            if already_knows {
                return Err(EngineError::AlreadyKnows {
                    npc: String::from(npc_name),
                });
            }
            let already_pending = self
                .pending_shares
                .get(&intel_id)
                .is_some_and(|pending| pending.iter().any(|n| n == npc_name));
            if already_pending {
                return Err(EngineError::AlreadyPending {
                    npc: String::from(npc_name),
                });
            }
            if self.action_points == 0 {
                return Err(EngineError::InsufficientActionPoints {
                    required: 1,
                    available: 0,
                });
            }
            self.action_points = self.action_points.saturating_sub(1);
            self.pending_shares
                .entry(intel_id)
                .or_default()
                .push(String::from(npc_name));
            self.log
                .info(format!("Queued a share with {npc_name} (1 point spent)"));
        } else {
            let Some(pending) = self.pending_shares.get_mut(&intel_id) else {
                return Err(EngineError::NotPending {
                    npc: String::from(npc_name),
                });
            };
            let Some(pos) = pending.iter().position(|n| n == npc_name) else {
                return Err(EngineError::NotPending {
                    npc: String::from(npc_name),
                });
            };
            pending.remove(pos);
            if pending.is_empty() {
                self.pending_shares.remove(&intel_id);
            }
            self.action_points = self
                .action_points
                .saturating_add(1)
                .min(self.config.max_action_points);
            self.log
                .info(format!("Unqueued the share with {npc_name} (1 point back)"));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Process -> Event
    // -----------------------------------------------------------------------

    /// Open the negotiation: realize every queued share, then enter the
    /// first topic.
    pub fn start_topic(&mut self, rng: &mut impl Rng) -> Result<(), EngineError> {
        self.require_phase(GamePhase::Process)?;

        let queued: Vec<(IntelId, Vec<String>)> = self
            .pending_shares
            .iter()
            .map(|(id, names)| (*id, names.clone()))
            .collect();
        let mut shared_count: BTreeMap<String, u32> = BTreeMap::new();
        for (intel_id, names) in queued {
            for name in names {
                let added = self
                    .intels
                    .iter_mut()
                    .find(|i| i.id() == intel_id)
                    .is_some_and(|i| i.add_knower(&name));
                if added {
                    if let Some(npc) = self.npcs.iter_mut().find(|n| n.name == name) {
                        npc.learn_intel(intel_id);
                    }
                    let count = shared_count.entry(name).or_insert(0);
                    *count = count.saturating_add(1);
                }
            }
        }
        for (name, count) in shared_count {
            self.log
                .success(format!("Told {name} about {count} intel"));
        }
        self.pending_shares.clear();

        self.phase = GamePhase::Event;
        self.log.info("The negotiation begins");
        self.open_topic(rng);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Event phase
    // -----------------------------------------------------------------------

    /// Roll against the current unfavorable card.
    ///
    /// Success neutralizes the intel and unlocks a bonus roll; the card
    /// stays current until the bonus resolves. Failure deducts score,
    /// ends any Fever streak, and advances the cursor.
    pub fn resolve_unfavorable_intel(
        &mut self,
        intel_id: IntelId,
        assistants: &[String],
        rng: &mut impl Rng,
    ) -> Result<ResolutionOutcome, EngineError> {
        let player_roll = dice::roll_die(rng);
        self.resolve_unfavorable_with_roll(intel_id, assistants, player_roll, rng)
    }

    fn resolve_unfavorable_with_roll(
        &mut self,
        intel_id: IntelId,
        assistants: &[String],
        player_roll: u8,
        rng: &mut impl Rng,
    ) -> Result<ResolutionOutcome, EngineError> {
        self.require_phase(GamePhase::Event)?;
        if let Some(pending) = self.bonus_intel {
            return Err(EngineError::BonusPending { pending });
        }
        self.require_stage(EventStage::Unfavorable)?;
        if self.intel(intel_id).is_none() {
            return Err(EngineError::UnknownIntel(intel_id));
        }
        if self.first_unprocessed(IntelPolarity::Unfavorable) != Some(intel_id) {
            return Err(EngineError::CardMismatch {
                submitted: intel_id,
            });
        }

        let (_, assist_numbers) = self.assemble_assistants(intel_id, assistants, rng)?;
        self.log.info(format!("You roll a {player_roll}"));

        let numbers = self
            .intel(intel_id)
            .map(|i| i.numbers().clone())
            .unwrap_or_default();
        let resolution = dice::resolve_with_dice(&numbers, player_roll, &assist_numbers);

        if resolution.is_hit() {
            let name = self.intel_name(intel_id);
            if let Some(intel) = self.intels.iter_mut().find(|i| i.id() == intel_id) {
                intel.neutralize();
            }
            self.bonus_intel = Some(intel_id);
            self.log.success(format!(
                "Resolved \"{name}\" (matched {}) -- bonus roll unlocked",
                join_numbers(&resolution.matched)
            ));
            Ok(ResolutionOutcome {
                success: true,
                player_roll,
                rolls: resolution.rolls,
                matched: resolution.matched,
                multiplier: 0,
                score: None,
                need_bonus: true,
                deducted: 0,
            })
        } else {
            self.settle_fever();
            let deducted = self
                .intels
                .iter_mut()
                .find(|i| i.id() == intel_id)
                .map_or(0, Intel::deduct_score);
            let name = self.intel_name(intel_id);
            self.processed.insert(intel_id);
            self.advance_unfavorable_cursor();
            self.log.fail(format!(
                "Failed to resolve \"{name}\" -- {deducted} points lost"
            ));
            Ok(ResolutionOutcome {
                deducted,
                ..ResolutionOutcome::miss(player_roll, resolution.rolls)
            })
        }
    }

    /// Take the bonus roll unlocked by a successful resolution.
    ///
    /// A hit scores `intel score x match multiplier` into the Fever
    /// ledger and extends the streak; a miss ends the streak. Either
    /// way the intel is marked processed and the cursor advances --
    /// the bonus is single-shot.
    pub fn apply_bonus(
        &mut self,
        intel_id: IntelId,
        assistants: &[String],
        rng: &mut impl Rng,
    ) -> Result<ResolutionOutcome, EngineError> {
        let player_roll = dice::roll_die(rng);
        self.apply_bonus_with_roll(intel_id, assistants, player_roll, rng)
    }

    fn apply_bonus_with_roll(
        &mut self,
        intel_id: IntelId,
        assistants: &[String],
        player_roll: u8,
        rng: &mut impl Rng,
    ) -> Result<ResolutionOutcome, EngineError> {
        self.require_phase(GamePhase::Event)?;
        if self.bonus_intel != Some(intel_id) {
            return Err(EngineError::NoBonusPending {
                submitted: intel_id,
            });
        }

        let (_, assist_numbers) = self.assemble_assistants(intel_id, assistants, rng)?;
        self.log.info(format!("You roll a {player_roll}"));

        let numbers = self
            .intel(intel_id)
            .map(|i| i.numbers().clone())
            .unwrap_or_default();
        let resolution = dice::resolve_with_dice(&numbers, player_roll, &assist_numbers);
        let name = self.intel_name(intel_id);

        self.processed.insert(intel_id);
        self.bonus_intel = None;
        self.advance_unfavorable_cursor();

        if resolution.is_hit() {
            let score = self.record_fever_score(intel_id, resolution.match_count);
            let multiplier = dice::multiplier_for_matches(resolution.match_count);
            self.log.success(format!(
                "Bonus on \"{name}\": {} matches, x{multiplier} for {score}",
                resolution.match_count
            ));
            Ok(ResolutionOutcome {
                success: true,
                player_roll,
                rolls: resolution.rolls,
                matched: resolution.matched,
                multiplier,
                score: Some(score),
                need_bonus: false,
                deducted: 0,
            })
        } else {
            self.settle_fever();
            self.log
                .fail(format!("Bonus on \"{name}\" missed -- streak over"));
            Ok(ResolutionOutcome::miss(player_roll, resolution.rolls))
        }
    }

    /// Play a favorable intel of the current topic, in any order.
    ///
    /// A hit scores into the Fever ledger and extends the streak; a
    /// miss ends it. Either way the intel is marked processed.
    pub fn play_favorable_intel(
        &mut self,
        intel_id: IntelId,
        assistants: &[String],
        rng: &mut impl Rng,
    ) -> Result<ResolutionOutcome, EngineError> {
        let player_roll = dice::roll_die(rng);
        self.play_favorable_with_roll(intel_id, assistants, player_roll, rng)
    }

    fn play_favorable_with_roll(
        &mut self,
        intel_id: IntelId,
        assistants: &[String],
        player_roll: u8,
        rng: &mut impl Rng,
    ) -> Result<ResolutionOutcome, EngineError> {
        self.require_phase(GamePhase::Event)?;
        if let Some(pending) = self.bonus_intel {
            return Err(EngineError::BonusPending { pending });
        }
        self.require_stage(EventStage::Favorable)?;
        self.require_playable(intel_id)?;

        let (_, assist_numbers) = self.assemble_assistants(intel_id, assistants, rng)?;
        self.log.info(format!("You roll a {player_roll}"));

        let numbers = self
            .intel(intel_id)
            .map(|i| i.numbers().clone())
            .unwrap_or_default();
        let resolution = dice::resolve_with_dice(&numbers, player_roll, &assist_numbers);
        let name = self.intel_name(intel_id);

        self.processed.insert(intel_id);
        self.advance_favorable_cursor();

        if resolution.is_hit() {
            let score = self.record_fever_score(intel_id, resolution.match_count);
            let multiplier = dice::multiplier_for_matches(resolution.match_count);
            self.log.success(format!(
                "Played \"{name}\": {} matches, x{multiplier} for {score}",
                resolution.match_count
            ));
            Ok(ResolutionOutcome {
                success: true,
                player_roll,
                rolls: resolution.rolls,
                matched: resolution.matched,
                multiplier,
                score: Some(score),
                need_bonus: false,
                deducted: 0,
            })
        } else {
            self.settle_fever();
            self.log
                .fail(format!("\"{name}\" fell flat -- streak over"));
            Ok(ResolutionOutcome::miss(player_roll, resolution.rolls))
        }
    }

    /// Skip a favorable intel: processed without a roll, no score, and
    /// no effect on the Fever streak.
    pub fn skip_favorable_intel(&mut self, intel_id: IntelId) -> Result<(), EngineError> {
        self.require_phase(GamePhase::Event)?;
        if let Some(pending) = self.bonus_intel {
            return Err(EngineError::BonusPending { pending });
        }
        self.require_stage(EventStage::Favorable)?;
        self.require_playable(intel_id)?;

        let name = self.intel_name(intel_id);
        self.processed.insert(intel_id);
        self.advance_favorable_cursor();
        self.log.info(format!("Skipped \"{name}\""));
        Ok(())
    }

    /// Skip every remaining favorable intel of the topic at once.
    /// Returns how many were skipped.
    pub fn skip_remaining_favorable(&mut self) -> Result<usize, EngineError> {
        self.require_phase(GamePhase::Event)?;
        if let Some(pending) = self.bonus_intel {
            return Err(EngineError::BonusPending { pending });
        }
        self.require_stage(EventStage::Favorable)?;

        let remaining: Vec<IntelId> = self
            .intels
            .iter()
            .filter(|i| {
                i.topic() == self.current_topic
                    && i.polarity() == IntelPolarity::Favorable
                    && !self.processed.contains(&i.id())
            })
            .map(Intel::id)
            .collect();
        let count = remaining.len();
        for id in remaining {
            let name = self.intel_name(id);
            self.processed.insert(id);
            self.log.info(format!("Skipped \"{name}\""));
        }
        self.favorable_cursor = self.original_favorable;
        self.stage = EventStage::Complete;
        Ok(count)
    }

    /// Close the topic: settle Fever, then either open the next topic
    /// or -- after the final one -- move to Result. Rejected, with the
    /// count, while any intel of the topic remains unresolved.
    pub fn next_topic(&mut self, rng: &mut impl Rng) -> Result<(), EngineError> {
        self.require_phase(GamePhase::Event)?;
        let remaining = self
            .intels
            .iter()
            .filter(|i| i.topic() == self.current_topic && !self.processed.contains(&i.id()))
            .count();
        if remaining > 0 {
            return Err(EngineError::UnresolvedIntelRemaining { count: remaining });
        }

        self.settle_fever();
        self.pending_shares.clear();

        if self.current_topic >= self.config.topic_count {
            self.phase = GamePhase::Result;
            let base_score: u64 = self
                .intels
                .iter()
                .filter(|i| self.processed.contains(&i.id()))
                .fold(0u64, |acc, i| acc.saturating_add(u64::from(i.score())));
            let result = FinalResult::compute(base_score, self.total_score);
            self.log.info(format!(
                "Final tally: base {base_score}, total {}",
                result.total_score
            ));
            self.final_result = Some(result);
        } else {
            self.current_topic = self.current_topic.saturating_add(1);
            self.open_topic(rng);
        }
        Ok(())
    }

    /// Throw everything away and return to Setup with a fresh pool.
    pub fn restart(&mut self, rng: &mut impl Rng) {
        *self = Self::new(self.config, rng);
        self.log.info("New run ready");
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn require_phase(&self, expected: GamePhase) -> Result<(), EngineError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(EngineError::PhaseMismatch {
                expected,
                actual: self.phase,
            })
        }
    }

    fn require_stage(&self, expected: EventStage) -> Result<(), EngineError> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(EngineError::StageMismatch {
                expected,
                actual: self.stage,
            })
        }
    }

    /// A playable favorable card: right topic, favorable by generation,
    /// not yet processed.
    fn require_playable(&self, intel_id: IntelId) -> Result<(), EngineError> {
        let intel = self
            .intel(intel_id)
            .ok_or(EngineError::UnknownIntel(intel_id))?;
        let playable = intel.topic() == self.current_topic
            && intel.polarity() == IntelPolarity::Favorable
            && !self.processed.contains(&intel_id);
        if playable {
            Ok(())
        } else {
            Err(EngineError::NotPlayable {
                submitted: intel_id,
            })
        }
    }

    fn require_collected(&self, intel_id: IntelId) -> Result<(), EngineError> {
        if self.intel(intel_id).is_none() {
            return Err(EngineError::UnknownIntel(intel_id));
        }
        if self.collected.contains(&intel_id) {
            Ok(())
        } else {
            Err(EngineError::IntelNotCollected(intel_id))
        }
    }

    fn spend_action_point(&mut self) -> Result<(), EngineError> {
        if self.action_points == 0 {
            return Err(EngineError::InsufficientActionPoints {
                required: 1,
                available: 0,
            });
        }
        self.action_points = self.action_points.saturating_sub(1);
        Ok(())
    }

    fn intel_name(&self, id: IntelId) -> String {
        self.intel(id).map(Intel::name).unwrap_or("").to_owned()
    }

    fn first_unprocessed(&self, polarity: IntelPolarity) -> Option<IntelId> {
        self.intels
            .iter()
            .find(|i| {
                i.topic() == self.current_topic
                    && i.polarity() == polarity
                    && !self.processed.contains(&i.id())
            })
            .map(Intel::id)
    }

    /// Reset the event sub-state for the current topic and roll fresh
    /// numbers for every participant.
    fn open_topic(&mut self, rng: &mut impl Rng) {
        self.bonus_intel = None;
        self.unfavorable_cursor = 0;
        self.favorable_cursor = 0;
        self.original_unfavorable = self.count_topic_polarity(IntelPolarity::Unfavorable);
        self.original_favorable = self.count_topic_polarity(IntelPolarity::Favorable);
        self.stage = if self.original_unfavorable > 0 {
            EventStage::Unfavorable
        } else if self.original_favorable > 0 {
            EventStage::Favorable
        } else {
            EventStage::Complete
        };

        let participants = self.participants.clone();
        for name in &participants {
            if let Some(npc) = self.npcs.iter_mut().find(|n| &n.name == name) {
                npc.refresh_number(rng);
                let number = npc.current_number.unwrap_or(0);
                self.log.info(format!("{name} rolls a {number}"));
            }
        }
        let topic = self.current_topic;
        self.log.info(format!("Topic {topic} begins"));
    }

    fn count_topic_polarity(&self, polarity: IntelPolarity) -> usize {
        self.intels
            .iter()
            .filter(|i| i.topic() == self.current_topic && i.polarity() == polarity)
            .count()
    }

    /// Validate the manual selection, union in every eligible NPC whose
    /// standing number already matches, and consume the selected
    /// numbers (each NPC re-rolls immediately).
    fn assemble_assistants(
        &mut self,
        intel_id: IntelId,
        manual: &[String],
        rng: &mut impl Rng,
    ) -> Result<(Vec<String>, Vec<u8>), EngineError> {
        let eligible = self.eligible_assistants(intel_id)?;
        for name in manual {
            if !self.npcs.iter().any(|n| &n.name == name) {
                return Err(EngineError::UnknownNpc(name.clone()));
            }
            if !eligible.contains(name) {
                return Err(EngineError::IneligibleAssistant { npc: name.clone() });
            }
        }

        let numbers = self
            .intel(intel_id)
            .map(|i| i.numbers().clone())
            .unwrap_or_default();

        let mut selected: BTreeSet<String> = manual.iter().cloned().collect();
        for name in &eligible {
            let auto = self
                .npcs
                .iter()
                .find(|n| &n.name == name)
                .and_then(|n| n.current_number)
                .is_some_and(|n| numbers.contains(&n));
            if auto {
                selected.insert(name.clone());
            }
        }

        let mut assistants = Vec::new();
        let mut assist_numbers = Vec::new();
        for name in &selected {
            if let Some(npc) = self.npcs.iter_mut().find(|n| &n.name == name) {
                if let Some(number) = npc.current_number {
                    assistants.push(npc.name.clone());
                    assist_numbers.push(number);
                    npc.refresh_number(rng);
                }
            }
        }
        for (name, number) in assistants.iter().zip(&assist_numbers) {
            self.log.info(format!("{name} assists with a {number}"));
        }
        Ok((assistants, assist_numbers))
    }

    /// Extend the streak and record a raw event score; returns the
    /// provisional (multiplied) figure shown to the player.
    fn record_fever_score(&mut self, intel_id: IntelId, match_count: usize) -> Decimal {
        let multiplier = dice::multiplier_for_matches(match_count);
        let raw = self
            .intel(intel_id)
            .map_or(0u64, |i| u64::from(i.score()).saturating_mul(u64::from(multiplier)));
        self.fever.enter();
        let provisional = Decimal::from(raw)
            .checked_mul(self.fever.multiplier())
            .unwrap_or(Decimal::ZERO);
        self.fever.record(raw);
        provisional
    }

    fn advance_unfavorable_cursor(&mut self) {
        self.unfavorable_cursor = self
            .unfavorable_cursor
            .saturating_add(1)
            .min(self.original_unfavorable);
        if self.unfavorable_cursor >= self.original_unfavorable {
            self.stage = if self.favorable_cursor >= self.original_favorable {
                EventStage::Complete
            } else {
                EventStage::Favorable
            };
        }
    }

    fn advance_favorable_cursor(&mut self) {
        self.favorable_cursor = self
            .favorable_cursor
            .saturating_add(1)
            .min(self.original_favorable);
        if self.favorable_cursor >= self.original_favorable {
            self.stage = EventStage::Complete;
        }
    }

    /// Fold a finished streak into the settled total.
    fn settle_fever(&mut self) {
        let base = self.fever.ledger_total();
        let multiplier = self.fever.multiplier();
        if let Some(settled) = self.fever.exit() {
            self.total_score = self
                .total_score
                .checked_add(settled)
                .unwrap_or(self.total_score);
            self.log
                .info(format!("Fever settles: {base} x{multiplier} = {settled}"));
        }
    }
}

/// Join die values for narration.
fn join_numbers(values: &[u8]) -> String {
    values
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
