//! Game-state engine for the Parley negotiation minigame.
//!
//! One [`Game`] value owns a whole run: intel generation and
//! distribution, the action-point economy, the phase machine
//! (setup, collect, process, event, result), dice resolution with
//! NPC-assisted bonuses, the Fever streak multiplier, and the final
//! tally. The engine is passive and synchronous -- a front end calls
//! commands, pulls view snapshots, and renders the narration log;
//! no game logic lives outside this crate.
//!
//! # Modules
//!
//! - [`config`] -- Tunable run parameters ([`GameConfig`])
//! - [`dice`] -- Die rolls, the shared match-counting primitive, and
//!   the multiplier table
//! - [`engine`] -- The [`Game`] context and every player command
//! - [`error`] -- Typed rejections ([`EngineError`])
//! - [`fever`] -- The streak multiplier and its settlement ledger
//! - [`generator`] -- Per-topic intel generation and distribution
//! - [`intel`] -- The intel entity
//! - [`log`] -- Player-visible narration ([`GameLog`])
//! - [`npc`] -- The NPC entity and candidate pool
//! - [`view`] -- Read-only snapshots for the UI

pub mod config;
pub mod dice;
pub mod engine;
pub mod error;
pub mod fever;
pub mod generator;
pub mod intel;
pub mod log;
pub mod npc;
pub mod view;

// Re-export primary types at crate root for convenience.
pub use config::GameConfig;
pub use dice::{DIE_FACES, DiceResolution, multiplier_for_matches, resolve_with_dice, roll_die};
pub use engine::{CollectOutcome, Game, ProcessOutcome, ResolutionOutcome};
pub use error::EngineError;
pub use fever::FeverState;
pub use generator::{distribute_intels_to_npcs, generate_topic_intels};
pub use intel::{FAILURE_DEDUCTION, Intel, PREMIUM_SCORE, STANDARD_SCORE};
pub use log::{GameLog, LogEntry};
pub use npc::{
    COLLECT_RATE_STEP, MAX_BASE_RATE, MAX_COLLECT_RATE, Npc, candidate_pool, draw_participants,
};
pub use view::{
    CardKind, CurrentCard, FinalResult, IntelView, NpcView, ScoreBreakdown, rating_for,
};
