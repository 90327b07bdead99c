//! Error types for the parley-engine crate.
//!
//! Every constraint violation is a typed rejection: the operation returns
//! an error and leaves the run state untouched. Nothing in the engine
//! panics in normal operation, and probability-driven outcomes are never
//! modeled as errors -- only invalid requests are.

use parley_types::{EventStage, GamePhase, IntelId};

/// Errors that can occur when a game operation is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The action costs more action points than remain.
    #[error("not enough action points: need {required}, have {available}")]
    InsufficientActionPoints {
        /// Points the action would cost.
        required: u32,
        /// Points currently available.
        available: u32,
    },

    /// The referenced intel id is not part of this run's roster.
    #[error("unknown intel: {0}")]
    UnknownIntel(IntelId),

    /// The referenced NPC name is not in the candidate pool.
    #[error("unknown npc: {0}")]
    UnknownNpc(String),

    /// The intel exists but the player has not collected it yet.
    #[error("intel {0} has not been collected")]
    IntelNotCollected(IntelId),

    /// The operation is not legal in the current phase.
    #[error("operation requires the {expected:?} phase (currently {actual:?})")]
    PhaseMismatch {
        /// Phase the operation requires.
        expected: GamePhase,
        /// Phase the run is actually in.
        actual: GamePhase,
    },

    /// The operation is not legal in the current event stage.
    #[error("operation requires the {expected:?} stage (currently {actual:?})")]
    StageMismatch {
        /// Stage the operation requires.
        expected: EventStage,
        /// Stage the topic is actually in.
        actual: EventStage,
    },

    /// The submitted intel is not the card the cursor points at.
    #[error("intel {submitted} is not the current card")]
    CardMismatch {
        /// The intel the caller tried to act on.
        submitted: IntelId,
    },

    /// A bonus roll is still pending and must be taken first.
    #[error("a bonus roll is still pending for intel {pending}")]
    BonusPending {
        /// The intel whose bonus roll is outstanding.
        pending: IntelId,
    },

    /// A bonus roll was requested but none is pending for that intel.
    #[error("no bonus roll is pending for intel {submitted}")]
    NoBonusPending {
        /// The intel the caller tried to bonus-roll.
        submitted: IntelId,
    },

    /// The submitted intel is not an unresolved favorable card.
    #[error("intel {submitted} is not an unresolved favorable card in this topic")]
    NotPlayable {
        /// The intel the caller tried to play or skip.
        submitted: IntelId,
    },

    /// An explicitly selected NPC cannot legally assist with this intel.
    #[error("{npc} cannot assist with this intel")]
    IneligibleAssistant {
        /// The rejected NPC name.
        npc: String,
    },

    /// The NPC already knows the intel, so sharing it is pointless.
    #[error("{npc} already knows this intel")]
    AlreadyKnows {
        /// The NPC name.
        npc: String,
    },

    /// The NPC is already queued in the pending-share ledger.
    #[error("{npc} is already queued to be told this intel")]
    AlreadyPending {
        /// The NPC name.
        npc: String,
    },

    /// Tried to unqueue an NPC that was never queued.
    #[error("{npc} is not queued to be told this intel")]
    NotPending {
        /// The NPC name.
        npc: String,
    },

    /// Tried to advance the topic while intel remain unresolved.
    #[error("{count} intel in this topic are still unresolved")]
    UnresolvedIntelRemaining {
        /// How many intel still need resolving or skipping.
        count: usize,
    },
}
