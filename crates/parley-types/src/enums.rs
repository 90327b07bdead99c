//! Enumeration types for the Parley negotiation minigame.
//!
//! Phases, difficulty selectors, intel polarity and classification,
//! narration categories, and the final rating.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

/// The run difficulty selected at game start.
///
/// Each difficulty maps to a [`DifficultyProfile`] that controls how much
/// intel each topic generates.
///
/// [`DifficultyProfile`]: crate::profile::DifficultyProfile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// One unfavorable intel per topic.
    Easy,
    /// Three unfavorable intel per topic.
    Hard,
}

impl core::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Easy => write!(f, "easy"),
            Self::Hard => write!(f, "hard"),
        }
    }
}

/// Error returned when a difficulty selector string is not recognized.
///
/// The two recognized values are `"easy"` and `"hard"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifficultyParseError {
    /// The rejected selector value.
    pub selector: String,
}

impl core::fmt::Display for DifficultyParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "unrecognized difficulty selector {:?} (expected \"easy\" or \"hard\")",
            self.selector
        )
    }
}

impl core::error::Error for DifficultyParseError {}

impl core::str::FromStr for Difficulty {
    type Err = DifficultyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Self::Easy),
            "hard" => Ok(Self::Hard),
            other => Err(DifficultyParseError {
                selector: String::from(other),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// GamePhase
// ---------------------------------------------------------------------------

/// The top-level run phase.
///
/// Phases advance strictly forward; the only loop is the topic cycle
/// inside [`Event`](Self::Event).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    /// Waiting for the player to pick a difficulty and start.
    Setup,
    /// Gathering intel from NPCs, spending action points.
    Collect,
    /// Strengthening collected intel and queueing shares.
    Process,
    /// The card-by-card negotiation across three topics.
    Event,
    /// The run is over; the final result is available.
    Result,
}

// ---------------------------------------------------------------------------
// EventStage
// ---------------------------------------------------------------------------

/// The sub-stage within one negotiation topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStage {
    /// Unfavorable intel are resolved one by one in cursor order.
    Unfavorable,
    /// Favorable intel are played in any order the player chooses.
    Favorable,
    /// Every intel in the topic has been handled; the topic can advance.
    Complete,
}

// ---------------------------------------------------------------------------
// IntelPolarity
// ---------------------------------------------------------------------------

/// Which side of the negotiation an intel was generated on.
///
/// The polarity is fixed at generation time and never changes; a
/// successfully resolved unfavorable intel is tracked through a separate
/// neutralization flag rather than a polarity flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntelPolarity {
    /// Intel that scores for the player when played.
    Favorable,
    /// Intel that must be resolved before it costs the player.
    Unfavorable,
}

// ---------------------------------------------------------------------------
// IntelClass
// ---------------------------------------------------------------------------

/// Informational classification of an intel, derived from its knowers.
///
/// Purely cosmetic -- gameplay never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntelClass {
    /// Exactly one NPC knows it.
    Secret,
    /// Common knowledge among the participants.
    Public,
    /// Widely known unfavorable intel circulating as hearsay.
    Rumor,
}

// ---------------------------------------------------------------------------
// LogCategory
// ---------------------------------------------------------------------------

/// Category of a narration entry emitted for the UI log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogCategory {
    /// Neutral narration (phase changes, rolls, bookkeeping).
    Info,
    /// A player action succeeded.
    Success,
    /// A player action failed or was rejected.
    Fail,
}

// ---------------------------------------------------------------------------
// Rating
// ---------------------------------------------------------------------------

/// Final run rating computed at the result screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    /// Base score below the first tier.
    Fail,
    /// Base score reached the first tier.
    Success,
    /// Base score reached the second tier.
    Perfect,
}
