//! Shared type definitions for the Parley negotiation minigame.
//!
//! This crate is the single source of truth for the types shared between
//! the game engine and any front-end collaborator (terminal, web view,
//! test harness). It holds no game logic.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for entity identifiers
//! - [`enums`] -- Enumeration types (difficulty, phases, polarity, ratings)
//! - [`profile`] -- Difficulty profiles controlling intel generation

pub mod enums;
pub mod ids;
pub mod profile;

// Re-export all public types at crate root for convenience.
pub use enums::{
    Difficulty, DifficultyParseError, EventStage, GamePhase, IntelClass, IntelPolarity,
    LogCategory, Rating,
};
pub use ids::IntelId;
pub use profile::DifficultyProfile;
