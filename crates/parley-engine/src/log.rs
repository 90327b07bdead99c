//! Player-visible narration log.
//!
//! The engine narrates every outcome (collection results, die rolls,
//! resolutions, Fever settlements) as categorized entries the UI renders
//! verbatim. The log is observational only: nothing in the engine ever
//! reads it back. Timestamps and styling are presentation concerns and
//! are left to the consumer.
//!
//! Entries are mirrored to `tracing::debug!` for diagnostics.

use serde::{Deserialize, Serialize};

use parley_types::LogCategory;

/// One narration entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Whether this narrates a success, a failure, or neutral bookkeeping.
    pub category: LogCategory,
    /// Human-readable message.
    pub message: String,
}

/// Append-only narration channel for the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameLog {
    entries: Vec<LogEntry>,
}

impl GameLog {
    /// Create an empty log.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an entry.
    pub fn push(&mut self, category: LogCategory, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(?category, %message, "narration");
        self.entries.push(LogEntry { category, message });
    }

    /// Append a neutral entry.
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(LogCategory::Info, message);
    }

    /// Append a success entry.
    pub fn success(&mut self, message: impl Into<String>) {
        self.push(LogCategory::Success, message);
    }

    /// Append a failure entry.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.push(LogCategory::Fail, message);
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// The most recent entry, if any.
    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries (used by restart).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
