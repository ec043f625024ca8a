//! Tri-state completion flag for a single learning objective.

use serde::{Deserialize, Serialize};

/// Completion status of one learning objective.
///
/// The variants are declared in credit order, so the derived `Ord` is the
/// credit order: `NotStarted < InProgress < Complete`. Merging two flags is
/// `max` under this order, which means recorded progress can only move up.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveFlag {
    /// No evidence of progress yet.
    #[default]
    NotStarted,
    /// Partial evidence; worth half credit.
    InProgress,
    /// Objective demonstrated; full credit.
    Complete,
}

impl ObjectiveFlag {
    /// Credit awarded toward the objective grade.
    #[must_use]
    pub fn credit(&self) -> f64 {
        match self {
            Self::NotStarted => 0.0,
            Self::InProgress => 0.5,
            Self::Complete => 1.0,
        }
    }

    /// Combine two flags, keeping whichever carries more credit.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        self.max(other)
    }

    /// Convert to the canonical string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Complete => "complete",
        }
    }

    /// Parse a flag from the loose token forms seen on the wire.
    ///
    /// LLM judges and older clients emit booleans and ad-hoc labels
    /// (`true`, `"partial"`, `"progress"`) instead of the canonical names,
    /// so parsing is deliberately lenient. Unknown tokens are `None`.
    #[must_use]
    pub fn parse_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "complete" | "completed" | "true" | "1" => Some(Self::Complete),
            "in_progress" | "partial" | "progress" => Some(Self::InProgress),
            "not_started" | "false" | "0" => Some(Self::NotStarted),
            _ => None,
        }
    }
}
