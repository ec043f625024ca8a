//! Ordered per-objective progress and the monotonic merge.

use serde::{Deserialize, Serialize};

use super::ObjectiveFlag;

/// Combined credit ratio at which a student is advised to try the quiz.
pub const QUIZ_READY_RATIO: f64 = 0.8;

/// An ordered sequence of [`ObjectiveFlag`]s, one per learning objective of
/// a (topic, subtopic, nested subtopic) path.
///
/// Position is the only correlation key between vectors from different
/// sources; vectors carry no objective identifiers on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressVector(pub Vec<ObjectiveFlag>);

/// Stored/incoming length mismatch observed during a merge.
///
/// This means the objective set changed between evaluations (schema drift).
/// The merge recovers by right-padding the shorter vector; the caller is
/// expected to log the drift at warn level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthDrift {
    pub stored: usize,
    pub incoming: usize,
}

/// Result of merging a stored vector with an incoming one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The merged, authoritative vector.
    pub vector: ProgressVector,
    /// Present when the two vectors disagreed on length.
    pub drift: Option<LengthDrift>,
}

impl ProgressVector {
    /// An all-`NotStarted` vector of the given length.
    #[must_use]
    pub fn not_started(len: usize) -> Self {
        Self(vec![ObjectiveFlag::NotStarted; len])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn flags(&self) -> &[ObjectiveFlag] {
        &self.0
    }

    /// Merge an incoming vector into this stored one.
    ///
    /// Per position the result is the flag with more credit, so progress is
    /// monotonic: no merge can move a slot down the order
    /// `NotStarted -> InProgress -> Complete`.
    ///
    /// An empty stored vector means "no prior record" and yields the
    /// incoming vector unchanged. A length mismatch between two non-empty
    /// vectors is schema drift: the shorter side is right-padded with
    /// `NotStarted` so positions stay aligned, and the drift is reported in
    /// the outcome rather than failing the request.
    #[must_use]
    pub fn merge(&self, incoming: &ProgressVector) -> MergeOutcome {
        if self.is_empty() {
            return MergeOutcome {
                vector: incoming.clone(),
                drift: None,
            };
        }

        let drift = (self.len() != incoming.len()).then_some(LengthDrift {
            stored: self.len(),
            incoming: incoming.len(),
        });

        let len = self.len().max(incoming.len());
        let slot = |v: &ProgressVector, i: usize| {
            v.0.get(i).copied().unwrap_or(ObjectiveFlag::NotStarted)
        };
        let vector = ProgressVector(
            (0..len)
                .map(|i| slot(self, i).merge(slot(incoming, i)))
                .collect(),
        );

        MergeOutcome { vector, drift }
    }

    /// Total credit as a ratio in `[0.0, 1.0]`. Empty vectors score 0.
    #[must_use]
    pub fn credit_ratio(&self) -> f64 {
        if self.0.is_empty() {
            return 0.0;
        }
        let total: f64 = self.0.iter().map(ObjectiveFlag::credit).sum();
        total / self.0.len() as f64
    }

    /// Reduce the vector to an integer percentage grade in `[0, 100]`.
    #[must_use]
    pub fn score(&self) -> u8 {
        (self.credit_ratio() * 100.0).round() as u8
    }

    /// Whether combined progress is far enough along to suggest the quiz.
    ///
    /// Pure derivation from the vector; emitting the advisory (and making it
    /// one-time) is the caller's job.
    #[must_use]
    pub fn is_quiz_ready(&self) -> bool {
        !self.is_empty() && self.credit_ratio() >= QUIZ_READY_RATIO
    }
}

impl From<Vec<ObjectiveFlag>> for ProgressVector {
    fn from(flags: Vec<ObjectiveFlag>) -> Self {
        Self(flags)
    }
}

impl FromIterator<ObjectiveFlag> for ProgressVector {
    fn from_iter<I: IntoIterator<Item = ObjectiveFlag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
