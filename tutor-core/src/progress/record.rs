//! Per-student progress documents and the update applied on each submission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::objectives::TopicPath;

use super::{LengthDrift, ProgressVector};

/// Identity of a progress document: one per student per nested subtopic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgressKey {
    pub student_id: String,
    #[serde(flatten)]
    pub path: TopicPath,
}

impl ProgressKey {
    pub fn new(student_id: impl Into<String>, path: TopicPath) -> Self {
        Self {
            student_id: student_id.into(),
            path,
        }
    }
}

/// Stored progress for one (student, topic, subtopic, nested subtopic).
///
/// The quiz and AI channels track progress independently; the combined
/// vector is their max-merge and is the authoritative view returned to
/// clients. The topic grade is the best score across the three assessment
/// channels, on the grounds that a student gets credit for whichever
/// channel demonstrates mastery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    #[serde(flatten)]
    pub key: ProgressKey,

    /// Progress derived from graded quiz answers.
    pub quiz_progress: ProgressVector,
    /// Progress derived from chat evaluation.
    pub ai_progress: ProgressVector,
    /// Max-merge of the two channels; the authoritative view.
    pub objective_progress: ProgressVector,

    pub quiz_score: u8,
    pub ai_score: u8,
    pub assignment_score: u8,
    /// Best of the three channel scores.
    pub topic_grade: u8,

    pub updated_at: DateTime<Utc>,
}

/// A partial update with set-semantics: absent fields leave the stored
/// value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_progress: Option<ProgressVector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_progress: Option<ProgressVector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_score: Option<u8>,
}

impl ProgressUpdate {
    /// Update carrying freshly evaluated chat progress.
    #[must_use]
    pub fn ai(vector: ProgressVector) -> Self {
        Self {
            ai_progress: Some(vector),
            ..Self::default()
        }
    }

    /// Update carrying freshly evaluated quiz progress.
    #[must_use]
    pub fn quiz(vector: ProgressVector) -> Self {
        Self {
            quiz_progress: Some(vector),
            ..Self::default()
        }
    }

    /// Update carrying a graded assignment score.
    #[must_use]
    pub fn assignment(score: u8) -> Self {
        Self {
            assignment_score: Some(score),
            ..Self::default()
        }
    }
}

impl ProgressRecord {
    /// A fresh record with empty vectors and zero scores.
    #[must_use]
    pub fn new(key: ProgressKey) -> Self {
        Self {
            key,
            quiz_progress: ProgressVector::default(),
            ai_progress: ProgressVector::default(),
            objective_progress: ProgressVector::default(),
            quiz_score: 0,
            ai_score: 0,
            assignment_score: 0,
            topic_grade: 0,
            updated_at: Utc::now(),
        }
    }

    /// Apply an update: merge updated channels monotonically, recombine,
    /// rescore, and bump the timestamp.
    ///
    /// When a channel vector is updated without an explicit score, the
    /// channel score is recomputed from the merged vector. Returned drifts
    /// are length mismatches observed during the merges; callers log them.
    pub fn apply(&mut self, update: ProgressUpdate) -> Vec<LengthDrift> {
        let mut drifts = Vec::new();

        if let Some(incoming) = update.ai_progress {
            let outcome = self.ai_progress.merge(&incoming);
            drifts.extend(outcome.drift);
            self.ai_progress = outcome.vector;
            self.ai_score = update.ai_score.unwrap_or_else(|| self.ai_progress.score());
        } else if let Some(score) = update.ai_score {
            self.ai_score = score;
        }

        if let Some(incoming) = update.quiz_progress {
            let outcome = self.quiz_progress.merge(&incoming);
            drifts.extend(outcome.drift);
            self.quiz_progress = outcome.vector;
            self.quiz_score = update
                .quiz_score
                .unwrap_or_else(|| self.quiz_progress.score());
        } else if let Some(score) = update.quiz_score {
            self.quiz_score = score;
        }

        if let Some(score) = update.assignment_score {
            self.assignment_score = score;
        }

        let combined = self.quiz_progress.merge(&self.ai_progress);
        drifts.extend(combined.drift);
        self.objective_progress = combined.vector;

        self.topic_grade = self
            .quiz_score
            .max(self.ai_score)
            .max(self.assignment_score);
        self.updated_at = Utc::now();

        drifts
    }

    /// Zero all scores and progress, keeping the record (and vector
    /// lengths) in place.
    pub fn reset(&mut self) {
        self.quiz_progress = ProgressVector::not_started(self.quiz_progress.len());
        self.ai_progress = ProgressVector::not_started(self.ai_progress.len());
        self.objective_progress = ProgressVector::not_started(self.objective_progress.len());
        self.quiz_score = 0;
        self.ai_score = 0;
        self.assignment_score = 0;
        self.topic_grade = 0;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ObjectiveFlag::{Complete, InProgress, NotStarted};

    fn key() -> ProgressKey {
        ProgressKey::new(
            "s-1",
            TopicPath::new("digital_electronics", "number_systems", "binary"),
        )
    }

    #[test]
    fn first_update_is_identity_merge() {
        let mut record = ProgressRecord::new(key());
        let incoming = ProgressVector(vec![Complete, NotStarted]);

        let drifts = record.apply(ProgressUpdate::ai(incoming.clone()));

        assert!(drifts.is_empty());
        assert_eq!(record.ai_progress, incoming);
        assert_eq!(record.objective_progress, incoming);
        assert_eq!(record.ai_score, 50);
        assert_eq!(record.topic_grade, 50);
    }

    #[test]
    fn channels_combine_by_max_merge() {
        let mut record = ProgressRecord::new(key());
        record.apply(ProgressUpdate::quiz(ProgressVector(vec![
            Complete, NotStarted, NotStarted,
        ])));
        record.apply(ProgressUpdate::ai(ProgressVector(vec![
            NotStarted, InProgress, Complete,
        ])));

        assert_eq!(
            record.objective_progress,
            ProgressVector(vec![Complete, InProgress, Complete])
        );
    }

    #[test]
    fn progress_never_regresses_across_updates() {
        let mut record = ProgressRecord::new(key());
        record.apply(ProgressUpdate::ai(ProgressVector(vec![
            Complete, InProgress,
        ])));
        record.apply(ProgressUpdate::ai(ProgressVector(vec![
            NotStarted, NotStarted,
        ])));

        assert_eq!(
            record.ai_progress,
            ProgressVector(vec![Complete, InProgress])
        );
    }

    #[test]
    fn topic_grade_is_best_channel() {
        let mut record = ProgressRecord::new(key());
        record.apply(ProgressUpdate {
            quiz_score: Some(40),
            ..Default::default()
        });
        record.apply(ProgressUpdate::assignment(90));

        assert_eq!(record.topic_grade, 90);
        assert_eq!(record.quiz_score, 40);
    }

    #[test]
    fn explicit_score_overrides_derived_one() {
        let mut record = ProgressRecord::new(key());
        record.apply(ProgressUpdate {
            quiz_progress: Some(ProgressVector(vec![Complete, Complete])),
            quiz_score: Some(75),
            ..Default::default()
        });

        assert_eq!(record.quiz_score, 75);
    }

    #[test]
    fn drift_between_channels_is_reported() {
        let mut record = ProgressRecord::new(key());
        record.apply(ProgressUpdate::quiz(ProgressVector(vec![Complete])));
        let drifts = record.apply(ProgressUpdate::ai(ProgressVector(vec![
            NotStarted, InProgress,
        ])));

        assert!(!drifts.is_empty());
        assert_eq!(record.objective_progress.len(), 2);
    }

    #[test]
    fn reset_zeroes_but_keeps_shape() {
        let mut record = ProgressRecord::new(key());
        record.apply(ProgressUpdate::ai(ProgressVector(vec![
            Complete, Complete,
        ])));
        record.apply(ProgressUpdate::assignment(80));

        record.reset();

        assert_eq!(record.ai_progress, ProgressVector::not_started(2));
        assert_eq!(record.objective_progress.len(), 2);
        assert_eq!(record.topic_grade, 0);
        assert_eq!(record.assignment_score, 0);
    }
}
