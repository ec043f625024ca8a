//! Evaluator contract and submission types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tutor_core::ProgressVector;
use tutor_models::Message;

/// One graded quiz answer: the question kind plus the student/expected
/// answer pair, as produced by the quiz front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradedAnswer {
    /// Question-type tag (e.g. "dec_to_bin").
    #[serde(rename = "type")]
    pub kind: String,
    /// What the student answered.
    pub student_answer: String,
    /// The expected answer.
    pub correct_answer: String,
}

impl GradedAnswer {
    /// Whether the student answer matches after case/whitespace
    /// normalization.
    #[must_use]
    pub fn is_correct(&self) -> bool {
        normalize(&self.student_answer) == normalize(&self.correct_answer)
    }
}

fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

/// What an evaluator is asked to judge.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// A chat transcript, oldest turn first, including the latest
    /// user/assistant exchange.
    Transcript(Vec<Message>),
    /// Graded quiz answers.
    Answers(Vec<GradedAnswer>),
}

/// Pluggable strategy producing one flag per learning objective.
///
/// Implementations must be total: a submission of the wrong kind or any
/// internal failure yields `ProgressVector::not_started(objective_count())`
/// rather than an error. Only the LLM strategy actually suspends; the
/// others are pure and deterministic.
#[async_trait]
pub trait ObjectiveEvaluator: Send + Sync {
    /// Number of objectives this evaluator reports on.
    fn objective_count(&self) -> usize;

    /// Evaluate a submission into an ordered flag vector of
    /// [`objective_count`](Self::objective_count) length.
    async fn evaluate(&self, submission: &Submission) -> ProgressVector;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graded_answer_normalizes_case_and_whitespace() {
        let answer = GradedAnswer {
            kind: "dec_to_hex".to_string(),
            student_answer: " 1f ".to_string(),
            correct_answer: "1F".to_string(),
        };
        assert!(answer.is_correct());

        let bcd = GradedAnswer {
            kind: "dec_to_bcd".to_string(),
            student_answer: "0010  0101".to_string(),
            correct_answer: "0010 0101".to_string(),
        };
        assert!(bcd.is_correct());
    }

    #[test]
    fn graded_answer_deserializes_wire_shape() {
        let json = r#"{"type": "bin_to_dec", "student_answer": "10", "correct_answer": "10"}"#;
        let answer: GradedAnswer = serde_json::from_str(json).unwrap();
        assert_eq!(answer.kind, "bin_to_dec");
        assert!(answer.is_correct());
    }
}
