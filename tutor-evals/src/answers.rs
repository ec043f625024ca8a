//! Structured-answer evaluation strategy.
//!
//! Counts exact (normalized) matches per objective; an objective is
//! `Complete` once its minimum success count is reached. This strategy
//! awards no partial credit.

use std::collections::HashMap;

use async_trait::async_trait;
use tutor_core::{ObjectiveFlag, ProgressVector};

use crate::{ObjectiveEvaluator, Submission};

/// Success requirements for one objective slot.
#[derive(Debug, Clone)]
pub struct AnswerSlot {
    /// Question kinds that feed this objective.
    pub kinds: Vec<String>,
    /// Correct answers needed for `Complete`.
    pub required: usize,
}

impl AnswerSlot {
    #[must_use]
    pub fn new(kinds: &[&str], required: usize) -> Self {
        Self {
            kinds: kinds.iter().map(|k| (*k).to_string()).collect(),
            required: required.max(1),
        }
    }
}

/// Rule-based strategy over graded answer records.
#[derive(Debug, Clone)]
pub struct AnswerKeyEvaluator {
    slots: Vec<AnswerSlot>,
}

impl AnswerKeyEvaluator {
    #[must_use]
    pub fn new(slots: Vec<AnswerSlot>) -> Self {
        Self { slots }
    }

    /// Slots for the built-in binary number-systems objective set. The
    /// quiz asks conversion and definition questions; getting enough of a
    /// kind right demonstrates the matching objective.
    #[must_use]
    pub fn number_systems_binary() -> Self {
        Self::new(vec![
            AnswerSlot::new(&["definition"], 1),
            AnswerSlot::new(&["dec_to_bin"], 2),
            AnswerSlot::new(&["bin_to_dec"], 2),
            AnswerSlot::new(&["lsb_msb"], 1),
            AnswerSlot::new(&["bit_groups"], 1),
            AnswerSlot::new(&["place_value"], 1),
        ])
    }
}

#[async_trait]
impl ObjectiveEvaluator for AnswerKeyEvaluator {
    fn objective_count(&self) -> usize {
        self.slots.len()
    }

    async fn evaluate(&self, submission: &Submission) -> ProgressVector {
        let Submission::Answers(answers) = submission else {
            return ProgressVector::not_started(self.slots.len());
        };

        let mut successes: HashMap<&str, usize> = HashMap::new();
        for answer in answers {
            if answer.is_correct() {
                *successes.entry(answer.kind.as_str()).or_default() += 1;
            }
        }

        self.slots
            .iter()
            .map(|slot| {
                let total: usize = slot
                    .kinds
                    .iter()
                    .filter_map(|k| successes.get(k.as_str()))
                    .sum();
                if total >= slot.required {
                    ObjectiveFlag::Complete
                } else {
                    ObjectiveFlag::NotStarted
                }
            })
            .collect()
    }
}
