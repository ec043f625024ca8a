//! Keyword/regex evaluation strategy.
//!
//! Deterministic and offline: scans the lowercased, concatenated transcript
//! text for per-objective trigger patterns and counts hits against a
//! minimum-hit threshold.

use async_trait::async_trait;
use regex::Regex;
use tutor_core::{ObjectiveFlag, ProgressVector};
use tutor_models::Role;

use crate::{ObjectiveEvaluator, Submission};

/// A trigger that counts as one hit toward an objective.
#[derive(Debug, Clone)]
pub enum TriggerPattern {
    /// Case-insensitive literal substring (stored lowercased).
    Literal(String),
    /// Regular expression, matched against the lowercased text.
    Regex(Regex),
}

impl TriggerPattern {
    /// Literal substring trigger.
    #[must_use]
    pub fn literal(s: impl Into<String>) -> Self {
        Self::Literal(s.into().to_lowercase())
    }

    /// Regex trigger; fails on an invalid pattern at construction time,
    /// never at request time.
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::Regex(Regex::new(pattern)?))
    }

    fn matches(&self, text: &str) -> bool {
        match self {
            Self::Literal(lit) => text.contains(lit),
            Self::Regex(re) => re.is_match(text),
        }
    }
}

/// Trigger patterns and hit threshold for one objective slot.
#[derive(Debug, Clone)]
pub struct ObjectiveRule {
    pub patterns: Vec<TriggerPattern>,
    /// Minimum number of matched patterns for `Complete`.
    pub threshold: usize,
}

impl ObjectiveRule {
    /// Rule built from literal triggers.
    #[must_use]
    pub fn literals(patterns: &[&str], threshold: usize) -> Self {
        Self {
            patterns: patterns
                .iter()
                .map(|p| TriggerPattern::literal(*p))
                .collect(),
            threshold: threshold.max(1),
        }
    }

    fn evaluate(&self, text: &str) -> ObjectiveFlag {
        let hits = self.patterns.iter().filter(|p| p.matches(text)).count();
        if hits >= self.threshold {
            ObjectiveFlag::Complete
        } else if hits > 0 {
            ObjectiveFlag::InProgress
        } else {
            ObjectiveFlag::NotStarted
        }
    }
}

/// Keyword/regex strategy: one [`ObjectiveRule`] per objective slot.
#[derive(Debug, Clone)]
pub struct KeywordEvaluator {
    rules: Vec<ObjectiveRule>,
}

impl KeywordEvaluator {
    #[must_use]
    pub fn new(rules: Vec<ObjectiveRule>) -> Self {
        Self { rules }
    }

    /// Rules for the built-in binary number-systems objective set.
    #[must_use]
    pub fn number_systems_binary() -> Self {
        let regex = |p| TriggerPattern::regex(p).expect("static pattern");
        Self::new(vec![
            ObjectiveRule::literals(&["base-2", "base 2", "only 0 and 1", "zeros and ones"], 1),
            ObjectiveRule::literals(&["decimal to binary", "in binary is", "8-bit", "4-bit"], 2),
            ObjectiveRule::literals(&["binary to decimal", "back to decimal", "equals in decimal"], 1),
            ObjectiveRule::literals(&["lsb", "msb", "least significant", "most significant"], 2),
            ObjectiveRule::literals(&["nibble", "byte", "4 bits", "8 bits"], 2),
            ObjectiveRule {
                patterns: vec![
                    TriggerPattern::literal("place value"),
                    TriggerPattern::literal("powers of 2"),
                    regex(r"2\^\d"),
                ],
                threshold: 1,
            },
        ])
    }

    fn transcript_text(transcript: &[tutor_models::Message]) -> String {
        transcript
            .iter()
            .filter(|m| matches!(m.role, Role::User | Role::Assistant))
            .map(|m| m.content.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl ObjectiveEvaluator for KeywordEvaluator {
    fn objective_count(&self) -> usize {
        self.rules.len()
    }

    async fn evaluate(&self, submission: &Submission) -> ProgressVector {
        let Submission::Transcript(transcript) = submission else {
            return ProgressVector::not_started(self.rules.len());
        };

        let text = Self::transcript_text(transcript);
        self.rules.iter().map(|rule| rule.evaluate(&text)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_models::Message;
    use ObjectiveFlag::{Complete, InProgress, NotStarted};

    fn transcript(lines: &[&str]) -> Submission {
        Submission::Transcript(lines.iter().map(|l| Message::user(*l)).collect())
    }

    #[test]
    fn rule_thresholds_produce_tri_state() {
        let rule = ObjectiveRule::literals(&["lsb", "msb"], 2);

        assert_eq!(rule.evaluate("the lsb and msb differ"), Complete);
        assert_eq!(rule.evaluate("the lsb is the rightmost bit"), InProgress);
        assert_eq!(rule.evaluate("nothing relevant"), NotStarted);
    }

    #[tokio::test]
    async fn evaluates_each_objective_independently() {
        let evaluator = KeywordEvaluator::new(vec![
            ObjectiveRule::literals(&["binary to decimal"], 1),
            ObjectiveRule::literals(&["gray code"], 1),
        ]);

        let flags = evaluator
            .evaluate(&transcript(&["I converted Binary to Decimal today"]))
            .await;

        assert_eq!(flags.flags(), &[Complete, NotStarted]);
    }

    #[tokio::test]
    async fn matching_is_case_insensitive() {
        let evaluator = KeywordEvaluator::new(vec![ObjectiveRule::literals(&["NIBBLE"], 1)]);
        let flags = evaluator.evaluate(&transcript(&["a nibble is 4 bits"])).await;
        assert_eq!(flags.flags(), &[Complete]);
    }

    #[tokio::test]
    async fn regex_patterns_match_lowercased_text() {
        let evaluator = KeywordEvaluator::new(vec![ObjectiveRule {
            patterns: vec![TriggerPattern::regex(r"2\^\d").unwrap()],
            threshold: 1,
        }]);
        let flags = evaluator
            .evaluate(&transcript(&["128 is 2^7 in place value terms"]))
            .await;
        assert_eq!(flags.flags(), &[Complete]);
    }

    #[tokio::test]
    async fn wrong_submission_kind_fails_closed() {
        let evaluator = KeywordEvaluator::number_systems_binary();
        let flags = evaluator.evaluate(&Submission::Answers(vec![])).await;

        assert_eq!(flags, ProgressVector::not_started(6));
    }

    #[tokio::test]
    async fn system_messages_are_ignored() {
        let evaluator = KeywordEvaluator::new(vec![ObjectiveRule::literals(&["nibble"], 1)]);
        let flags = evaluator
            .evaluate(&Submission::Transcript(vec![Message::system(
                "mention nibble in your teaching",
            )]))
            .await;
        assert_eq!(flags.flags(), &[NotStarted]);
    }
}
