//! Objective evaluation strategies for tutor.
//!
//! An [`ObjectiveEvaluator`] turns a [`Submission`] (a chat transcript or a
//! set of graded quiz answers) into a [`tutor_core::ProgressVector`], one
//! flag per learning objective of the active nested subtopic.
//!
//! Three interchangeable strategies exist:
//!
//! - [`KeywordEvaluator`] - deterministic pattern matching, no external call
//! - [`AnswerKeyEvaluator`] - rule-based comparison of structured answers
//! - [`LlmEvaluator`] - LLM-judged classification over a provider
//!
//! Every strategy is total: internal failure, a wrong submission kind, or
//! an unparsable judge response yields the all-`NotStarted` vector of the
//! expected length. A tutoring turn must still return its conversational
//! reply when scoring degrades, so evaluators fail closed, never loudly.
//!
//! Exactly one strategy is active per channel per topic path; selection is
//! a static [`EvaluatorRegistry`] lookup resolved at startup, never derived
//! from request-supplied path fragments or message content.

mod answers;
mod assignment;
mod keyword;
mod llm;
mod registry;
mod types;

pub use answers::{AnswerKeyEvaluator, AnswerSlot};
pub use assignment::{AnswerKey, GradeOutcome, SheetRow, grade_review_sheet, number_systems_key};
pub use keyword::{KeywordEvaluator, ObjectiveRule, TriggerPattern};
pub use llm::LlmEvaluator;
pub use registry::EvaluatorRegistry;
pub use types::{GradedAnswer, ObjectiveEvaluator, Submission};
