//! Static evaluator registry.
//!
//! Evaluators are registered once at startup against explicit topic paths.
//! Lookup never touches the filesystem and never derives anything from
//! request-supplied fragments; an unknown path simply has no evaluator.

use std::collections::HashMap;
use std::sync::Arc;

use tutor_core::{ObjectiveRegistry, TopicPath};
use tutor_models::ModelProvider;

use crate::{AnswerKeyEvaluator, KeywordEvaluator, LlmEvaluator, ObjectiveEvaluator};

/// Map from topic path to the active evaluation strategy, one per channel.
///
/// The chat channel judges transcripts; the quiz channel judges graded
/// answers. Exactly one strategy is active per path per channel.
#[derive(Default)]
pub struct EvaluatorRegistry {
    chat: HashMap<TopicPath, Arc<dyn ObjectiveEvaluator>>,
    quiz: HashMap<TopicPath, Arc<dyn ObjectiveEvaluator>>,
}

impl EvaluatorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the chat-channel strategy for a path.
    pub fn register_chat(&mut self, path: TopicPath, evaluator: Arc<dyn ObjectiveEvaluator>) {
        self.chat.insert(path, evaluator);
    }

    /// Register the quiz-channel strategy for a path.
    pub fn register_quiz(&mut self, path: TopicPath, evaluator: Arc<dyn ObjectiveEvaluator>) {
        self.quiz.insert(path, evaluator);
    }

    /// The chat-channel evaluator for a path, if any.
    #[must_use]
    pub fn chat(&self, path: &TopicPath) -> Option<Arc<dyn ObjectiveEvaluator>> {
        self.chat.get(path).cloned()
    }

    /// The quiz-channel evaluator for a path, if any.
    #[must_use]
    pub fn quiz(&self, path: &TopicPath) -> Option<Arc<dyn ObjectiveEvaluator>> {
        self.quiz.get(path).cloned()
    }

    /// Wire the built-in number-systems strategies: keyword matching for
    /// the binary page (it has hand-tuned trigger rules), the LLM judge for
    /// the remaining pages, and the answer key for every quiz.
    #[must_use]
    pub fn builtin_number_systems(
        objectives: &ObjectiveRegistry,
        provider: Arc<dyn ModelProvider>,
        judge_model: &str,
    ) -> Self {
        let mut registry = Self::new();

        for nested in ["binary", "octal", "hex", "bcd", "gray_code"] {
            let path = TopicPath::new("digital_electronics", "number_systems", nested);
            let Some(set) = objectives.lookup(&path) else {
                continue;
            };

            let chat: Arc<dyn ObjectiveEvaluator> = if nested == "binary" {
                Arc::new(KeywordEvaluator::number_systems_binary())
            } else {
                Arc::new(LlmEvaluator::new(
                    provider.clone(),
                    judge_model,
                    nested,
                    set.to_vec(),
                ))
            };
            registry.register_chat(path.clone(), chat);

            if nested == "binary" {
                registry.register_quiz(path, Arc::new(AnswerKeyEvaluator::number_systems_binary()));
            }
        }

        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tutor_core::ProgressVector;
    use tutor_models::{ChatRequest, ChatResponse, Result, Usage};

    use crate::Submission;

    struct NullProvider;

    #[async_trait]
    impl ModelProvider for NullProvider {
        fn name(&self) -> &str {
            "null"
        }

        async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse> {
            Ok(ChatResponse {
                content: "[]".to_string(),
                usage: Usage::default(),
            })
        }
    }

    struct FixedEvaluator(usize);

    #[async_trait]
    impl crate::ObjectiveEvaluator for FixedEvaluator {
        fn objective_count(&self) -> usize {
            self.0
        }

        async fn evaluate(&self, _submission: &Submission) -> ProgressVector {
            ProgressVector::not_started(self.0)
        }
    }

    #[test]
    fn lookup_misses_unregistered_paths() {
        let registry = EvaluatorRegistry::new();
        let path = TopicPath::new("a", "b", "c");
        assert!(registry.chat(&path).is_none());
        assert!(registry.quiz(&path).is_none());
    }

    #[test]
    fn channels_are_independent() {
        let mut registry = EvaluatorRegistry::new();
        let path = TopicPath::new("a", "b", "c");
        registry.register_chat(path.clone(), Arc::new(FixedEvaluator(3)));

        assert!(registry.chat(&path).is_some());
        assert!(registry.quiz(&path).is_none());
    }

    #[test]
    fn builtin_covers_all_number_systems_chat_paths() {
        let objectives = ObjectiveRegistry::builtin();
        let registry = EvaluatorRegistry::builtin_number_systems(
            &objectives,
            Arc::new(NullProvider),
            "gpt-4o",
        );

        for nested in ["binary", "octal", "hex", "bcd", "gray_code"] {
            let path = TopicPath::new("digital_electronics", "number_systems", nested);
            let evaluator = registry.chat(&path).expect(nested);
            assert_eq!(evaluator.objective_count(), 6);
        }

        let binary = TopicPath::new("digital_electronics", "number_systems", "binary");
        assert!(registry.quiz(&binary).is_some());
    }
}
