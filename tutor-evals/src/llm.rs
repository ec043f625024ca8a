//! LLM-judged evaluation strategy.
//!
//! Sends the objective descriptions plus the chat transcript to a model
//! provider with a fixed evaluation instruction at zero temperature, then
//! parses the array-like answer into a progress vector. The judge's output
//! is untrusted: token forms, quoting, and fencing are normalized before
//! parsing, and anything that still fails - transport errors, timeouts,
//! unparsable text, a wrong-length array - degrades to an all-`NotStarted`
//! vector of the objective count.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;
use tutor_core::{ObjectiveFlag, ProgressVector};
use tutor_models::{ChatRequest, Message, ModelProvider, Role};

use crate::{ObjectiveEvaluator, Submission};

const MAX_JUDGE_TOKENS: u32 = 200;

/// LLM-judged strategy.
pub struct LlmEvaluator {
    provider: Arc<dyn ModelProvider>,
    model: String,
    topic_label: String,
    objectives: Vec<String>,
}

impl LlmEvaluator {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        model: impl Into<String>,
        topic_label: impl Into<String>,
        objectives: Vec<String>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            topic_label: topic_label.into(),
            objectives,
        }
    }

    fn build_prompt(&self, transcript: &[Message]) -> String {
        let objectives = self
            .objectives
            .iter()
            .enumerate()
            .map(|(i, obj)| format!("{}. {obj}", i + 1))
            .collect::<Vec<_>>()
            .join("\n");
        let history = transcript
            .iter()
            .filter(|m| matches!(m.role, Role::User | Role::Assistant))
            .map(|m| format!("{}: {}", m.role.as_str(), m.content))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "You are an AI tutor evaluating a student's understanding of the \
             following objectives for the topic '{}':\n{objectives}\n\n\
             Based on the full chat history below, return an array with one \
             entry per objective using true, false, or \"partial\".\n\
             Respond ONLY with the array. Do not include any explanation.\n\n\
             Chat History:\n{history}",
            self.topic_label
        )
    }

    fn fail_closed(&self, reason: &str) -> ProgressVector {
        warn!(
            topic = %self.topic_label,
            reason,
            "LLM evaluation degraded to not_started"
        );
        ProgressVector::not_started(self.objectives.len())
    }
}

#[async_trait]
impl ObjectiveEvaluator for LlmEvaluator {
    fn objective_count(&self) -> usize {
        self.objectives.len()
    }

    async fn evaluate(&self, submission: &Submission) -> ProgressVector {
        let Submission::Transcript(transcript) = submission else {
            return self.fail_closed("submission was not a transcript");
        };

        let request = ChatRequest::new(
            &self.model,
            vec![Message::system(self.build_prompt(transcript))],
        )
        .temperature(0.0)
        .max_tokens(MAX_JUDGE_TOKENS);

        let raw = match self.provider.chat(request).await {
            Ok(response) => response.content,
            Err(e) => return self.fail_closed(&e.to_string()),
        };

        match parse_flag_array(&raw, self.objectives.len()) {
            Some(vector) => vector,
            None => self.fail_closed("unparsable or wrong-length judge response"),
        }
    }
}

/// Parse an array-like judge response into a vector of the expected length.
///
/// Accepts bracketed, comma-separated tokens with any mix of smart quotes,
/// straight quotes, and code fencing. Returns `None` on any token the flag
/// parser does not recognize or on a length mismatch.
fn parse_flag_array(raw: &str, expected_len: usize) -> Option<ProgressVector> {
    let cleaned: String = raw
        .chars()
        .map(|c| match c {
            '\u{201c}' | '\u{201d}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            _ => c,
        })
        .collect();

    // Code fences and prose around the array are common; keep the span
    // from the first '[' to the last ']'.
    let start = cleaned.find('[')?;
    let end = cleaned.rfind(']')?;
    if end <= start {
        return None;
    }
    let inner = &cleaned[start + 1..end];

    let flags: Vec<ObjectiveFlag> = inner
        .split(',')
        .map(|token| {
            let token = token.trim().trim_matches(['"', '\'']);
            ObjectiveFlag::parse_token(token)
        })
        .collect::<Option<_>>()?;

    (flags.len() == expected_len).then(|| ProgressVector(flags))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_models::{ChatResponse, Result, Usage};
    use ObjectiveFlag::{Complete, InProgress, NotStarted};

    /// Provider returning a canned response (or error) for judge tests.
    struct ScriptedProvider {
        reply: std::result::Result<String, ()>,
    }

    impl ScriptedProvider {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self { reply: Err(()) })
        }
    }

    #[async_trait]
    impl ModelProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse> {
            match &self.reply {
                Ok(content) => Ok(ChatResponse {
                    content: content.clone(),
                    usage: Usage::default(),
                }),
                Err(()) => Err(tutor_models::Error::Timeout),
            }
        }
    }

    fn evaluator(provider: Arc<dyn ModelProvider>) -> LlmEvaluator {
        LlmEvaluator::new(
            provider,
            "gpt-4o",
            "binary",
            vec![
                "Convert decimal to binary.".to_string(),
                "Convert binary to decimal.".to_string(),
                "Explain place value.".to_string(),
            ],
        )
    }

    fn transcript() -> Submission {
        Submission::Transcript(vec![
            Message::user("1101 is 13 in decimal"),
            Message::assistant("Correct!"),
        ])
    }

    #[tokio::test]
    async fn parses_boolean_and_partial_tokens() {
        let evaluator = evaluator(ScriptedProvider::replying("[true, false, \"partial\"]"));
        let flags = evaluator.evaluate(&transcript()).await;
        assert_eq!(flags.flags(), &[Complete, NotStarted, InProgress]);
    }

    #[tokio::test]
    async fn normalizes_smart_quotes_and_fencing() {
        let raw = "```json\n[\u{201c}partial\u{201d}, true, \u{2018}false\u{2019}]\n```";
        let evaluator = evaluator(ScriptedProvider::replying(raw));
        let flags = evaluator.evaluate(&transcript()).await;
        assert_eq!(flags.flags(), &[InProgress, Complete, NotStarted]);
    }

    #[tokio::test]
    async fn wrong_length_fails_closed() {
        let evaluator = evaluator(ScriptedProvider::replying("[true, true]"));
        let flags = evaluator.evaluate(&transcript()).await;
        assert_eq!(flags, ProgressVector::not_started(3));
    }

    #[tokio::test]
    async fn unparsable_response_fails_closed() {
        let evaluator = evaluator(ScriptedProvider::replying(
            "The student clearly understands binary!",
        ));
        let flags = evaluator.evaluate(&transcript()).await;
        assert_eq!(flags, ProgressVector::not_started(3));
    }

    #[tokio::test]
    async fn provider_error_fails_closed() {
        let evaluator = evaluator(ScriptedProvider::failing());
        let flags = evaluator.evaluate(&transcript()).await;
        assert_eq!(flags, ProgressVector::not_started(3));
    }

    #[tokio::test]
    async fn answers_submission_fails_closed() {
        let evaluator = evaluator(ScriptedProvider::replying("[true, true, true]"));
        let flags = evaluator.evaluate(&Submission::Answers(vec![])).await;
        assert_eq!(flags, ProgressVector::not_started(3));
    }

    #[test]
    fn parse_flag_array_handles_unknown_tokens() {
        assert!(parse_flag_array("[true, maybe]", 2).is_none());
        assert!(parse_flag_array("no array here", 1).is_none());
        assert!(parse_flag_array("]true[", 1).is_none());
    }
}
