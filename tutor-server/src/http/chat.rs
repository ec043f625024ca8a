//! Tutoring chat endpoint.
//!
//! One round trip does the whole loop: roster gate, provider reply,
//! transcript evaluation, monotonic progress upsert, and the one-time
//! quiz-readiness advisory. Provider failures degrade to a canned reply
//! with HTTP 200; only store failures surface as 5xx.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use tutor_core::{ProgressKey, ProgressRecord, ProgressUpdate, TopicPath};
use tutor_evals::Submission;
use tutor_models::{ChatRequest, Message};

use crate::AppState;
use crate::http::{error_response, store_error};

const CHAT_TEMPERATURE: f32 = 0.7;

const DEGRADED_REPLY: &str = "Sorry, I'm having trouble responding right now. \
     Your progress is saved; please try again in a moment.";

/// Chat request body: explicit topic coordinates plus the transcript so
/// far, newest user message last.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatBody {
    pub student_id: String,
    pub topic_id: String,
    pub subtopic_id: String,
    pub nested_subtopic_id: String,
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    /// True when the provider failed and the reply is canned.
    pub degraded: bool,
    pub progress: Option<ProgressRecord>,
    /// One-time advisory: combined progress just crossed the readiness
    /// threshold, suggest the quiz.
    pub ready_prompt: bool,
}

/// POST /api/chat
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatBody>,
) -> impl IntoResponse {
    let path = TopicPath::new(&body.topic_id, &body.subtopic_id, &body.nested_subtopic_id);
    let key = ProgressKey::new(&body.student_id, path.clone());

    // Roster gate: an enrolled-but-disallowed student is refused; an
    // unknown id is let through (enrollment is optional for tutoring).
    match state.students.get(&body.student_id).await {
        Ok(Some(student)) if !student.allowed => {
            return error_response(
                StatusCode::FORBIDDEN,
                "NOT_ALLOWED",
                "student is not allowed to use the tutor",
            );
        }
        Ok(_) => {}
        Err(e) => return store_error(&e),
    }

    let request = ChatRequest::new(&state.chat_model, with_system_prompt(&state, &path, &body))
        .temperature(CHAT_TEMPERATURE);

    let reply = match state.provider.chat(request).await {
        Ok(response) => response.content,
        Err(e) => {
            warn!(student = %body.student_id, path = %path, error = %e, "provider failed, degrading");
            return Json(ChatReply {
                reply: DEGRADED_REPLY.to_string(),
                degraded: true,
                progress: None,
                ready_prompt: false,
            })
            .into_response();
        }
    };

    let Some(evaluator) = state.evaluators.chat(&path) else {
        debug!(path = %path, "no chat evaluator for path");
        return Json(ChatReply {
            reply,
            degraded: false,
            progress: None,
            ready_prompt: false,
        })
        .into_response();
    };

    let mut transcript = body.messages.clone();
    transcript.push(Message::assistant(reply.clone()));
    let vector = evaluator.evaluate(&Submission::Transcript(transcript)).await;

    let was_ready = match state.progress.get(&key).await {
        Ok(prior) => prior.is_some_and(|r| r.objective_progress.is_quiz_ready()),
        Err(e) => return store_error(&e),
    };

    let record = match state.progress.upsert(&key, ProgressUpdate::ai(vector)).await {
        Ok(record) => record,
        Err(e) => return store_error(&e),
    };

    let ready_prompt = !was_ready && record.objective_progress.is_quiz_ready();
    debug!(
        student = %body.student_id,
        path = %path,
        ai_score = record.ai_score,
        ready_prompt,
        "chat turn evaluated"
    );

    Json(ChatReply {
        reply,
        degraded: false,
        progress: Some(record),
        ready_prompt,
    })
    .into_response()
}

fn with_system_prompt(state: &AppState, path: &TopicPath, body: &ChatBody) -> Vec<Message> {
    let mut prompt = state.prompts.system_prompt(path).to_string();
    if let Some(objectives) = state.objectives.lookup(path) {
        prompt.push_str("\n\nLearning objectives for this session:\n");
        for (i, objective) in objectives.iter().enumerate() {
            prompt.push_str(&format!("{}. {objective}\n", i + 1));
        }
    }

    let mut messages = Vec::with_capacity(body.messages.len() + 1);
    messages.push(Message::system(prompt));
    messages.extend(body.messages.iter().cloned());
    messages
}
