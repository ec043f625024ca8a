//! HTTP server module

mod api;
mod chat;
mod grades;
mod progress;
mod quiz;
mod students;

use std::sync::Arc;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::AppState;

pub use api::HealthResponse;
pub use chat::{ChatBody, ChatReply};
pub use grades::{GradeListResponse, GradeResponse};
pub use progress::{ProgressKeyBody, ProgressListResponse, SaveProgressBody};
pub use quiz::{QuizResponse, QuizSubmission, SubmitResponse};
pub use students::{StudentListResponse, UpdateStudentBody};

/// JSON error body shared by all handlers.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

pub(crate) fn error_response(
    status: StatusCode,
    code: &str,
    error: impl Into<String>,
) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.to_string(),
        }),
    )
        .into_response()
}

pub(crate) fn store_error(e: &tutor_core::store::Error) -> Response {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR", e.to_string())
}

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(api::health))
        .route("/api/chat", post(chat::chat))
        .route("/api/progress", get(progress::get_progress).post(progress::save_progress))
        .route("/api/progress/reset", post(progress::reset_progress))
        .route("/api/progress/:student_id", get(progress::list_progress))
        .route("/api/quiz", get(quiz::get_quiz))
        .route("/api/quiz/submit", post(quiz::submit_quiz))
        .route("/api/grade/:topic_id/:subtopic_id", post(grades::grade_assignment))
        .route("/api/grades/:student_id", get(grades::list_grades))
        .route(
            "/api/students",
            get(students::list_students).post(students::create_student),
        )
        .route("/api/students/:user_id", put(students::update_student))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum_test::TestServer;
    use tutor_models::{ChatRequest, ChatResponse, Error, ModelProvider, Result, Usage};

    use crate::AppState;

    /// Provider returning a fixed tutoring reply, or a timeout.
    pub struct ScriptedProvider {
        reply: Option<String>,
    }

    impl ScriptedProvider {
        pub fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(reply.to_string()),
            })
        }

        pub fn failing() -> Arc<Self> {
            Arc::new(Self { reply: None })
        }
    }

    #[async_trait]
    impl ModelProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse> {
            match &self.reply {
                Some(content) => Ok(ChatResponse {
                    content: content.clone(),
                    usage: Usage::default(),
                }),
                None => Err(Error::Timeout),
            }
        }
    }

    pub fn server_with_provider(provider: Arc<dyn ModelProvider>) -> (TestServer, Arc<AppState>) {
        let state = Arc::new(AppState::in_memory(provider, "gpt-4o"));
        let server = TestServer::new(super::create_router(state.clone())).unwrap();
        (server, state)
    }

    pub fn server() -> (TestServer, Arc<AppState>) {
        server_with_provider(ScriptedProvider::replying("Let's keep practicing."))
    }
}
