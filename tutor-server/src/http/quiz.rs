//! Quiz generation and submission endpoints.

use std::sync::Arc;

use axum::{Json, extract::{Query, State}, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::debug;
use tutor_core::{ProgressKey, ProgressRecord, ProgressUpdate, TopicPath};
use tutor_evals::{GradedAnswer, Submission};

use crate::AppState;
use crate::http::{error_response, store_error};
use crate::quizgen::{self, QuizQuestion};

#[derive(Debug, Deserialize)]
pub struct QuizQuery {
    pub topic_id: String,
    pub subtopic_id: String,
    pub nested_subtopic_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuizResponse {
    pub questions: Vec<QuizQuestion>,
}

/// GET /api/quiz
pub async fn get_quiz(Query(query): Query<QuizQuery>) -> impl IntoResponse {
    let path = TopicPath::new(query.topic_id, query.subtopic_id, query.nested_subtopic_id);
    match quizgen::generate(&path, &mut rand::thread_rng()) {
        Some(questions) => Json(QuizResponse { questions }).into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("no quiz for {path}"),
        ),
    }
}

/// Graded answers submitted by the quiz front-end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSubmission {
    pub student_id: String,
    pub topic_id: String,
    pub subtopic_id: String,
    pub nested_subtopic_id: String,
    pub answers: Vec<GradedAnswer>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub score: u8,
    pub progress: ProgressRecord,
}

/// POST /api/quiz/submit
pub async fn submit_quiz(
    State(state): State<Arc<AppState>>,
    Json(body): Json<QuizSubmission>,
) -> impl IntoResponse {
    if body.answers.is_empty() {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "EMPTY_SUBMISSION",
            "a quiz submission needs at least one answer",
        );
    }

    let path = TopicPath::new(&body.topic_id, &body.subtopic_id, &body.nested_subtopic_id);
    let key = ProgressKey::new(&body.student_id, path.clone());

    let correct = body.answers.iter().filter(|a| a.is_correct()).count();
    let score = ((correct as f64 / body.answers.len() as f64) * 100.0).round() as u8;

    let quiz_progress = match state.evaluators.quiz(&path) {
        Some(evaluator) => Some(
            evaluator
                .evaluate(&Submission::Answers(body.answers.clone()))
                .await,
        ),
        None => None,
    };

    let update = ProgressUpdate {
        quiz_progress,
        quiz_score: Some(score),
        ..ProgressUpdate::default()
    };

    match state.progress.upsert(&key, update).await {
        Ok(progress) => {
            debug!(student = %body.student_id, path = %path, score, "quiz submitted");
            Json(SubmitResponse { score, progress }).into_response()
        }
        Err(e) => store_error(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::test_support;

    fn answer(kind: &str, student: &str, correct: &str) -> GradedAnswer {
        GradedAnswer {
            kind: kind.to_string(),
            student_answer: student.to_string(),
            correct_answer: correct.to_string(),
        }
    }

    fn submission(answers: Vec<GradedAnswer>) -> QuizSubmission {
        QuizSubmission {
            student_id: "s-1".to_string(),
            topic_id: "digital_electronics".to_string(),
            subtopic_id: "number_systems".to_string(),
            nested_subtopic_id: "binary".to_string(),
            answers,
        }
    }

    #[tokio::test]
    async fn quiz_is_generated_for_known_paths() {
        let (server, _state) = test_support::server();
        let response = server
            .get("/api/quiz")
            .add_query_param("topic_id", "digital_electronics")
            .add_query_param("subtopic_id", "number_systems")
            .add_query_param("nested_subtopic_id", "binary")
            .await;
        response.assert_status_ok();

        let quiz: QuizResponse = response.json();
        assert!(quiz.questions.len() >= 6);
    }

    #[tokio::test]
    async fn unknown_quiz_path_is_404() {
        let (server, _state) = test_support::server();
        let response = server
            .get("/api/quiz")
            .add_query_param("topic_id", "digital_electronics")
            .add_query_param("subtopic_id", "number_systems")
            .add_query_param("nested_subtopic_id", "ternary")
            .await;
        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn submission_scores_and_updates_the_quiz_channel() {
        let (server, _state) = test_support::server();

        let body = submission(vec![
            answer("definition", "0 and 1", "0 and 1"),
            answer("dec_to_bin", "1101", "1101"),
            answer("dec_to_bin", "1001", "1001"),
            answer("bin_to_dec", "12", "13"), // wrong
        ]);

        let response = server.post("/api/quiz/submit").json(&body).await;
        response.assert_status_ok();

        let result: SubmitResponse = response.json();
        assert_eq!(result.score, 75);
        assert_eq!(result.progress.quiz_score, 75);
        // definition and dec_to_bin objectives complete, four remaining open.
        assert_eq!(result.progress.quiz_progress.score(), 33);
    }

    #[tokio::test]
    async fn resubmission_never_lowers_the_stored_vector() {
        let (server, _state) = test_support::server();

        let good = submission(vec![
            answer("definition", "0 and 1", "0 and 1"),
            answer("dec_to_bin", "1101", "1101"),
            answer("dec_to_bin", "1001", "1001"),
        ]);
        let first: SubmitResponse = server.post("/api/quiz/submit").json(&good).await.json();
        assert_eq!(first.progress.quiz_progress.score(), 33);

        let bad = submission(vec![answer("definition", "letters", "0 and 1")]);
        let second: SubmitResponse = server.post("/api/quiz/submit").json(&bad).await.json();

        // The quiz score reflects the latest attempt; the vector keeps
        // every objective already demonstrated.
        assert_eq!(second.score, 0);
        assert_eq!(second.progress.quiz_progress.score(), 33);
    }

    #[tokio::test]
    async fn empty_submission_is_rejected() {
        let (server, _state) = test_support::server();
        let response = server.post("/api/quiz/submit").json(&submission(vec![])).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}
