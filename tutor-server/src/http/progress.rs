//! Progress REST endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tutor_core::{ProgressKey, ProgressRecord, ProgressUpdate, TopicPath};

use crate::AppState;
use crate::http::{error_response, store_error};

/// Key coordinates shared by the query and body forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressKeyBody {
    pub student_id: String,
    pub topic_id: String,
    pub subtopic_id: String,
    pub nested_subtopic_id: String,
}

impl From<ProgressKeyBody> for ProgressKey {
    fn from(b: ProgressKeyBody) -> Self {
        ProgressKey::new(
            b.student_id,
            TopicPath::new(b.topic_id, b.subtopic_id, b.nested_subtopic_id),
        )
    }
}

/// GET /api/progress
pub async fn get_progress(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProgressKeyBody>,
) -> impl IntoResponse {
    let key: ProgressKey = query.into();
    match state.progress.get(&key).await {
        Ok(Some(record)) => Json(record).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("no progress for {} at {}", key.student_id, key.path),
        ),
        Err(e) => store_error(&e),
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressListResponse {
    pub records: Vec<ProgressRecord>,
}

/// GET /api/progress/:student_id
pub async fn list_progress(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<String>,
) -> impl IntoResponse {
    match state.progress.list_for_student(&student_id).await {
        Ok(records) => Json(ProgressListResponse { records }).into_response(),
        Err(e) => store_error(&e),
    }
}

/// Explicit save body: key coordinates plus per-channel set-semantics
/// fields. Absent fields leave the stored values untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveProgressBody {
    #[serde(flatten)]
    pub key: ProgressKeyBody,
    #[serde(flatten)]
    pub update: ProgressUpdate,
}

/// POST /api/progress
pub async fn save_progress(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SaveProgressBody>,
) -> impl IntoResponse {
    let key: ProgressKey = body.key.into();
    match state.progress.upsert(&key, body.update).await {
        Ok(record) => Json(record).into_response(),
        Err(e) => store_error(&e),
    }
}

/// POST /api/progress/reset
pub async fn reset_progress(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ProgressKeyBody>,
) -> impl IntoResponse {
    let key: ProgressKey = body.into();
    match state.progress.reset(&key).await {
        Ok(Some(record)) => Json(record).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("no progress for {} at {}", key.student_id, key.path),
        ),
        Err(e) => store_error(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::test_support;
    use serde_json::json;
    use tutor_core::ObjectiveFlag::{Complete, NotStarted};

    fn key_json(student_id: &str) -> serde_json::Value {
        json!({
            "student_id": student_id,
            "topic_id": "digital_electronics",
            "subtopic_id": "number_systems",
            "nested_subtopic_id": "binary",
        })
    }

    #[tokio::test]
    async fn get_progress_is_404_before_any_save() {
        let (server, _state) = test_support::server();
        let response = server
            .get("/api/progress")
            .add_query_param("student_id", "s-1")
            .add_query_param("topic_id", "digital_electronics")
            .add_query_param("subtopic_id", "number_systems")
            .add_query_param("nested_subtopic_id", "binary")
            .await;
        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn save_then_get_round_trips() {
        let (server, _state) = test_support::server();

        let mut body = key_json("s-1");
        body["quiz_progress"] = json!(["complete", "not_started"]);
        let saved: ProgressRecord = server.post("/api/progress").json(&body).await.json();
        assert_eq!(saved.quiz_score, 50);
        assert_eq!(saved.objective_progress.flags(), &[Complete, NotStarted]);

        let fetched: ProgressRecord = server
            .get("/api/progress")
            .add_query_param("student_id", "s-1")
            .add_query_param("topic_id", "digital_electronics")
            .add_query_param("subtopic_id", "number_systems")
            .add_query_param("nested_subtopic_id", "binary")
            .await
            .json();
        assert_eq!(fetched, saved);
    }

    #[tokio::test]
    async fn saves_merge_monotonically() {
        let (server, _state) = test_support::server();

        let mut first = key_json("s-1");
        first["ai_progress"] = json!(["complete", "in_progress"]);
        server.post("/api/progress").json(&first).await.assert_status_ok();

        let mut second = key_json("s-1");
        second["ai_progress"] = json!(["not_started", "not_started"]);
        let record: ProgressRecord = server.post("/api/progress").json(&second).await.json();

        assert_eq!(record.ai_score, 75);
    }

    #[tokio::test]
    async fn list_returns_all_records_for_a_student() {
        let (server, _state) = test_support::server();

        for nested in ["binary", "octal"] {
            let mut body = key_json("s-1");
            body["nested_subtopic_id"] = json!(nested);
            body["quiz_score"] = json!(40);
            server.post("/api/progress").json(&body).await.assert_status_ok();
        }

        let listed: ProgressListResponse = server.get("/api/progress/s-1").await.json();
        assert_eq!(listed.records.len(), 2);

        let other: ProgressListResponse = server.get("/api/progress/s-2").await.json();
        assert!(other.records.is_empty());
    }

    #[tokio::test]
    async fn reset_zeroes_scores_but_keeps_the_record() {
        let (server, _state) = test_support::server();

        let mut body = key_json("s-1");
        body["quiz_progress"] = json!(["complete", "complete"]);
        server.post("/api/progress").json(&body).await.assert_status_ok();

        let reset: ProgressRecord = server
            .post("/api/progress/reset")
            .json(&key_json("s-1"))
            .await
            .json();
        assert_eq!(reset.quiz_score, 0);
        assert_eq!(reset.topic_grade, 0);
        assert_eq!(reset.objective_progress.len(), 2);

        let missing = server
            .post("/api/progress/reset")
            .json(&key_json("s-9"))
            .await;
        missing.assert_status_not_found();
    }
}
