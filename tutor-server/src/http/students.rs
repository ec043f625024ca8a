//! Roster administration endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tutor_core::{NewStudent, Student};

use crate::AppState;
use crate::http::{error_response, store_error};

#[derive(Debug, Serialize, Deserialize)]
pub struct StudentListResponse {
    pub students: Vec<Student>,
}

/// GET /api/students
pub async fn list_students(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.students.list().await {
        Ok(students) => Json(StudentListResponse { students }).into_response(),
        Err(e) => store_error(&e),
    }
}

/// POST /api/students
pub async fn create_student(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewStudent>,
) -> impl IntoResponse {
    if body.name.trim().is_empty() || body.email.trim().is_empty() {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "MISSING_FIELD",
            "name and email are required",
        );
    }

    match state.students.create(body.into_student()).await {
        Ok(student) => (StatusCode::CREATED, Json(student)).into_response(),
        Err(e) if e.is_conflict() => {
            error_response(StatusCode::CONFLICT, "DUPLICATE", e.to_string())
        }
        Err(e) => store_error(&e),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStudentBody {
    pub allowed: bool,
}

/// PUT /api/students/:user_id
pub async fn update_student(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(body): Json<UpdateStudentBody>,
) -> impl IntoResponse {
    match state.students.set_allowed(&user_id, body.allowed).await {
        Ok(true) => match state.students.get(&user_id).await {
            Ok(Some(student)) => Json(student).into_response(),
            Ok(None) => error_response(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("unknown student: {user_id}"),
            ),
            Err(e) => store_error(&e),
        },
        Ok(false) => error_response(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("unknown student: {user_id}"),
        ),
        Err(e) => store_error(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::test_support;
    use serde_json::json;

    #[tokio::test]
    async fn enrollment_starts_disallowed_and_admin_flips_the_flag() {
        let (server, _state) = test_support::server();

        let created = server
            .post("/api/students")
            .json(&json!({"name": "Ada", "email": "ada@example.edu"}))
            .await;
        created.assert_status(StatusCode::CREATED);
        let student: Student = created.json();
        assert!(!student.allowed);

        let updated: Student = server
            .put(&format!("/api/students/{}", student.user_id))
            .json(&json!({"allowed": true}))
            .await
            .json();
        assert!(updated.allowed);

        let listed: StudentListResponse = server.get("/api/students").await.json();
        assert_eq!(listed.students.len(), 1);
        assert!(listed.students[0].allowed);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let (server, _state) = test_support::server();
        let body = json!({"name": "Ada", "email": "ada@example.edu"});

        server.post("/api/students").json(&body).await.assert_status(StatusCode::CREATED);
        let second = server.post("/api/students").json(&body).await;
        second.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn updating_an_unknown_student_is_404() {
        let (server, _state) = test_support::server();
        let response = server
            .put("/api/students/nobody")
            .json(&json!({"allowed": true}))
            .await;
        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn blank_enrollment_fields_are_rejected() {
        let (server, _state) = test_support::server();
        let response = server
            .post("/api/students")
            .json(&json!({"name": "", "email": "ada@example.edu"}))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}
