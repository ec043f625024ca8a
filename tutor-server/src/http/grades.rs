//! Assignment upload and grading endpoint.
//!
//! Accepts a multipart form with the student id and an xlsx review sheet,
//! decodes the first worksheet, grades it against the answer key for the
//! (topic, subtopic), records the grade, and merges the assignment score
//! into every progress record the student has under that subtopic.

use std::io::Cursor;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use calamine::{Data, Reader, Xlsx};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use tutor_core::{AssignmentGrade, ProgressUpdate};
use tutor_evals::{AnswerKey, SheetRow, grade_review_sheet, number_systems_key};

use crate::AppState;
use crate::http::{error_response, store_error};

#[derive(Debug, Serialize, Deserialize)]
pub struct GradeResponse {
    pub score: u8,
    pub feedback: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GradeListResponse {
    pub grades: Vec<AssignmentGrade>,
}

/// GET /api/grades/:student_id
pub async fn list_grades(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<String>,
) -> impl IntoResponse {
    match state.grades.list_for_student(&student_id).await {
        Ok(grades) => Json(GradeListResponse { grades }).into_response(),
        Err(e) => store_error(&e),
    }
}

/// POST /api/grade/:topic_id/:subtopic_id
pub async fn grade_assignment(
    State(state): State<Arc<AppState>>,
    Path((topic_id, subtopic_id)): Path<(String, String)>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let Some(key) = answer_key(&topic_id, &subtopic_id) else {
        return error_response(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("no answer key for {topic_id}/{subtopic_id}"),
        );
    };

    let mut student_id: Option<String> = None;
    let mut file: Option<Vec<u8>> = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => match field.name().map(str::to_string).as_deref() {
                Some("student_id") => match field.text().await {
                    Ok(text) => student_id = Some(text),
                    Err(e) => {
                        return error_response(
                            StatusCode::UNPROCESSABLE_ENTITY,
                            "BAD_UPLOAD",
                            e.to_string(),
                        );
                    }
                },
                Some("file") => match field.bytes().await {
                    Ok(bytes) => file = Some(bytes.to_vec()),
                    Err(e) => {
                        return error_response(
                            StatusCode::UNPROCESSABLE_ENTITY,
                            "BAD_UPLOAD",
                            e.to_string(),
                        );
                    }
                },
                _ => {}
            },
            Ok(None) => break,
            Err(e) => {
                return error_response(StatusCode::UNPROCESSABLE_ENTITY, "BAD_UPLOAD", e.to_string());
            }
        }
    }

    let Some(student_id) = student_id else {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "MISSING_FIELD",
            "multipart field 'student_id' is required",
        );
    };
    let Some(file) = file else {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "MISSING_FIELD",
            "multipart field 'file' is required",
        );
    };

    let rows = match decode_sheet(&file) {
        Ok(rows) => rows,
        Err(e) => {
            warn!(student = %student_id, error = %e, "rejecting unreadable review sheet");
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, "BAD_SPREADSHEET", e);
        }
    };

    let outcome = grade_review_sheet(&rows, &key);
    debug!(student = %student_id, score = outcome.score, "review sheet graded");

    let grade = AssignmentGrade {
        student_id: student_id.clone(),
        topic_id: topic_id.clone(),
        subtopic_id: subtopic_id.clone(),
        score: outcome.score,
        feedback: outcome.feedback.clone(),
        graded_at: Utc::now(),
    };
    if let Err(e) = state.grades.record(grade).await {
        return store_error(&e);
    }

    // The sheet spans the whole subtopic, so the score feeds every nested
    // record the student already has under it.
    let records = match state.progress.list_for_student(&student_id).await {
        Ok(records) => records,
        Err(e) => return store_error(&e),
    };
    for record in records
        .into_iter()
        .filter(|r| r.key.path.topic_id == topic_id && r.key.path.subtopic_id == subtopic_id)
    {
        if let Err(e) = state
            .progress
            .upsert(&record.key, ProgressUpdate::assignment(outcome.score))
            .await
        {
            return store_error(&e);
        }
    }

    Json(GradeResponse {
        score: outcome.score,
        feedback: outcome.feedback,
    })
    .into_response()
}

fn answer_key(topic_id: &str, subtopic_id: &str) -> Option<AnswerKey> {
    match (topic_id, subtopic_id) {
        ("digital_electronics", "number_systems") => Some(number_systems_key()),
        _ => None,
    }
}

/// Decode the first worksheet into label + cells rows.
fn decode_sheet(bytes: &[u8]) -> Result<Vec<SheetRow>, String> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes.to_vec())).map_err(|e| e.to_string())?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| "workbook has no worksheets".to_string())?
        .map_err(|e| e.to_string())?;

    let rows = range
        .rows()
        .filter_map(|row| {
            let (label, rest) = row.split_first()?;
            let label = cell_text(label);
            if label.is_empty() {
                return None;
            }
            Some(SheetRow {
                label,
                cells: rest.iter().map(cell_text).collect(),
            })
        })
        .collect();

    Ok(rows)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}
