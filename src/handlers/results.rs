// src/handlers/results.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::result::{Grade, RecordResultRequest, TestResult},
    store::{ResultStore, TestStore},
    utils::jwt::Claims,
};

/// Records the result of a (test, student) pair on submission.
///
/// Students always record under their own identity; staff may record on a
/// student's behalf. The grade is derived here, never trusted from the
/// caller, and recording completes the test.
pub async fn record_result(
    State(results): State<ResultStore>,
    State(tests): State<TestStore>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<RecordResultRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let student_id = if claims.role == "student" {
        claims.sub.clone()
    } else {
        payload
            .student_id
            .clone()
            .ok_or(AppError::BadRequest("student_id is required".to_string()))?
    };

    if !tests.exists(payload.test_id).await {
        return Err(AppError::NotFound("Test not found".to_string()));
    }

    let result = results
        .record(TestResult {
            test_id: payload.test_id,
            student_id,
            score: payload.score,
            max_score: payload.max_score,
            rank: payload.rank,
            total_students: payload.total_students,
            grade: Grade::from_scores(payload.score, payload.max_score),
            correct: payload.correct,
            wrong: payload.wrong,
            unattempted: payload.unattempted,
            subject_scores: payload.subject_scores,
            recorded_at: chrono::Utc::now(),
        })
        .await?;

    tests.mark_completed(payload.test_id).await;

    Ok((StatusCode::CREATED, Json(result)))
}

/// All results for one test.
pub async fn list_test_results(
    State(results): State<ResultStore>,
    State(tests): State<TestStore>,
    Path(test_id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if !tests.exists(test_id).await {
        return Err(AppError::NotFound("Test not found".to_string()));
    }
    Ok(Json(results.list_by_test(test_id).await))
}

/// Aggregate over one test's results: count, average, highest, lowest.
pub async fn test_summary(
    State(results): State<ResultStore>,
    State(tests): State<TestStore>,
    Path(test_id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if !tests.exists(test_id).await {
        return Err(AppError::NotFound("Test not found".to_string()));
    }
    Ok(Json(results.summary(test_id).await))
}

/// All results for one student, across tests.
pub async fn list_student_results(
    State(results): State<ResultStore>,
    Path(student_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(results.list_by_student(&student_id).await))
}
