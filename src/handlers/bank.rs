// src/handlers/bank.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    error::AppError,
    models::question::{
        CreateQuestionRequest, Difficulty, FlagRequest, Subject, UpdateQuestionRequest,
    },
    store::QuestionBank,
};

/// Query parameters for the eligibility listing.
#[derive(Debug, Deserialize)]
pub struct BankListParams {
    pub subject: Option<String>,
    pub difficulty: Option<String>,
}

fn parse_filter<T>(raw: Option<String>) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr<Err = String>,
{
    raw.map(|s| s.parse::<T>().map_err(AppError::BadRequest))
        .transpose()
}

/// Lists eligible (unflagged) questions, optionally filtered by subject and
/// difficulty, in insertion order.
pub async fn list_questions(
    State(bank): State<QuestionBank>,
    Query(params): Query<BankListParams>,
) -> Result<impl IntoResponse, AppError> {
    let subject = parse_filter::<Subject>(params.subject)?;
    let difficulty = parse_filter::<Difficulty>(params.difficulty)?;
    Ok(Json(bank.query_eligible(subject, difficulty).await))
}

/// Lists flagged questions with their reasons, for curation.
pub async fn list_flagged(State(bank): State<QuestionBank>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(bank.list_flagged().await))
}

/// Query parameters for the availability read.
#[derive(Debug, Deserialize)]
pub struct AvailabilityParams {
    pub subject: String,
}

/// Unflagged counts per difficulty band for one subject. The assembly form
/// renders its quota limits from this.
pub async fn availability(
    State(bank): State<QuestionBank>,
    Query(params): Query<AvailabilityParams>,
) -> Result<impl IntoResponse, AppError> {
    let subject: Subject = params.subject.parse().map_err(AppError::BadRequest)?;
    Ok(Json(bank.availability(subject).await))
}

/// Adds a question to the bank.
pub async fn create_question(
    State(bank): State<QuestionBank>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let question = bank.add(payload).await?;
    tracing::info!("Question {} added to the bank", question.id);

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": question.id })),
    ))
}

/// Edits a question. The merged record is re-validated under the ingestion
/// rules before anything is written.
pub async fn update_question(
    State(bank): State<QuestionBank>,
    Path(id): Path<uuid::Uuid>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let question = bank.update(id, payload).await?;
    Ok(Json(question))
}

/// Permanently deletes a question. Existing tests keep their embedded
/// snapshots; only the bank loses the record.
pub async fn delete_question(
    State(bank): State<QuestionBank>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, AppError> {
    bank.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Flags a question out of the eligible pool.
pub async fn flag_question(
    State(bank): State<QuestionBank>,
    Path(id): Path<uuid::Uuid>,
    Json(payload): Json<FlagRequest>,
) -> Result<impl IntoResponse, AppError> {
    let question = bank.flag(id, payload.reason).await?;
    tracing::info!("Question {} flagged", question.id);
    Ok(Json(question))
}

/// Returns a question to the eligible pool.
pub async fn unflag_question(
    State(bank): State<QuestionBank>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let question = bank.unflag(id).await?;
    Ok(Json(question))
}
