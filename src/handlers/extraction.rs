// src/handlers/extraction.rs

use axum::{Json, extract::State, response::IntoResponse};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::Deserialize;
use validator::Validate;

use crate::{
    error::AppError,
    extract::{Document, ExtractionClient},
};

/// DTO for submitting a document for digitization. HTML arrives as plain
/// text in `content`; every other MIME type arrives base64-encoded.
#[derive(Debug, Deserialize, Validate)]
pub struct ExtractRequest {
    #[validate(length(min = 1, max = 300))]
    pub file_name: String,

    #[validate(length(min = 1, max = 100))]
    pub mime_type: String,

    pub content: String,
}

/// Runs the extraction pipeline against the generative-AI collaborator.
///
/// Purely functional: nothing is persisted here. The caller decides whether
/// the returned question set goes into the bank (curation) or straight into
/// a test (finalization).
pub async fn extract_paper(
    State(extractor): State<ExtractionClient>,
    Json(payload): Json<ExtractRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let document = if payload.mime_type.starts_with("text/html")
        || payload.mime_type == "application/xhtml+xml"
    {
        Document::Html(payload.content)
    } else {
        let data = BASE64.decode(payload.content.as_bytes()).map_err(|_| {
            AppError::BadRequest("Binary content must be base64-encoded".to_string())
        })?;
        Document::Binary {
            mime_type: payload.mime_type.clone(),
            data,
        }
    };

    let outcome = extractor.extract(&document).await?;

    tracing::info!(
        "Extracted {} questions from {}",
        outcome.questions.len(),
        payload.file_name
    );

    Ok(Json(outcome))
}
