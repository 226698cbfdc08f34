// src/handlers/papers.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use validator::Validate;

use crate::{
    error::AppError,
    models::paper::{
        AdminQuestionPaper, PaperDownload, UpdatePaperAccessRequest, UploadPaperRequest,
    },
    store::PaperStore,
    utils::jwt::Claims,
};

/// Resolves the viewer for paper reads: admins see everything, institutes
/// only what their ACL grants, students nothing.
fn resolve_viewer(claims: &Claims) -> Result<Option<uuid::Uuid>, AppError> {
    if claims.role == "admin" {
        return Ok(None);
    }
    if claims.role == "institute" {
        return claims
            .institute_uuid()
            .map(Some)
            .ok_or(AppError::Forbidden(
                "No institute attached to this account".to_string(),
            ));
    }
    Err(AppError::Forbidden(
        "Shared papers are not available for this role".to_string(),
    ))
}

fn require_admin(claims: &Claims) -> Result<(), AppError> {
    if claims.role != "admin" {
        return Err(AppError::Forbidden(
            "Managing shared papers requires the admin role".to_string(),
        ));
    }
    Ok(())
}

/// Uploads a shared question paper.
/// Admin only. The payload is base64 and must round-trip losslessly.
pub async fn upload_paper(
    State(papers): State<PaperStore>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UploadPaperRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&claims)?;

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let data = BASE64
        .decode(payload.data.as_bytes())
        .map_err(|_| AppError::BadRequest("Paper content must be base64-encoded".to_string()))?;

    let paper = papers
        .add(AdminQuestionPaper {
            id: uuid::Uuid::new_v4(),
            subject: payload.subject,
            file_name: payload.file_name,
            mime_type: payload.mime_type,
            data,
            accessible_institute_ids: payload.accessible_institute_ids,
            uploaded_at: chrono::Utc::now(),
        })
        .await;

    tracing::info!(
        "Paper {} uploaded, shared with {} institute(s)",
        paper.id,
        paper.accessible_institute_ids.len()
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": paper.id })),
    ))
}

/// Lists papers visible to the caller. The access list is applied in the
/// store read path, not here.
pub async fn list_papers(
    State(papers): State<PaperStore>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let viewer = resolve_viewer(&claims)?;
    Ok(Json(papers.list(viewer).await))
}

/// Downloads one paper, base64-encoded. Hidden papers are NotFound.
pub async fn get_paper(
    State(papers): State<PaperStore>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let viewer = resolve_viewer(&claims)?;
    let paper = papers.get(id, viewer).await?;

    Ok(Json(PaperDownload {
        id: paper.id,
        subject: paper.subject,
        file_name: paper.file_name,
        mime_type: paper.mime_type,
        data: BASE64.encode(&paper.data),
        uploaded_at: paper.uploaded_at,
    }))
}

/// Replaces a paper's access list.
/// Admin only.
pub async fn update_access(
    State(papers): State<PaperStore>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<uuid::Uuid>,
    Json(payload): Json<UpdatePaperAccessRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&claims)?;

    let paper = papers
        .set_access(id, payload.accessible_institute_ids)
        .await?;
    Ok(Json(serde_json::json!({
        "id": paper.id,
        "accessible_institute_ids": paper.accessible_institute_ids,
    })))
}

/// Deletes a paper.
/// Admin only.
pub async fn delete_paper(
    State(papers): State<PaperStore>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&claims)?;

    papers.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
