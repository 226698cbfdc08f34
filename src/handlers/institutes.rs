// src/handlers/institutes.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::institute::{CreateInstituteRequest, UpdateInstituteRequest},
    store::InstituteStore,
};

/// Registers an institute.
/// Admin only.
pub async fn create_institute(
    State(institutes): State<InstituteStore>,
    Json(payload): Json<CreateInstituteRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let institute = institutes.add(payload).await;
    tracing::info!("Institute {} registered", institute.id);

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": institute.id })),
    ))
}

/// Lists all institutes.
/// Admin only.
pub async fn list_institutes(
    State(institutes): State<InstituteStore>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(institutes.list().await))
}

pub async fn get_institute(
    State(institutes): State<InstituteStore>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let institute = institutes
        .get(id)
        .await
        .ok_or(AppError::NotFound("Institute not found".to_string()))?;
    Ok(Json(institute))
}

/// Updates institute details. Fields are optional.
/// Admin only.
pub async fn update_institute(
    State(institutes): State<InstituteStore>,
    Path(id): Path<uuid::Uuid>,
    Json(payload): Json<UpdateInstituteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let institute = institutes.update(id, payload).await?;
    Ok(Json(institute))
}

/// Deletes an institute.
/// Admin only.
pub async fn delete_institute(
    State(institutes): State<InstituteStore>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, AppError> {
    institutes.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
