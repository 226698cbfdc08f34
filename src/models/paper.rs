// src/models/paper.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::question::Subject;

/// A question paper uploaded by the platform admin and shared with selected
/// institutes. The access list is authoritative: an institute absent from it
/// must never see the paper through any read path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminQuestionPaper {
    pub id: Uuid,
    pub subject: Subject,
    pub file_name: String,
    pub mime_type: String,

    /// Raw file bytes. Skipped during serialization; the download DTO
    /// carries them base64-encoded instead.
    #[serde(skip)]
    pub data: Vec<u8>,

    pub accessible_institute_ids: Vec<Uuid>,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}

/// Listing shape: metadata only, no payload.
#[derive(Debug, Serialize)]
pub struct PaperSummary {
    pub id: Uuid,
    pub subject: Subject,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: usize,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}

impl From<&AdminQuestionPaper> for PaperSummary {
    fn from(p: &AdminQuestionPaper) -> Self {
        PaperSummary {
            id: p.id,
            subject: p.subject,
            file_name: p.file_name.clone(),
            mime_type: p.mime_type.clone(),
            size_bytes: p.data.len(),
            uploaded_at: p.uploaded_at,
        }
    }
}

/// Download shape: metadata plus the base64-encoded payload.
#[derive(Debug, Serialize)]
pub struct PaperDownload {
    pub id: Uuid,
    pub subject: Subject,
    pub file_name: String,
    pub mime_type: String,
    pub data: String,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for uploading a paper. `data` is base64; binary content must survive
/// the round trip losslessly.
#[derive(Debug, Deserialize, Validate)]
pub struct UploadPaperRequest {
    pub subject: Subject,

    #[validate(length(min = 1, max = 300))]
    pub file_name: String,

    #[validate(length(min = 1, max = 100))]
    pub mime_type: String,

    #[validate(length(min = 1))]
    pub data: String,

    #[serde(default)]
    pub accessible_institute_ids: Vec<Uuid>,
}

/// DTO for replacing a paper's access list.
#[derive(Debug, Deserialize)]
pub struct UpdatePaperAccessRequest {
    pub accessible_institute_ids: Vec<Uuid>,
}
