// src/models/institute.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A tenant of the portal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Institute {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for registering an institute.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInstituteRequest {
    #[validate(length(min = 1, max = 200, message = "Name must not be empty."))]
    pub name: String,

    #[validate(email(message = "A valid contact email is required."))]
    pub email: String,
}

/// DTO for updating an institute. Fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateInstituteRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}
