// src/store/institute_store.rs

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    error::AppError,
    models::institute::{CreateInstituteRequest, Institute, UpdateInstituteRequest},
};

/// Repository of portal tenants.
#[derive(Clone, Default)]
pub struct InstituteStore {
    inner: Arc<RwLock<Vec<Institute>>>,
}

impl InstituteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, req: CreateInstituteRequest) -> Institute {
        let institute = Institute {
            id: uuid::Uuid::new_v4(),
            name: req.name,
            email: req.email,
            created_at: chrono::Utc::now(),
        };
        self.inner.write().await.push(institute.clone());
        institute
    }

    pub async fn list(&self) -> Vec<Institute> {
        self.inner.read().await.clone()
    }

    pub async fn get(&self, id: uuid::Uuid) -> Option<Institute> {
        self.inner.read().await.iter().find(|i| i.id == id).cloned()
    }

    pub async fn exists(&self, id: uuid::Uuid) -> bool {
        self.inner.read().await.iter().any(|i| i.id == id)
    }

    pub async fn update(
        &self,
        id: uuid::Uuid,
        patch: UpdateInstituteRequest,
    ) -> Result<Institute, AppError> {
        let mut guard = self.inner.write().await;
        let slot = guard
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(AppError::NotFound("Institute not found".to_string()))?;

        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(AppError::BadRequest("Name must not be empty".to_string()));
            }
            slot.name = name;
        }
        if let Some(email) = patch.email {
            if email.trim().is_empty() {
                return Err(AppError::BadRequest("Email must not be empty".to_string()));
            }
            slot.email = email;
        }

        Ok(slot.clone())
    }

    pub async fn delete(&self, id: uuid::Uuid) -> Result<(), AppError> {
        let mut guard = self.inner.write().await;
        let position = guard
            .iter()
            .position(|i| i.id == id)
            .ok_or(AppError::NotFound("Institute not found".to_string()))?;
        guard.remove(position);
        Ok(())
    }
}
