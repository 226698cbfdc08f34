// src/store/test_store.rs

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    error::AppError,
    models::test::{Test, TestStatus, UpdateTestRequest},
};

/// Repository of scheduled tests.
#[derive(Clone, Default)]
pub struct TestStore {
    inner: Arc<RwLock<Vec<Test>>>,
}

impl TestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, test: Test) -> Test {
        self.inner.write().await.push(test.clone());
        test
    }

    pub async fn list(&self, institute: Option<uuid::Uuid>) -> Vec<Test> {
        self.inner
            .read()
            .await
            .iter()
            .filter(|t| institute.is_none_or(|id| t.institute_id == id))
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: uuid::Uuid) -> Option<Test> {
        self.inner.read().await.iter().find(|t| t.id == id).cloned()
    }

    pub async fn exists(&self, id: uuid::Uuid) -> bool {
        self.inner.read().await.iter().any(|t| t.id == id)
    }

    /// Metadata-only update. The embedded question list is immutable content
    /// and has no path through here; status changes must follow the forward
    /// lifecycle.
    pub async fn update_metadata(
        &self,
        id: uuid::Uuid,
        patch: UpdateTestRequest,
    ) -> Result<Test, AppError> {
        let mut guard = self.inner.write().await;
        let slot = guard
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(AppError::NotFound("Test not found".to_string()))?;

        // Validate the whole patch before touching the record; a rejected
        // edit must leave the test exactly as it was.
        if let Some(status) = patch.status {
            if !slot.status.can_transition(status) {
                return Err(AppError::BadRequest(format!(
                    "Cannot move a {:?} test to {:?}",
                    slot.status, status
                )));
            }
        }
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(AppError::BadRequest("Title must not be empty".to_string()));
            }
        }

        if let Some(status) = patch.status {
            slot.status = status;
        }
        if let Some(title) = patch.title {
            slot.title = title;
        }
        if let Some(batch) = patch.batch {
            slot.batch = batch;
        }
        if let Some(date) = patch.scheduled_date {
            slot.scheduled_date = date;
        }
        if let Some(duration) = patch.duration_minutes {
            slot.duration_minutes = Some(duration);
        }

        Ok(slot.clone())
    }

    /// Submission path: a recorded result completes the test, reachable
    /// directly from Upcoming.
    pub async fn mark_completed(&self, id: uuid::Uuid) {
        let mut guard = self.inner.write().await;
        if let Some(test) = guard.iter_mut().find(|t| t.id == id) {
            test.status = TestStatus::Completed;
        }
    }

    pub async fn delete(&self, id: uuid::Uuid) -> Result<(), AppError> {
        let mut guard = self.inner.write().await;
        let position = guard
            .iter()
            .position(|t| t.id == id)
            .ok_or(AppError::NotFound("Test not found".to_string()))?;
        guard.remove(position);
        Ok(())
    }
}
