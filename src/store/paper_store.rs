// src/store/paper_store.rs

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    error::AppError,
    models::paper::{AdminQuestionPaper, PaperSummary},
};

/// Repository of admin-shared question papers.
///
/// The access list is enforced here, at the read boundary: a viewer whose
/// institute is not on a paper's list cannot observe that the paper exists,
/// through listing or through a direct read. UI-side filtering is display
/// sugar, never the control.
#[derive(Clone, Default)]
pub struct PaperStore {
    inner: Arc<RwLock<Vec<AdminQuestionPaper>>>,
}

impl PaperStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, paper: AdminQuestionPaper) -> AdminQuestionPaper {
        self.inner.write().await.push(paper.clone());
        paper
    }

    /// Lists papers for a viewer. `None` means an unrestricted (admin) view.
    pub async fn list(&self, viewer: Option<uuid::Uuid>) -> Vec<PaperSummary> {
        self.inner
            .read()
            .await
            .iter()
            .filter(|p| viewer.is_none_or(|id| p.accessible_institute_ids.contains(&id)))
            .map(PaperSummary::from)
            .collect()
    }

    /// Reads one paper on behalf of a viewer. A paper hidden from the viewer
    /// is indistinguishable from one that does not exist.
    pub async fn get(
        &self,
        id: uuid::Uuid,
        viewer: Option<uuid::Uuid>,
    ) -> Result<AdminQuestionPaper, AppError> {
        self.inner
            .read()
            .await
            .iter()
            .find(|p| {
                p.id == id && viewer.is_none_or(|v| p.accessible_institute_ids.contains(&v))
            })
            .cloned()
            .ok_or(AppError::NotFound("Paper not found".to_string()))
    }

    pub async fn set_access(
        &self,
        id: uuid::Uuid,
        accessible_institute_ids: Vec<uuid::Uuid>,
    ) -> Result<AdminQuestionPaper, AppError> {
        let mut guard = self.inner.write().await;
        let slot = guard
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(AppError::NotFound("Paper not found".to_string()))?;
        slot.accessible_institute_ids = accessible_institute_ids;
        Ok(slot.clone())
    }

    pub async fn delete(&self, id: uuid::Uuid) -> Result<(), AppError> {
        let mut guard = self.inner.write().await;
        let position = guard
            .iter()
            .position(|p| p.id == id)
            .ok_or(AppError::NotFound("Paper not found".to_string()))?;
        guard.remove(position);
        Ok(())
    }
}
