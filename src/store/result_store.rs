// src/store/result_store.rs

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    error::AppError,
    models::result::{ResultSummary, TestResult},
};

/// Append-only repository of test results. At most one record per
/// (test, student) pair; rank and average computations rely on that.
#[derive(Clone, Default)]
pub struct ResultStore {
    inner: Arc<RwLock<Vec<TestResult>>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a result. A second submission for the same (test, student)
    /// pair is a conflict; retake semantics are a product decision that has
    /// not been made, so no merge is attempted.
    pub async fn record(&self, result: TestResult) -> Result<TestResult, AppError> {
        let mut guard = self.inner.write().await;
        if guard
            .iter()
            .any(|r| r.test_id == result.test_id && r.student_id == result.student_id)
        {
            return Err(AppError::Conflict(format!(
                "A result for this test and student {} is already recorded",
                result.student_id
            )));
        }
        guard.push(result.clone());
        Ok(result)
    }

    pub async fn list_by_test(&self, test_id: uuid::Uuid) -> Vec<TestResult> {
        self.inner
            .read()
            .await
            .iter()
            .filter(|r| r.test_id == test_id)
            .cloned()
            .collect()
    }

    pub async fn list_by_student(&self, student_id: &str) -> Vec<TestResult> {
        self.inner
            .read()
            .await
            .iter()
            .filter(|r| r.student_id == student_id)
            .cloned()
            .collect()
    }

    /// Pure read-side reduction over a test's results.
    pub async fn summary(&self, test_id: uuid::Uuid) -> ResultSummary {
        let guard = self.inner.read().await;
        let scores: Vec<i64> = guard
            .iter()
            .filter(|r| r.test_id == test_id)
            .map(|r| r.score)
            .collect();

        let count = scores.len();
        let average_score = if count == 0 {
            0.0
        } else {
            scores.iter().sum::<i64>() as f64 / count as f64
        };

        ResultSummary {
            test_id,
            count,
            average_score,
            highest: scores.iter().copied().max().unwrap_or(0),
            lowest: scores.iter().copied().min().unwrap_or(0),
        }
    }
}
