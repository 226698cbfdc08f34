// src/models/result.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Letter grade derived from the score percentage. Always computed
/// server-side; a caller-supplied grade is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
}

impl Grade {
    pub fn from_scores(score: i64, max_score: i64) -> Grade {
        if max_score <= 0 {
            return Grade::D;
        }
        let pct = score as f64 * 100.0 / max_score as f64;
        if pct >= 90.0 {
            Grade::APlus
        } else if pct >= 75.0 {
            Grade::A
        } else if pct >= 60.0 {
            Grade::B
        } else if pct >= 40.0 {
            Grade::C
        } else {
            Grade::D
        }
    }
}

/// Per-subject slice of a result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectScore {
    pub score: i64,
    pub max_score: i64,
}

/// Outcome of one (test, student) pair. Append-only; at most one record per
/// pair is accepted, a duplicate submission is a conflict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub test_id: Uuid,

    /// Identity-provider user id of the student.
    pub student_id: String,

    pub score: i64,
    pub max_score: i64,
    pub rank: i64,
    pub total_students: i64,
    pub grade: Grade,
    pub correct: i64,
    pub wrong: i64,
    pub unattempted: i64,
    pub subject_scores: Option<HashMap<String, SubjectScore>>,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for recording a result on test submission. Intentionally thin:
/// presence and basic ranges only.
#[derive(Debug, Deserialize, Validate)]
pub struct RecordResultRequest {
    pub test_id: Uuid,

    /// Taken from the token for student callers; required here for
    /// staff callers recording on a student's behalf.
    pub student_id: Option<String>,

    #[validate(range(min = 0))]
    pub score: i64,

    #[validate(range(min = 1))]
    pub max_score: i64,

    #[validate(range(min = 1))]
    pub rank: i64,

    #[validate(range(min = 1))]
    pub total_students: i64,

    #[serde(default)]
    pub correct: i64,
    #[serde(default)]
    pub wrong: i64,
    #[serde(default)]
    pub unattempted: i64,

    pub subject_scores: Option<HashMap<String, SubjectScore>>,
}

/// Read-side aggregate over a test's results.
#[derive(Debug, Serialize)]
pub struct ResultSummary {
    pub test_id: Uuid,
    pub count: usize,
    pub average_score: f64,
    pub highest: i64,
    pub lowest: i64,
}
