// src/store/question_bank.rs

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::{
    error::AppError,
    models::{
        question::{
            CreateQuestionRequest, Difficulty, Question, QuestionKind, Subject,
            UpdateQuestionRequest, answer_matches_options,
        },
        test::TestQuestion,
    },
    utils::svg::sanitize_svg,
};

/// Unflagged counts per difficulty band for one subject.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BandAvailability {
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
}

impl BandAvailability {
    pub fn for_band(&self, difficulty: Difficulty) -> usize {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }
}

/// Returned when a selection request exceeds the eligible pool.
#[derive(Debug)]
pub struct BandShortage {
    pub difficulty: Difficulty,
    pub requested: usize,
    pub available: usize,
}

/// The question bank: a process-lifetime repository of atomic question
/// records. Every mutation goes through a method here; nothing else holds a
/// handle to the underlying collection.
#[derive(Clone, Default)]
pub struct QuestionBank {
    inner: Arc<RwLock<Vec<Question>>>,
}

impl QuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a question, assigning its identifier and both timestamps.
    /// Rejects blank text or answer, option-less choice questions, and an
    /// answer that matches none of the options.
    pub async fn add(&self, req: CreateQuestionRequest) -> Result<Question, AppError> {
        validate_ingestion(&req.text, &req.options, &req.answer, req.kind)?;

        let now = chrono::Utc::now();
        let question = Question {
            id: uuid::Uuid::new_v4(),
            text: req.text,
            kind: req.kind,
            options: req.options,
            answer: req.answer,
            explanation: req.explanation,
            subject: req.subject,
            topic: req.topic,
            difficulty: req.difficulty,
            marks: req.marks,
            flagged: false,
            flag_reason: None,
            diagram_svg: req.diagram_svg.as_deref().map(sanitize_svg),
            created_at: now,
            updated_at: now,
        };

        self.inner.write().await.push(question.clone());
        Ok(question)
    }

    pub async fn get(&self, id: uuid::Uuid) -> Option<Question> {
        self.inner.read().await.iter().find(|q| q.id == id).cloned()
    }

    /// Merges the present patch fields, re-validates the merged record under
    /// the ingestion rules, and refreshes the update timestamp. Nothing is
    /// written when validation fails.
    pub async fn update(
        &self,
        id: uuid::Uuid,
        patch: UpdateQuestionRequest,
    ) -> Result<Question, AppError> {
        let mut guard = self.inner.write().await;
        let slot = guard
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or(AppError::NotFound("Question not found".to_string()))?;

        let mut merged = slot.clone();
        if let Some(text) = patch.text {
            merged.text = text;
        }
        if let Some(options) = patch.options {
            merged.options = options;
        }
        if let Some(answer) = patch.answer {
            merged.answer = answer;
        }
        if let Some(explanation) = patch.explanation {
            merged.explanation = Some(explanation);
        }
        if let Some(subject) = patch.subject {
            merged.subject = subject;
        }
        if let Some(topic) = patch.topic {
            merged.topic = topic;
        }
        if let Some(difficulty) = patch.difficulty {
            merged.difficulty = difficulty;
        }
        if let Some(marks) = patch.marks {
            if marks == 0 {
                return Err(AppError::BadRequest(
                    "Marks must be a positive integer".to_string(),
                ));
            }
            merged.marks = marks;
        }
        if let Some(svg) = patch.diagram_svg {
            merged.diagram_svg = Some(sanitize_svg(&svg));
        }

        validate_ingestion(&merged.text, &merged.options, &merged.answer, merged.kind)?;

        merged.updated_at = chrono::Utc::now();
        *slot = merged.clone();
        Ok(merged)
    }

    /// Permanent removal. Deleting an absent id is NotFound, consistent with
    /// every other entity.
    pub async fn delete(&self, id: uuid::Uuid) -> Result<(), AppError> {
        let mut guard = self.inner.write().await;
        let position = guard
            .iter()
            .position(|q| q.id == id)
            .ok_or(AppError::NotFound("Question not found".to_string()))?;
        guard.remove(position);
        Ok(())
    }

    /// Marks a question ineligible. It stays out of every eligibility
    /// computation until `unflag`.
    pub async fn flag(&self, id: uuid::Uuid, reason: String) -> Result<Question, AppError> {
        self.set_flag(id, true, Some(reason)).await
    }

    pub async fn unflag(&self, id: uuid::Uuid) -> Result<Question, AppError> {
        self.set_flag(id, false, None).await
    }

    async fn set_flag(
        &self,
        id: uuid::Uuid,
        flagged: bool,
        reason: Option<String>,
    ) -> Result<Question, AppError> {
        let mut guard = self.inner.write().await;
        let slot = guard
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or(AppError::NotFound("Question not found".to_string()))?;

        slot.flagged = flagged;
        slot.flag_reason = reason;
        slot.updated_at = chrono::Utc::now();
        Ok(slot.clone())
    }

    /// All unflagged questions matching the optional filters, in insertion
    /// order. Deterministic so callers and tests can rely on it.
    pub async fn query_eligible(
        &self,
        subject: Option<Subject>,
        difficulty: Option<Difficulty>,
    ) -> Vec<Question> {
        self.inner
            .read()
            .await
            .iter()
            .filter(|q| {
                !q.flagged
                    && subject.is_none_or(|s| q.subject == s)
                    && difficulty.is_none_or(|d| q.difficulty == d)
            })
            .cloned()
            .collect()
    }

    /// The curation view: flagged questions with their reasons.
    pub async fn list_flagged(&self) -> Vec<Question> {
        self.inner
            .read()
            .await
            .iter()
            .filter(|q| q.flagged)
            .cloned()
            .collect()
    }

    /// Count of unflagged questions with exactly this subject and
    /// difficulty. This is the number assembly availability is checked
    /// against.
    pub async fn count_by(&self, subject: Subject, difficulty: Difficulty) -> usize {
        self.inner
            .read()
            .await
            .iter()
            .filter(|q| !q.flagged && q.subject == subject && q.difficulty == difficulty)
            .count()
    }

    /// Total unflagged questions across all subjects.
    pub async fn count_eligible(&self) -> usize {
        self.inner.read().await.iter().filter(|q| !q.flagged).count()
    }

    pub async fn availability(&self, subject: Subject) -> BandAvailability {
        let guard = self.inner.read().await;
        let count = |difficulty: Difficulty| {
            guard
                .iter()
                .filter(|q| !q.flagged && q.subject == subject && q.difficulty == difficulty)
                .count()
        };
        BandAvailability {
            easy: count(Difficulty::Easy),
            medium: count(Difficulty::Medium),
            hard: count(Difficulty::Hard),
        }
    }

    /// Selects per-band questions for assembly, re-validating availability
    /// under the same lock acquisition that performs the selection. A
    /// concurrent flag or delete can therefore never slip between the
    /// availability check and the pick.
    ///
    /// Selection policy: deterministic insertion order per band.
    pub async fn select_for_assembly(
        &self,
        subject: Subject,
        easy: usize,
        medium: usize,
        hard: usize,
    ) -> Result<Vec<TestQuestion>, BandShortage> {
        let guard = self.inner.read().await;
        let mut picked = Vec::with_capacity(easy + medium + hard);

        for (difficulty, requested) in [
            (Difficulty::Easy, easy),
            (Difficulty::Medium, medium),
            (Difficulty::Hard, hard),
        ] {
            let band: Vec<&Question> = guard
                .iter()
                .filter(|q| !q.flagged && q.subject == subject && q.difficulty == difficulty)
                .collect();

            if band.len() < requested {
                return Err(BandShortage {
                    difficulty,
                    requested,
                    available: band.len(),
                });
            }

            picked.extend(band.into_iter().take(requested).map(TestQuestion::from));
        }

        Ok(picked)
    }
}

fn validate_ingestion(
    text: &str,
    options: &[String],
    answer: &str,
    kind: QuestionKind,
) -> Result<(), AppError> {
    if text.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Question text must not be empty".to_string(),
        ));
    }
    if answer.trim().is_empty() {
        return Err(AppError::BadRequest("Answer must not be empty".to_string()));
    }
    match kind {
        QuestionKind::MultipleChoice => {
            if options.is_empty() {
                return Err(AppError::BadRequest(
                    "A choice question needs at least one option".to_string(),
                ));
            }
        }
    }
    if !options.is_empty() && !answer_matches_options(answer, options) {
        return Err(AppError::BadRequest(
            "Answer must match one of the options".to_string(),
        ));
    }
    Ok(())
}
