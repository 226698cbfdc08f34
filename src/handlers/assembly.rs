// src/handlers/assembly.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{
        question::{Difficulty, Subject, answer_matches_options, default_marks},
        test::{
            CreateTestRequest, FinalizePaperRequest, Test, TestQuestion, TestStatus,
            UpdateTestRequest,
        },
    },
    store::{
        InstituteStore, QuestionBank, TestStore,
        question_bank::{BandAvailability, BandShortage},
    },
    utils::{jwt::Claims, svg::sanitize_svg},
};

fn band_field(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "easy_count",
        Difficulty::Medium => "medium_count",
        Difficulty::Hard => "hard_count",
    }
}

fn availability_message(
    subject: Subject,
    difficulty: Difficulty,
    requested: i64,
    available: usize,
) -> String {
    format!(
        "Not enough eligible {} questions for {}: requested {}, available: {}",
        difficulty, subject, requested, available
    )
}

/// Checks every field of an assembly request and collects every violation
/// into a field -> message map. Exhaustive on purpose: the caller renders
/// all problems at once instead of one at a time.
fn validate_test_request(
    req: &CreateTestRequest,
    availability: &BandAvailability,
) -> HashMap<String, String> {
    let mut errors = HashMap::new();

    if req.title.trim().is_empty() {
        errors.insert("title".to_string(), "Title must not be empty.".to_string());
    }
    if req.code.trim().is_empty() {
        errors.insert("code".to_string(), "Test code must not be empty.".to_string());
    }

    match req.total_marks {
        None => {
            errors.insert(
                "total_marks".to_string(),
                "Total marks are required.".to_string(),
            );
        }
        Some(v) if v <= 0 => {
            errors.insert(
                "total_marks".to_string(),
                "Total marks must be a positive integer.".to_string(),
            );
        }
        _ => {}
    }

    match req.duration_minutes {
        None => {
            errors.insert(
                "duration_minutes".to_string(),
                "A duration is required.".to_string(),
            );
        }
        Some(v) if v <= 0 => {
            errors.insert(
                "duration_minutes".to_string(),
                "Duration must be a positive number of minutes.".to_string(),
            );
        }
        _ => {}
    }

    let mut counts_valid = true;
    for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
        if req.requested(difficulty) < 0 {
            counts_valid = false;
            errors.insert(
                band_field(difficulty).to_string(),
                "Question counts must not be negative.".to_string(),
            );
        }
    }

    if counts_valid {
        if req.easy_count + req.medium_count + req.hard_count == 0 {
            errors.insert(
                "difficulty".to_string(),
                "At least one question must be requested.".to_string(),
            );
        }

        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            let requested = req.requested(difficulty);
            let available = availability.for_band(difficulty);
            if requested as usize > available {
                errors.insert(
                    band_field(difficulty).to_string(),
                    availability_message(req.subject, difficulty, requested, available),
                );
            }
        }
    }

    match (req.start_date, req.end_date) {
        (Some(start), Some(end)) => {
            if start >= end {
                errors.insert(
                    "end_date".to_string(),
                    "Start date must be strictly before end date.".to_string(),
                );
            }
        }
        (start, end) => {
            if start.is_none() {
                errors.insert(
                    "start_date".to_string(),
                    "A start date is required.".to_string(),
                );
            }
            if end.is_none() {
                errors.insert("end_date".to_string(), "An end date is required.".to_string());
            }
        }
    }

    errors
}

fn shortage_errors(subject: Subject, shortage: &BandShortage) -> HashMap<String, String> {
    let mut errors = HashMap::new();
    errors.insert(
        band_field(shortage.difficulty).to_string(),
        availability_message(
            subject,
            shortage.difficulty,
            shortage.requested as i64,
            shortage.available,
        ),
    );
    errors
}

/// Assembles a test from the eligible pool.
///
/// All-or-nothing: a failed attempt mutates neither the bank nor the test
/// collection, and the caller receives the full error map.
pub async fn create_test(
    State(bank): State<QuestionBank>,
    State(tests): State<TestStore>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    if claims.role != "institute" && claims.role != "admin" {
        return Err(AppError::Forbidden(
            "Only institutes may assemble tests".to_string(),
        ));
    }

    // An entirely empty eligible pool blocks assembly before any other
    // validation runs.
    if bank.count_eligible().await == 0 {
        return Err(AppError::Validation(HashMap::from([(
            "bank".to_string(),
            "The question bank has no eligible questions.".to_string(),
        )])));
    }

    let Some(institute_id) = claims.institute_uuid().or(req.institute_id) else {
        return Err(AppError::Validation(HashMap::from([(
            "institute_id".to_string(),
            "An owning institute is required.".to_string(),
        )])));
    };

    let availability = bank.availability(req.subject).await;
    let errors = validate_test_request(&req, &availability);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let (Some(scheduled_date), Some(duration_minutes)) = (req.start_date, req.duration_minutes)
    else {
        return Err(AppError::InternalServerError(
            "Validated fields missing".to_string(),
        ));
    };

    // The pre-check above can go stale under concurrent flagging or
    // deletion; availability is re-validated inside the selection lock.
    let questions = bank
        .select_for_assembly(
            req.subject,
            req.easy_count as usize,
            req.medium_count as usize,
            req.hard_count as usize,
        )
        .await
        .map_err(|shortage| AppError::Validation(shortage_errors(req.subject, &shortage)))?;

    let test = tests
        .add(Test {
            id: uuid::Uuid::new_v4(),
            title: req.title.trim().to_string(),
            code: Some(req.code.trim().to_string()),
            subject: req.subject,
            batch: req.batch,
            institute_id,
            status: TestStatus::Upcoming,
            scheduled_date,
            duration_minutes: Some(duration_minutes.min(u32::MAX as i64) as u32),
            questions: Some(questions),
            source_file: None,
            created_at: chrono::Utc::now(),
        })
        .await;

    tracing::info!(
        "Test {} assembled from the bank for institute {}",
        test.id,
        test.institute_id
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": test.id })),
    ))
}

/// Turns a previously extracted question list into a test owned by an
/// institute. The bank is bypassed on purpose: this path uses the AI output
/// as-is, re-sanitized and re-checked since it transits the client.
pub async fn create_test_from_paper(
    State(tests): State<TestStore>,
    State(institutes): State<InstituteStore>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<FinalizePaperRequest>,
) -> Result<impl IntoResponse, AppError> {
    if claims.role != "admin" && claims.institute_uuid() != Some(req.institute_id) {
        return Err(AppError::Forbidden(
            "Cannot create a test for another institute".to_string(),
        ));
    }

    if !institutes.exists(req.institute_id).await {
        return Err(AppError::NotFound("Institute not found".to_string()));
    }

    let mut errors = HashMap::new();

    let title = req
        .title
        .clone()
        .unwrap_or_else(|| req.extraction.test_title.clone());
    if title.trim().is_empty() {
        errors.insert(
            "title".to_string(),
            "A title is required and the extraction reported none.".to_string(),
        );
    }

    let subject = match req.subject {
        Some(subject) => Some(subject),
        None => match req.extraction.subject.parse::<Subject>() {
            Ok(subject) => Some(subject),
            Err(message) => {
                errors.insert("subject".to_string(), message);
                None
            }
        },
    };

    if req.extraction.questions.is_empty() {
        errors.insert(
            "questions".to_string(),
            "The extraction contains no questions.".to_string(),
        );
    }

    let mut questions = Vec::with_capacity(req.extraction.questions.len());
    for (index, extracted) in req.extraction.questions.iter().enumerate() {
        if extracted.question.trim().is_empty() {
            errors.insert(
                "questions".to_string(),
                format!("Question {} is blank.", index + 1),
            );
            break;
        }
        if !extracted.options.is_empty()
            && !answer_matches_options(&extracted.answer, &extracted.options)
        {
            errors.insert(
                "questions".to_string(),
                format!(
                    "Question {} carries an answer that is not among its options.",
                    index + 1
                ),
            );
            break;
        }
        questions.push(TestQuestion {
            text: extracted.question.clone(),
            kind: extracted.kind,
            options: extracted.options.clone(),
            answer: extracted.answer.clone(),
            explanation: None,
            marks: default_marks(),
            diagram_svg: extracted.diagram_svg.as_deref().map(sanitize_svg),
        });
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    let Some(subject) = subject else {
        return Err(AppError::InternalServerError(
            "Validated subject missing".to_string(),
        ));
    };

    let test = tests
        .add(Test {
            id: uuid::Uuid::new_v4(),
            title: title.trim().to_string(),
            code: None,
            subject,
            batch: req.batch,
            institute_id: req.institute_id,
            status: TestStatus::Upcoming,
            scheduled_date: req.scheduled_date.unwrap_or_else(chrono::Utc::now),
            duration_minutes: req.duration_minutes,
            questions: Some(questions),
            source_file: req.source_file,
            created_at: chrono::Utc::now(),
        })
        .await;

    tracing::info!(
        "Test {} created from extracted paper for institute {}",
        test.id,
        test.institute_id
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": test.id })),
    ))
}

/// Lists tests: all of them for admins, the institute's own otherwise.
pub async fn list_tests(
    State(tests): State<TestStore>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let filter = if claims.role == "admin" {
        None
    } else {
        Some(claims.institute_uuid().ok_or(AppError::Forbidden(
            "No institute attached to this account".to_string(),
        ))?)
    };
    Ok(Json(tests.list(filter).await))
}

pub async fn get_test(
    State(tests): State<TestStore>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let test = tests
        .get(id)
        .await
        .ok_or(AppError::NotFound("Test not found".to_string()))?;
    Ok(Json(test))
}

fn ensure_owner(claims: &Claims, test: &Test) -> Result<(), AppError> {
    if claims.role == "admin" || claims.institute_uuid() == Some(test.institute_id) {
        return Ok(());
    }
    Err(AppError::Forbidden(
        "Only the owning institute may modify this test".to_string(),
    ))
}

/// Edits test metadata. The embedded question list is immutable content and
/// is not reachable from this path.
pub async fn update_test(
    State(tests): State<TestStore>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<uuid::Uuid>,
    Json(payload): Json<UpdateTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    let test = tests
        .get(id)
        .await
        .ok_or(AppError::NotFound("Test not found".to_string()))?;
    ensure_owner(&claims, &test)?;

    let updated = tests.update_metadata(id, payload).await?;
    Ok(Json(updated))
}

pub async fn delete_test(
    State(tests): State<TestStore>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let test = tests
        .get(id)
        .await
        .ok_or(AppError::NotFound("Test not found".to_string()))?;
    ensure_owner(&claims, &test)?;

    tests.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
