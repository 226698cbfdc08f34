// tests/api_tests.rs

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use exambank::{config::Config, routes, state::AppState, utils::jwt::sign_jwt};
use serde_json::{Value, json};

const JWT_SECRET: &str = "test_secret_for_integration_tests";

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    // The model endpoint is never reached by these tests; extraction paths
    // live in extraction_tests.rs with a stub server.
    let config = Config {
        jwt_secret: JWT_SECRET.to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        model_api_key: "test-key".to_string(),
        model_base_url: "http://127.0.0.1:9".to_string(),
        model_name: "stub-model".to_string(),
        extraction_timeout_secs: 2,
        rust_log: "error".to_string(),
    };

    let state = AppState::new(config);
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .await
        .unwrap();
    });

    address
}

fn admin_token() -> String {
    sign_jwt("admin-1", "admin", None, JWT_SECRET, 600).unwrap()
}

fn institute_token(institute_id: &str) -> String {
    sign_jwt("inst-user-1", "institute", Some(institute_id), JWT_SECRET, 600).unwrap()
}

fn student_token(subject_id: &str) -> String {
    sign_jwt(subject_id, "student", None, JWT_SECRET, 600).unwrap()
}

async fn seed_question(
    client: &reqwest::Client,
    address: &str,
    token: &str,
    text: &str,
    subject: &str,
    difficulty: &str,
) -> String {
    let response = client
        .post(format!("{}/api/bank/questions", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "text": text,
            "options": ["A", "B", "C", "D"],
            "answer": "A",
            "subject": subject,
            "topic": "Seeded",
            "difficulty": difficulty,
        }))
        .send()
        .await
        .expect("Failed to seed question");
    assert_eq!(response.status().as_u16(), 201);
    response.json::<Value>().await.unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string()
}

fn assembly_body(easy: i64, medium: i64, hard: i64) -> Value {
    json!({
        "title": "Weekly Physics Mock",
        "code": "PHY-W12",
        "subject": "Physics",
        "batch": "2026-A",
        "total_marks": 40,
        "duration_minutes": 60,
        "easy_count": easy,
        "medium_count": medium,
        "hard_count": hard,
        "start_date": "2026-09-01T09:00:00Z",
        "end_date": "2026-09-07T09:00:00Z",
    })
}

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn bank_requires_authentication() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/bank/questions", address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn students_cannot_curate_the_bank() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/bank/questions", address))
        .header("Authorization", format!("Bearer {}", student_token("s1")))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn create_question_rejects_an_orphaned_answer() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = institute_token(&uuid::Uuid::new_v4().to_string());

    // The answer matches no option, even after normalization.
    let response = client
        .post(format!("{}/api/bank/questions", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "text": "What is the SI unit of force?",
            "options": ["Newton", "Joule", "Watt"],
            "answer": "Pascal",
            "subject": "Physics",
            "topic": "Units",
            "difficulty": "Easy",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);

    // Nothing was stored.
    let listed: Vec<Value> = client
        .get(format!("{}/api/bank/questions", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn create_question_rejects_blank_text() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = institute_token(&uuid::Uuid::new_v4().to_string());

    let response = client
        .post(format!("{}/api/bank/questions", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "text": "   ",
            "options": ["A", "B"],
            "answer": "A",
            "subject": "Chemistry",
            "topic": "Any",
            "difficulty": "Medium",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn flagged_questions_leave_every_eligibility_read() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = institute_token(&uuid::Uuid::new_v4().to_string());

    let kept = seed_question(&client, &address, &token, "kept", "Physics", "Easy").await;
    let flagged = seed_question(&client, &address, &token, "flagged", "Physics", "Easy").await;

    let response = client
        .post(format!("{}/api/bank/questions/{}/flag", address, flagged))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "reason": "options are ambiguous" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    // Eligibility listing excludes the flagged question.
    let eligible: Vec<Value> = client
        .get(format!(
            "{}/api/bank/questions?subject=Physics&difficulty=Easy",
            address
        ))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(eligible.len(), 1);
    assert_eq!(eligible[0]["id"].as_str().unwrap(), kept);

    // Availability counts only the unflagged one.
    let availability: Value = client
        .get(format!("{}/api/bank/availability?subject=Physics", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(availability["easy"], 1);

    // The curation view lists it with its reason.
    let flagged_list: Vec<Value> = client
        .get(format!("{}/api/bank/questions/flagged", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(flagged_list.len(), 1);
    assert_eq!(flagged_list[0]["flag_reason"], "options are ambiguous");

    // Unflagging restores eligibility.
    client
        .post(format!("{}/api/bank/questions/{}/unflag", address, flagged))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    let eligible: Vec<Value> = client
        .get(format!("{}/api/bank/questions", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(eligible.len(), 2);
}

#[tokio::test]
async fn assembly_uses_only_the_eligible_pool_and_cites_availability() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = institute_token(&uuid::Uuid::new_v4().to_string());

    // 3 unflagged + 1 flagged Easy-Physics questions.
    for text in ["e1", "e2", "e3"] {
        seed_question(&client, &address, &token, text, "Physics", "Easy").await;
    }
    let poisoned = seed_question(&client, &address, &token, "e4", "Physics", "Easy").await;
    client
        .post(format!("{}/api/bank/questions/{}/flag", address, poisoned))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "reason": "wrong answer key" }))
        .send()
        .await
        .unwrap();

    // A request for 3 succeeds and selects only unflagged questions.
    let created = client
        .post(format!("{}/api/tests", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&assembly_body(3, 0, 0))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status().as_u16(), 201);
    let test_id = created.json::<Value>().await.unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let test: Value = client
        .get(format!("{}/api/tests/{}", address, test_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(test["status"], "Upcoming");
    let questions = test["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 3);
    for q in questions {
        assert_ne!(q["text"], "e4");
    }

    // A request for 4 fails citing the available count and creates nothing.
    let rejected = client
        .post(format!("{}/api/tests", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&assembly_body(4, 0, 0))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status().as_u16(), 422);
    let body: Value = rejected.json().await.unwrap();
    let message = body["errors"]["easy_count"].as_str().unwrap();
    assert!(message.contains("available: 3"), "got: {}", message);

    let tests: Vec<Value> = client
        .get(format!("{}/api/tests", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(tests.len(), 1, "the failed attempt must not create a test");
}

#[tokio::test]
async fn assembly_is_all_or_nothing_and_collects_every_error() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = institute_token(&uuid::Uuid::new_v4().to_string());

    seed_question(&client, &address, &token, "e1", "Physics", "Easy").await;

    // Several fields invalid at once: blank title, equal dates, zero marks.
    let mut body = assembly_body(1, 0, 0);
    body["title"] = json!("   ");
    body["total_marks"] = json!(0);
    body["end_date"] = body["start_date"].clone();

    let response = client
        .post(format!("{}/api/tests", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 422);
    let errors = response.json::<Value>().await.unwrap()["errors"].clone();
    assert!(errors.get("title").is_some());
    assert!(errors.get("total_marks").is_some());
    assert!(errors.get("end_date").is_some());

    // No test was created and the bank is untouched.
    let tests: Vec<Value> = client
        .get(format!("{}/api/tests", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(tests.is_empty());

    let questions: Vec<Value> = client
        .get(format!("{}/api/bank/questions", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(questions.len(), 1);
}

#[tokio::test]
async fn assembly_is_blocked_outright_on_an_empty_bank() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = institute_token(&uuid::Uuid::new_v4().to_string());

    let response = client
        .post(format!("{}/api/tests", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&assembly_body(1, 0, 0))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 422);
    let body: Value = response.json().await.unwrap();
    assert!(body["errors"].get("bank").is_some());
}

#[tokio::test]
async fn embedded_questions_survive_bank_edits_and_deletes() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = institute_token(&uuid::Uuid::new_v4().to_string());

    let question_id =
        seed_question(&client, &address, &token, "Original text", "Physics", "Easy").await;

    let created = client
        .post(format!("{}/api/tests", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&assembly_body(1, 0, 0))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status().as_u16(), 201);
    let test_id = created.json::<Value>().await.unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    // Edit, then delete, the source bank item.
    let updated = client
        .put(format!("{}/api/bank/questions/{}", address, question_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "text": "Edited text" }))
        .send()
        .await
        .unwrap();
    assert_eq!(updated.status().as_u16(), 200);
    client
        .delete(format!("{}/api/bank/questions/{}", address, question_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    // The test's snapshot is unchanged.
    let test: Value = client
        .get(format!("{}/api/tests/{}", address, test_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(test["questions"][0]["text"], "Original text");
}

#[tokio::test]
async fn test_metadata_edits_follow_the_forward_lifecycle() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let institute_id = uuid::Uuid::new_v4().to_string();
    let token = institute_token(&institute_id);

    seed_question(&client, &address, &token, "e1", "Physics", "Easy").await;
    let created = client
        .post(format!("{}/api/tests", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&assembly_body(1, 0, 0))
        .send()
        .await
        .unwrap();
    let test_id = created.json::<Value>().await.unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    // Forward transition works.
    let assigned = client
        .put(format!("{}/api/tests/{}", address, test_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "status": "Assigned", "title": "Renamed Mock" }))
        .send()
        .await
        .unwrap();
    assert_eq!(assigned.status().as_u16(), 200);
    let body: Value = assigned.json().await.unwrap();
    assert_eq!(body["status"], "Assigned");
    assert_eq!(body["title"], "Renamed Mock");

    // Backwards transition is rejected.
    let backwards = client
        .put(format!("{}/api/tests/{}", address, test_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "status": "Upcoming" }))
        .send()
        .await
        .unwrap();
    assert_eq!(backwards.status().as_u16(), 400);

    // Another institute cannot touch the test at all.
    let other = institute_token(&uuid::Uuid::new_v4().to_string());
    let forbidden = client
        .put(format!("{}/api/tests/{}", address, test_id))
        .header("Authorization", format!("Bearer {}", other))
        .json(&json!({ "title": "Hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status().as_u16(), 403);
}

#[tokio::test]
async fn results_are_recorded_once_per_student_and_complete_the_test() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = institute_token(&uuid::Uuid::new_v4().to_string());

    seed_question(&client, &address, &token, "e1", "Physics", "Easy").await;
    let created = client
        .post(format!("{}/api/tests", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&assembly_body(1, 0, 0))
        .send()
        .await
        .unwrap();
    let test_id = created.json::<Value>().await.unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let submission = json!({
        "test_id": test_id,
        "score": 92,
        "max_score": 100,
        "rank": 1,
        "total_students": 20,
        "correct": 23,
        "wrong": 1,
        "unattempted": 1,
        "subject_scores": { "Physics": { "score": 92, "max_score": 100 } },
    });

    // A student records under their own identity; the grade is derived.
    let recorded = client
        .post(format!("{}/api/results", address))
        .header("Authorization", format!("Bearer {}", student_token("student-7")))
        .json(&submission)
        .send()
        .await
        .unwrap();
    assert_eq!(recorded.status().as_u16(), 201);
    let body: Value = recorded.json().await.unwrap();
    assert_eq!(body["grade"], "A+");
    assert_eq!(body["student_id"], "student-7");

    // A second submission for the same pair is a conflict.
    let duplicate = client
        .post(format!("{}/api/results", address))
        .header("Authorization", format!("Bearer {}", student_token("student-7")))
        .json(&submission)
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate.status().as_u16(), 409);

    // Read paths: per-test listing, summary, and the completed status.
    let listed: Vec<Value> = client
        .get(format!("{}/api/results/test/{}", address, test_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    let summary: Value = client
        .get(format!("{}/api/results/test/{}/summary", address, test_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(summary["count"], 1);
    assert_eq!(summary["average_score"], 92.0);

    let test: Value = client
        .get(format!("{}/api/tests/{}", address, test_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(test["status"], "Completed");
}

#[tokio::test]
async fn recording_against_a_missing_test_is_not_found() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/results", address))
        .header("Authorization", format!("Bearer {}", student_token("s1")))
        .json(&json!({
            "test_id": uuid::Uuid::new_v4(),
            "score": 10,
            "max_score": 100,
            "rank": 1,
            "total_students": 1,
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn shared_papers_are_invisible_outside_their_access_list() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let admin = admin_token();

    // Two institutes; the paper is shared with the first only.
    let mut institute_ids = Vec::new();
    for name in ["Aurora Academy", "Borealis Institute"] {
        let created = client
            .post(format!("{}/api/institutes", address))
            .header("Authorization", format!("Bearer {}", admin))
            .json(&json!({ "name": name, "email": "admin@example.org" }))
            .send()
            .await
            .unwrap();
        assert_eq!(created.status().as_u16(), 201);
        institute_ids.push(
            created.json::<Value>().await.unwrap()["id"]
                .as_str()
                .unwrap()
                .to_string(),
        );
    }

    let payload = b"%PDF-1.4 not really a pdf";
    let uploaded = client
        .post(format!("{}/api/papers", address))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({
            "subject": "Physics",
            "file_name": "board-mock-2026.pdf",
            "mime_type": "application/pdf",
            "data": BASE64.encode(payload),
            "accessible_institute_ids": [institute_ids[0]],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(uploaded.status().as_u16(), 201);
    let paper_id = uploaded.json::<Value>().await.unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    // Granted institute sees and downloads it, losslessly.
    let t1 = institute_token(&institute_ids[0]);
    let visible: Vec<Value> = client
        .get(format!("{}/api/papers", address))
        .header("Authorization", format!("Bearer {}", t1))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(visible.len(), 1);

    let download: Value = client
        .get(format!("{}/api/papers/{}", address, paper_id))
        .header("Authorization", format!("Bearer {}", t1))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let bytes = BASE64.decode(download["data"].as_str().unwrap()).unwrap();
    assert_eq!(bytes, payload);

    // The other institute sees nothing, and a direct read is NotFound.
    let t2 = institute_token(&institute_ids[1]);
    let hidden: Vec<Value> = client
        .get(format!("{}/api/papers", address))
        .header("Authorization", format!("Bearer {}", t2))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(hidden.is_empty());

    let denied = client
        .get(format!("{}/api/papers/{}", address, paper_id))
        .header("Authorization", format!("Bearer {}", t2))
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status().as_u16(), 404);

    // Widening the access list makes it visible.
    client
        .put(format!("{}/api/papers/{}/access", address, paper_id))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({ "accessible_institute_ids": institute_ids }))
        .send()
        .await
        .unwrap();
    let now_visible: Vec<Value> = client
        .get(format!("{}/api/papers", address))
        .header("Authorization", format!("Bearer {}", t2))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(now_visible.len(), 1);

    // Students have no paper surface at all.
    let student = client
        .get(format!("{}/api/papers", address))
        .header("Authorization", format!("Bearer {}", student_token("s1")))
        .send()
        .await
        .unwrap();
    assert_eq!(student.status().as_u16(), 403);
}

#[tokio::test]
async fn institute_management_is_admin_only() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let forbidden = client
        .post(format!("{}/api/institutes", address))
        .header(
            "Authorization",
            format!("Bearer {}", institute_token(&uuid::Uuid::new_v4().to_string())),
        )
        .json(&json!({ "name": "Rogue", "email": "rogue@example.org" }))
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status().as_u16(), 403);

    let admin = admin_token();
    let created = client
        .post(format!("{}/api/institutes", address))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({ "name": "Cascadia Coaching", "email": "office@example.org" }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status().as_u16(), 201);
    let id = created.json::<Value>().await.unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let updated = client
        .put(format!("{}/api/institutes/{}", address, id))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({ "name": "Cascadia Coaching Centre" }))
        .send()
        .await
        .unwrap();
    assert_eq!(updated.status().as_u16(), 200);
    assert_eq!(
        updated.json::<Value>().await.unwrap()["name"],
        "Cascadia Coaching Centre"
    );

    let deleted = client
        .delete(format!("{}/api/institutes/{}", address, id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 204);

    let missing = client
        .get(format!("{}/api/institutes/{}", address, id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}
