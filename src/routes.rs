// src/routes.rs

use std::sync::Arc;

use axum::{
    Router, http::Method, middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{assembly, bank, extraction, institutes, papers, results},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware, staff_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (bank, tests, extraction, results, institutes, papers).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (stores, config, extraction client).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    // The model call is the one expensive upstream operation; keep it
    // behind a per-client rate limit.
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(5)
            .finish()
            .unwrap(),
    );

    let bank_routes = Router::new()
        .route(
            "/questions",
            get(bank::list_questions).post(bank::create_question),
        )
        .route("/questions/flagged", get(bank::list_flagged))
        .route(
            "/questions/{id}",
            put(bank::update_question).delete(bank::delete_question),
        )
        .route("/questions/{id}/flag", post(bank::flag_question))
        .route("/questions/{id}/unflag", post(bank::unflag_question))
        .route("/availability", get(bank::availability))
        // Curation is staff-only: Auth first, then role check
        .layer(middleware::from_fn(staff_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Mixed audience: creation and listing are staff concerns, reading a
    // single test is open to every authenticated role (students fetch their
    // assigned tests by id). Role checks live in the handlers.
    let test_routes = Router::new()
        .route("/", post(assembly::create_test).get(assembly::list_tests))
        .route("/from-paper", post(assembly::create_test_from_paper))
        .route(
            "/{id}",
            get(assembly::get_test)
                .put(assembly::update_test)
                .delete(assembly::delete_test),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let extraction_routes = Router::new()
        .route("/", post(extraction::extract_paper))
        .layer(GovernorLayer::new(governor_conf))
        .layer(middleware::from_fn(staff_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let result_routes = Router::new()
        .route("/", post(results::record_result))
        .route("/test/{id}", get(results::list_test_results))
        .route("/test/{id}/summary", get(results::test_summary))
        .route("/student/{id}", get(results::list_student_results))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let institute_routes = Router::new()
        .route(
            "/",
            get(institutes::list_institutes).post(institutes::create_institute),
        )
        .route(
            "/{id}",
            get(institutes::get_institute)
                .put(institutes::update_institute)
                .delete(institutes::delete_institute),
        )
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Reads are ACL-filtered in the store; uploads and access edits check
    // for the admin role in the handlers.
    let paper_routes = Router::new()
        .route("/", get(papers::list_papers).post(papers::upload_paper))
        .route("/{id}", get(papers::get_paper).delete(papers::delete_paper))
        .route("/{id}/access", put(papers::update_access))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api/bank", bank_routes)
        .nest("/api/tests", test_routes)
        .nest("/api/extraction", extraction_routes)
        .nest("/api/results", result_routes)
        .nest("/api/institutes", institute_routes)
        .nest("/api/papers", paper_routes)
        // Global Middleware (applied from outside in)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}
