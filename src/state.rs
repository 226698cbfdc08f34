// src/state.rs

use axum::extract::FromRef;

use crate::{
    config::Config,
    extract::ExtractionClient,
    store::{InstituteStore, PaperStore, QuestionBank, ResultStore, TestStore},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub extractor: ExtractionClient,
    pub bank: QuestionBank,
    pub tests: TestStore,
    pub results: ResultStore,
    pub institutes: InstituteStore,
    pub papers: PaperStore,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let extractor = ExtractionClient::new(&config);
        Self {
            config,
            extractor,
            bank: QuestionBank::new(),
            tests: TestStore::new(),
            results: ResultStore::new(),
            institutes: InstituteStore::new(),
            papers: PaperStore::new(),
        }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for ExtractionClient {
    fn from_ref(state: &AppState) -> Self {
        state.extractor.clone()
    }
}

impl FromRef<AppState> for QuestionBank {
    fn from_ref(state: &AppState) -> Self {
        state.bank.clone()
    }
}

impl FromRef<AppState> for TestStore {
    fn from_ref(state: &AppState) -> Self {
        state.tests.clone()
    }
}

impl FromRef<AppState> for ResultStore {
    fn from_ref(state: &AppState) -> Self {
        state.results.clone()
    }
}

impl FromRef<AppState> for InstituteStore {
    fn from_ref(state: &AppState) -> Self {
        state.institutes.clone()
    }
}

impl FromRef<AppState> for PaperStore {
    fn from_ref(state: &AppState) -> Self {
        state.papers.clone()
    }
}
