// src/config.rs

use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub jwt_expiration: u64,

    /// Generative-AI collaborator settings. The base URL is configurable so
    /// tests can point the client at a stub server.
    pub model_api_key: String,
    pub model_base_url: String,
    pub model_name: String,
    pub extraction_timeout_secs: u64,

    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86400);

        let model_api_key = env::var("MODEL_API_KEY").expect("MODEL_API_KEY must be set");

        let model_base_url = env::var("MODEL_BASE_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());
        url::Url::parse(&model_base_url).expect("MODEL_BASE_URL must be a valid URL");

        let model_name =
            env::var("MODEL_NAME").unwrap_or_else(|_| "gemini-2.0-flash".to_string());

        let extraction_timeout_secs = env::var("EXTRACTION_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            jwt_secret,
            jwt_expiration,
            model_api_key,
            model_base_url,
            model_name,
            extraction_timeout_secs,
            rust_log,
        }
    }
}
