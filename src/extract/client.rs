// src/extract/client.rs

use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use reqwest::Client;
use serde_json::{Value, json};

use crate::{
    config::Config,
    error::AppError,
    extract::{Document, ExtractionOutcome},
    models::question::answer_matches_options,
    utils::svg::sanitize_svg,
};

const EXTRACTION_PROMPT: &str = "You are digitizing a printed exam paper. \
Extract every question from the attached document exactly as printed, \
including its options and the correct answer where marked. Use the type \
'Multiple Choice' for choice questions. When a question references a figure, \
reproduce it as inline SVG in diagramSvg. Report the paper's title and its \
subject. Do not invent questions that are not in the document.";

/// Client for the generative-AI collaborator that turns uploaded exam papers
/// into structured question sets.
///
/// Purely functional: a call either yields a validated result or an error,
/// and leaves no state behind either way.
#[derive(Clone)]
pub struct ExtractionClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl ExtractionClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.model_base_url.clone(),
            api_key: config.model_api_key.clone(),
            model: config.model_name.clone(),
            timeout: Duration::from_secs(config.extraction_timeout_secs),
        }
    }

    /// Digitizes one document into a structured question set.
    ///
    /// The model call is schema-constrained; anything that comes back
    /// outside the declared shape is rejected as a malformed response and
    /// logged with the offending payload. Zero extracted questions is a
    /// reported failure, never an empty success.
    pub async fn extract(&self, document: &Document) -> Result<ExtractionOutcome, AppError> {
        if document.is_empty() {
            return Err(AppError::BadRequest("The document is empty".to_string()));
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            self.model,
            self.api_key
        );
        let body = build_request_body(document);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                AppError::UpstreamUnavailable(format!("Model request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamUnavailable(format!(
                "Model API error {}: {}",
                status, text
            )));
        }

        let raw = response.text().await.map_err(|e| {
            AppError::UpstreamUnavailable(format!("Failed to read model response: {}", e))
        })?;

        let envelope: Value = serde_json::from_str(&raw).map_err(|_| {
            tracing::error!("Model returned a non-JSON envelope: {}", raw);
            AppError::UpstreamMalformed("Model response was not valid JSON".to_string())
        })?;

        let content = envelope
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                tracing::error!("Model response carried no content: {}", raw);
                AppError::UpstreamMalformed("Model response carried no content".to_string())
            })?;

        let mut outcome: ExtractionOutcome = serde_json::from_str(content).map_err(|e| {
            tracing::error!(
                "Model output does not match the extraction schema ({}): {}",
                e,
                content
            );
            AppError::UpstreamMalformed(
                "Model output does not match the extraction schema".to_string(),
            )
        })?;

        if outcome.questions.is_empty() {
            return Err(AppError::BadRequest(
                "No questions detected in the document".to_string(),
            ));
        }

        for (index, question) in outcome.questions.iter_mut().enumerate() {
            if question.question.trim().is_empty() {
                tracing::error!("Question {} in model output is blank: {}", index + 1, content);
                return Err(AppError::UpstreamMalformed(format!(
                    "Question {} is blank",
                    index + 1
                )));
            }

            if !question.options.is_empty()
                && !answer_matches_options(&question.answer, &question.options)
            {
                tracing::error!(
                    "Question {} answer is not among its options: {}",
                    index + 1,
                    content
                );
                return Err(AppError::UpstreamMalformed(format!(
                    "Question {} carries an answer that is not among its options",
                    index + 1
                )));
            }

            // Diagram markup is untrusted model output.
            if let Some(svg) = question.diagram_svg.take() {
                question.diagram_svg = Some(sanitize_svg(&svg));
            }
        }

        Ok(outcome)
    }
}

fn build_request_body(document: &Document) -> Value {
    let document_part = match document {
        Document::Html(text) => json!({ "text": text }),
        Document::Binary { mime_type, data } => json!({
            "inline_data": {
                "mime_type": mime_type,
                "data": BASE64.encode(data),
            }
        }),
    };

    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": EXTRACTION_PROMPT }, document_part],
        }],
        "generationConfig": {
            "temperature": 0.1,
            "responseMimeType": "application/json",
            "responseSchema": response_schema(),
        }
    })
}

/// The structured-output schema the collaborator must honor. Downstream code
/// indexes into options/answer without existence checks, so constrained
/// generation is mandatory here, not advisory.
fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "testTitle": { "type": "STRING" },
            "subject": { "type": "STRING" },
            "questions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "question": { "type": "STRING" },
                        "type": { "type": "STRING" },
                        "options": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "answer": { "type": "STRING" },
                        "diagramSvg": { "type": "STRING" },
                    },
                    "required": ["question", "type", "answer"],
                }
            },
        },
        "required": ["testTitle", "subject", "questions"],
    })
}
