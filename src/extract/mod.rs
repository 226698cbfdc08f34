// src/extract/mod.rs

pub mod client;

pub use client::ExtractionClient;

use serde::{Deserialize, Serialize};

use crate::models::question::QuestionKind;

/// A document submitted for digitization. HTML travels as UTF-8 text,
/// everything else as binary content with a declared MIME type.
#[derive(Debug, Clone)]
pub enum Document {
    Html(String),
    Binary { mime_type: String, data: Vec<u8> },
}

impl Document {
    pub fn is_empty(&self) -> bool {
        match self {
            Document::Html(text) => text.trim().is_empty(),
            Document::Binary { data, .. } => data.is_empty(),
        }
    }
}

/// One question as reported by the model. Field names mirror the declared
/// output schema, which is part of the collaborator contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedQuestion {
    pub question: String,

    #[serde(rename = "type")]
    pub kind: QuestionKind,

    #[serde(default)]
    pub options: Vec<String>,

    pub answer: String,

    #[serde(rename = "diagramSvg", skip_serializing_if = "Option::is_none")]
    pub diagram_svg: Option<String>,
}

/// The structured result of digitizing one paper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    #[serde(rename = "testTitle")]
    pub test_title: String,

    /// Subject as reported by the model; free text at this point, mapped to
    /// the fixed subject set when a test or bank entry is created from it.
    pub subject: String,

    pub questions: Vec<ExtractedQuestion>,
}
