//! DTOs for the PDF Q&A backend.
//!
//! # Design
//! These mirror the mock-server's schema but are defined independently so
//! the client is not coupled to Axum internals; integration tests catch drift.
//! Reply types are lenient: the backend reports application-level failures
//! inside 2xx bodies (`error`, non-success `status`), so almost every field is
//! optional and the caller inspects what is present.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Body of `POST /ai`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskQuery {
    pub query: String,
}

/// Body of `POST /ask_pdf`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskPdfQuery {
    pub query: String,
    #[serde(rename = "promptType")]
    pub prompt_type: String,
}

/// Body of `POST /delete_pdf`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub file_name: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AiAnswer {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// How often one document contributed context.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct UsageStat {
    pub count: u64,
    pub percentage: f64,
}

/// Usage keyed by document source.
pub type Usage = BTreeMap<String, UsageStat>;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PdfAnswer {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub disclaimer: Option<String>,
    #[serde(default)]
    pub pdf_usage: Option<Usage>,
    #[serde(default)]
    pub query_usage: Option<Usage>,
}

/// Reply of `POST /pdf`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct UploadReply {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub doc_len: Option<u64>,
    #[serde(default)]
    pub chunk_len: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl UploadReply {
    pub const SUCCESS: &'static str = "Successfully Uploaded";

    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some(Self::SUCCESS)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentEntry {
    pub source: String,
}

/// Reply of `GET /list_documents`. An empty store answers with only a
/// `message`, so `documents` defaults to empty.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct DocumentList {
    #[serde(default)]
    pub documents: Vec<DocumentEntry>,
}

/// Generic `{status?, error?}` reply shared by the mutation endpoints.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct StatusReply {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Reply of `GET /pdf_usage`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct UsageReport {
    #[serde(default)]
    pub pdf_usage: Usage,
}

/// Reply of `GET /prompts`: prompt key to its definition, in server order.
pub type Prompts = serde_json::Map<String, serde_json::Value>;
