//! Stateless request builder and response parser for the PDF Q&A backend.
//!
//! # Design
//! `QaClient` holds only a `base_url` and carries no mutable state between
//! calls. Each endpoint has a `build_*` method that produces an `HttpRequest`.
//! Responses funnel through `parse_json`, the single place where transport
//! results are normalized into `ApiError`. `execute` ties one
//! `Transport::send` and `parse_json` together and emits the diagnostic log
//! line on failure; `execute_as` adds the typed decode the actions use.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::multipart::MultipartForm;
use crate::types::{AskPdfQuery, AskQuery, DeleteRequest};

pub const ASK_AI_PATH: &str = "/ai";
pub const ASK_PDF_PATH: &str = "/ask_pdf";
pub const UPLOAD_PDF_PATH: &str = "/pdf";
pub const LIST_DOCUMENTS_PATH: &str = "/list_documents";
pub const DELETE_PDF_PATH: &str = "/delete_pdf";
pub const CLEAR_DB_PATH: &str = "/clear_db";
pub const CLEAR_CHAT_HISTORY_PATH: &str = "/clear_chat_history";
pub const PROMPTS_PATH: &str = "/prompts";
pub const PDF_USAGE_PATH: &str = "/pdf_usage";

const JSON_CONTENT_TYPE: &str = "application/json";
const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Request body before encoding.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(Value),
    Multipart(MultipartForm),
}

/// Synchronous, stateless client for the PDF Q&A API.
#[derive(Debug, Clone)]
pub struct QaClient {
    base_url: String,
}

impl QaClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request for an arbitrary endpoint.
    ///
    /// JSON bodies get `content-type: application/json`; multipart bodies get
    /// the form's own content type so the boundary matches the payload.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<RequestBody>,
    ) -> Result<HttpRequest, ApiError> {
        let mut headers = Vec::new();
        let body = match body {
            None => None,
            Some(RequestBody::Json(value)) => {
                let bytes = serde_json::to_vec(&value).map_err(|e| ApiError::Serialization(e.to_string()))?;
                headers.push(("content-type".to_string(), JSON_CONTENT_TYPE.to_string()));
                Some(bytes)
            }
            Some(RequestBody::Multipart(form)) => {
                headers.push(("content-type".to_string(), form.content_type()));
                Some(form.encode())
            }
        };
        Ok(HttpRequest {
            method,
            path: path.to_string(),
            url: format!("{}{}", self.base_url, path),
            headers,
            body,
        })
    }

    fn build_json<T: Serialize>(&self, path: &str, input: &T) -> Result<HttpRequest, ApiError> {
        let value = serde_json::to_value(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.build_request(HttpMethod::Post, path, Some(RequestBody::Json(value)))
    }

    fn build_bodyless(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            path: path.to_string(),
            url: format!("{}{}", self.base_url, path),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_ask_ai(&self, query: &str) -> Result<HttpRequest, ApiError> {
        self.build_json(
            ASK_AI_PATH,
            &AskQuery {
                query: query.to_string(),
            },
        )
    }

    pub fn build_ask_pdf(&self, query: &str, prompt_type: &str) -> Result<HttpRequest, ApiError> {
        self.build_json(
            ASK_PDF_PATH,
            &AskPdfQuery {
                query: query.to_string(),
                prompt_type: prompt_type.to_string(),
            },
        )
    }

    pub fn build_upload_pdf(&self, file_name: &str, data: Vec<u8>) -> HttpRequest {
        let form = MultipartForm::new().file("file", file_name, PDF_CONTENT_TYPE, data);
        HttpRequest {
            method: HttpMethod::Post,
            path: UPLOAD_PDF_PATH.to_string(),
            url: format!("{}{}", self.base_url, UPLOAD_PDF_PATH),
            headers: vec![("content-type".to_string(), form.content_type())],
            body: Some(form.encode()),
        }
    }

    pub fn build_list_documents(&self) -> HttpRequest {
        self.build_bodyless(HttpMethod::Get, LIST_DOCUMENTS_PATH)
    }

    pub fn build_delete_pdf(&self, file_name: &str) -> Result<HttpRequest, ApiError> {
        self.build_json(
            DELETE_PDF_PATH,
            &DeleteRequest {
                file_name: file_name.to_string(),
            },
        )
    }

    pub fn build_clear_db(&self) -> HttpRequest {
        self.build_bodyless(HttpMethod::Post, CLEAR_DB_PATH)
    }

    pub fn build_clear_chat_history(&self) -> HttpRequest {
        self.build_bodyless(HttpMethod::Post, CLEAR_CHAT_HISTORY_PATH)
    }

    pub fn build_prompts(&self) -> HttpRequest {
        self.build_bodyless(HttpMethod::Get, PROMPTS_PATH)
    }

    pub fn build_pdf_usage(&self) -> HttpRequest {
        self.build_bodyless(HttpMethod::Get, PDF_USAGE_PATH)
    }

    /// Address of a stored PDF, for opening it outside the client.
    pub fn document_url(&self, source: &str) -> String {
        format!("{}/pdfs/{}", self.base_url, urlencoding::encode(source))
    }

    /// Normalize a response into a JSON value or a single `ApiError`.
    pub fn parse_json(&self, path: &str, response: HttpResponse) -> Result<Value, ApiError> {
        if !response.is_success() {
            return Err(ApiError::HttpStatus {
                path: path.to_string(),
                status: response.status,
                detail: error_detail(&response.body),
            });
        }
        serde_json::from_str(&response.body).map_err(|_| ApiError::InvalidJson {
            path: path.to_string(),
            body: response.body,
        })
    }

    /// Send `request` once and normalize the outcome.
    ///
    /// Failures are logged here, once, and then returned to the caller, which
    /// owns presentation.
    pub fn execute<T: Transport + ?Sized>(&self, transport: &T, request: &HttpRequest) -> Result<Value, ApiError> {
        tracing::debug!(method = request.method.as_str(), path = %request.path, "sending request");
        let result = transport
            .send(request)
            .map_err(|e| ApiError::Transport {
                path: request.path.clone(),
                message: e.to_string(),
            })
            .and_then(|response| self.parse_json(&request.path, response));
        if let Err(e) = &result {
            tracing::error!(path = %request.path, "API request error: {e}");
        }
        result
    }

    /// `execute` followed by a typed decode of the JSON value.
    pub fn execute_as<T: DeserializeOwned, R: Transport + ?Sized>(
        &self,
        transport: &R,
        request: &HttpRequest,
    ) -> Result<T, ApiError> {
        let value = self.execute(transport, request)?;
        decode(&request.path, value).inspect_err(|e| {
            tracing::error!(path = %request.path, "API request error: {e}");
        })
    }
}

fn decode<T: DeserializeOwned>(path: &str, value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::UnexpectedShape {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Extract the server's reason from an error body: the JSON `message` field,
/// then `error`, then a generic fallback; non-JSON bodies are used verbatim.
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => ["message", "error"]
            .iter()
            .find_map(|key| non_empty_field(&value, key))
            .unwrap_or_else(|| "Unknown error".to_string()),
        Err(_) => body.to_string(),
    }
}

fn non_empty_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
