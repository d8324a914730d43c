//! Error types for the PDF Q&A client.
//!
//! # Design
//! Every request failure is normalized into a single `ApiError` with one
//! composed message. Transport failures, non-2xx statuses and unparsable
//! bodies are the three channels the backend can produce; the remaining two
//! variants cover local encoding and typed decoding. Callers that only need a
//! human-readable string use `to_string()`; callers that branch on the
//! failure (e.g. "show only the server's reason for a 400") match on the
//! variant.

use thiserror::Error;

/// Errors returned by `QaClient`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("{message}")]
    Transport { path: String, message: String },

    /// The server answered with a status outside 200..=299. `detail` is the
    /// `message`/`error` field of a JSON body, or the raw body text.
    #[error("Failed to fetch from {path}. Status: {status}. Response: {detail}")]
    HttpStatus {
        path: String,
        status: u16,
        detail: String,
    },

    /// A 2xx response whose body is not JSON.
    #[error("Failed to parse JSON response from {path}. Response: {body}")]
    InvalidJson { path: String, body: String },

    /// Valid JSON that does not have the shape the caller asked for.
    #[error("Unexpected response from {path}: {message}")]
    UnexpectedShape { path: String, message: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status for `HttpStatus` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The server-provided reason, if the server provided one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::HttpStatus { detail, .. } => Some(detail),
            _ => None,
        }
    }
}
