//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! crate builds `HttpRequest` values and parses `HttpResponse` values; the
//! actual round-trip is delegated to a `Transport` supplied by the host (the
//! CLI uses ureq, tests use either ureq or a scripted fake).
//!
//! Bodies are raw bytes because uploads carry binary PDF content. JSON and
//! multipart bodies are encoded by the client, which also sets the matching
//! `content-type` header, so a transport only has to forward what it is given.

use thiserror::Error;

/// HTTP method for a request. The backend only uses GET and POST.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data.
///
/// `path` is the endpoint relative to the base URL (e.g. `/ask_pdf`) and is
/// what error messages report; `url` is the absolute address to send to.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A failure below HTTP: connection refused, DNS, aborted read, etc.
///
/// The message is the transport's own and is surfaced to callers verbatim.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Executes one `HttpRequest` against the network.
///
/// Implementations must not treat non-2xx statuses as errors; status
/// interpretation belongs to `QaClient::parse_json`.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}
