//! Client core for the PDF question-answering service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values for every
//! backend endpoint, renders answers from a small markdown subset to HTML,
//! and drives user actions against a host-supplied `Transport` and
//! `Presenter`.
//!
//! # Design
//! - `QaClient` is stateless; it holds only `base_url`.
//! - Each endpoint has a `build_*` method and every response goes through
//!   `QaClient::parse_json`, so the I/O boundary is explicit.
//!   `QaClient::execute` is the one place a request is sent and its failure
//!   normalized and logged.
//! - `markdown::render` is a pure function.
//! - `Actions` turns results into `ViewState`s; nothing here touches a
//!   terminal or a DOM.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod actions;
pub mod client;
pub mod error;
pub mod http;
pub mod markdown;
pub mod multipart;
pub mod types;
pub mod view;

pub use actions::{ActionError, ActionResult, Actions};
pub use client::{QaClient, RequestBody};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};
pub use multipart::MultipartForm;
pub use types::{
    AiAnswer, AskPdfQuery, AskQuery, DeleteRequest, DocumentEntry, DocumentList, PdfAnswer, Prompts,
    StatusReply, UploadReply, Usage, UsageReport, UsageStat,
};
pub use view::{Panel, Presenter, ToastKind, UsageScope, ViewState};
