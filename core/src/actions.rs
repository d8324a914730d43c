//! User-facing operations: one handler per thing a user can do.
//!
//! # Design
//! `Actions` borrows a `QaClient`, a `Transport` and a `Presenter`. Each
//! handler validates input, issues its request through `QaClient::execute`
//! and renders either the result or a readable failure. Failures are never
//! left for the host to present: by the time a handler returns `Err`, the
//! user has already seen why. The `Err` only tells the host the action did
//! not succeed (e.g. for an exit status).

use thiserror::Error;

use crate::client::QaClient;
use crate::error::ApiError;
use crate::http::Transport;
use crate::markdown;
use crate::types::{AiAnswer, DocumentList, PdfAnswer, Prompts, StatusReply, UploadReply, UsageReport};
use crate::view::{unique_sources, usage_html, Panel, Presenter, ToastKind, UsageScope, ViewState};

const CHAT_HISTORY_CLEARED: &str = "Chat history cleared successfully";
const DELETE_SUCCESS: &str = "success";

/// Why an action did not complete. Already shown to the user.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Input was rejected before any request was made.
    #[error("{0}")]
    Invalid(&'static str),

    #[error("cancelled")]
    Cancelled,

    /// The backend answered 2xx but reported a failure in the body.
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub type ActionResult = Result<(), ActionError>;

pub struct Actions<'a, T: Transport + ?Sized, P: Presenter + ?Sized> {
    client: &'a QaClient,
    transport: &'a T,
    presenter: &'a mut P,
}

impl<'a, T: Transport + ?Sized, P: Presenter + ?Sized> Actions<'a, T, P> {
    pub fn new(client: &'a QaClient, transport: &'a T, presenter: &'a mut P) -> Self {
        Self {
            client,
            transport,
            presenter,
        }
    }

    fn toast(&mut self, kind: ToastKind, message: impl Into<String>) {
        self.presenter.render(ViewState::toast(kind, message));
    }

    fn invalid(&mut self, message: &'static str) -> ActionResult {
        self.toast(ToastKind::Warning, message);
        Err(ActionError::Invalid(message))
    }

    /// Ask the general-purpose model.
    pub fn ask_ai(&mut self, query: &str) -> ActionResult {
        if query.is_empty() {
            return self.invalid("Please enter a query.");
        }
        self.presenter.render(ViewState::Loading { panel: Panel::Ai });

        let result = self
            .client
            .build_ask_ai(query)
            .and_then(|req| self.client.execute_as::<AiAnswer, _>(self.transport, &req));
        match result {
            Ok(reply) => {
                let html = answer_html(reply.answer.as_deref(), reply.error.as_deref());
                self.presenter.render(ViewState::Answer { panel: Panel::Ai, html });
                rejected_unless_answered(reply.answer, reply.error)
            }
            Err(e) => {
                self.presenter.render(ViewState::Answer {
                    panel: Panel::Ai,
                    html: format!("<p>An error occurred while processing the query: {e}</p>"),
                });
                Err(e.into())
            }
        }
    }

    /// Ask a question grounded in the stored PDFs.
    pub fn ask_pdf(&mut self, query: &str, prompt_type: &str) -> ActionResult {
        if query.is_empty() {
            return self.invalid("Please enter a query.");
        }
        self.presenter.render(ViewState::Loading { panel: Panel::Pdf });

        let result = self
            .client
            .build_ask_pdf(query, prompt_type)
            .and_then(|req| self.client.execute_as::<PdfAnswer, _>(self.transport, &req));
        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                self.presenter.render(ViewState::Answer {
                    panel: Panel::Pdf,
                    html: format!("<p>An error occurred while processing the PDF query: {e}</p>"),
                });
                return Err(e.into());
            }
        };

        let html = match reply.disclaimer.as_deref().filter(|d| !d.is_empty()) {
            Some(disclaimer) => format!("<p>{disclaimer}</p>"),
            None => answer_html(reply.answer.as_deref(), reply.error.as_deref()),
        };
        self.presenter.render(ViewState::Answer { panel: Panel::Pdf, html });

        if let Some(usage) = &reply.pdf_usage {
            self.presenter.render(ViewState::Usage {
                scope: UsageScope::Total,
                html: usage_html(UsageScope::Total, usage),
            });
        }
        if let Some(usage) = &reply.query_usage {
            self.presenter.render(ViewState::Usage {
                scope: UsageScope::PerQuery,
                html: usage_html(UsageScope::PerQuery, usage),
            });
        }
        rejected_unless_answered(reply.answer, reply.error)
    }

    /// Upload one PDF, then refresh the document list.
    pub fn upload_pdf(&mut self, file_name: &str, data: Vec<u8>) -> ActionResult {
        if file_name.is_empty() {
            return self.invalid("Please select a PDF file to upload.");
        }
        let req = self.client.build_upload_pdf(file_name, data);
        match self.client.execute_as::<UploadReply, _>(self.transport, &req) {
            Ok(reply) if reply.is_success() => {
                let message = format!(
                    "Success: {}\nFilename: {}\nLoaded {} documents\nLoaded len={} chunks",
                    UploadReply::SUCCESS,
                    reply.filename.as_deref().unwrap_or(file_name),
                    reply.doc_len.unwrap_or_default(),
                    reply.chunk_len.unwrap_or_default(),
                );
                self.toast(ToastKind::Success, message);
                // The upload stands even if the refresh fails.
                let _ = self.list_documents();
                Ok(())
            }
            Ok(reply) => {
                let message = reply
                    .error
                    .unwrap_or_else(|| "An error occurred during the upload.".to_string());
                self.toast(ToastKind::Error, message.clone());
                Err(ActionError::Rejected(message))
            }
            Err(e) => {
                let message = match (e.status(), e.detail()) {
                    (Some(400), Some(detail)) => detail.to_string(),
                    _ => format!("An error occurred while uploading the PDF: {e}"),
                };
                self.toast(ToastKind::Error, message);
                Err(e.into())
            }
        }
    }

    pub fn list_documents(&mut self) -> ActionResult {
        let req = self.client.build_list_documents();
        match self.client.execute_as::<DocumentList, _>(self.transport, &req) {
            Ok(list) => {
                self.presenter.render(ViewState::Documents {
                    sources: unique_sources(&list.documents),
                });
                Ok(())
            }
            Err(e) => {
                self.toast(
                    ToastKind::Error,
                    "An error occurred while listing documents. Please try again later.",
                );
                Err(e.into())
            }
        }
    }

    /// Delete one PDF after confirmation, then refresh the document list.
    pub fn delete_pdf(&mut self, file_name: &str) -> ActionResult {
        if !self
            .presenter
            .confirm(&format!("Are you sure you want to delete {file_name}?"))
        {
            return Err(ActionError::Cancelled);
        }
        let result = self
            .client
            .build_delete_pdf(file_name)
            .and_then(|req| self.client.execute_as::<StatusReply, _>(self.transport, &req));
        match result {
            Ok(reply) if reply.status.as_deref() == Some(DELETE_SUCCESS) => {
                self.toast(ToastKind::Success, "PDF deleted successfully.");
                let _ = self.list_documents();
                Ok(())
            }
            Ok(reply) => {
                let reason = reply.error.unwrap_or_else(|| "Unknown error".to_string());
                self.toast(ToastKind::Error, format!("Failed to delete PDF: {reason}"));
                Err(ActionError::Rejected(reason))
            }
            Err(e) => {
                self.toast(
                    ToastKind::Error,
                    format!("An error occurred while deleting the PDF: {e}"),
                );
                Err(e.into())
            }
        }
    }

    /// Remove every stored PDF after confirmation.
    pub fn clear_db(&mut self) -> ActionResult {
        if !self
            .presenter
            .confirm("Are you sure you want to delete all PDFs and clear the database?")
        {
            return Err(ActionError::Cancelled);
        }
        let req = self.client.build_clear_db();
        match self.client.execute_as::<StatusReply, _>(self.transport, &req) {
            Ok(StatusReply { error: Some(error), .. }) => {
                self.toast(ToastKind::Error, format!("Error: {error}"));
                Err(ActionError::Rejected(error))
            }
            Ok(_) => {
                self.toast(ToastKind::Success, "Database and files cleared successfully");
                let _ = self.list_documents();
                Ok(())
            }
            Err(e) => {
                self.toast(ToastKind::Error, format!("Network Error: {e}"));
                Err(e.into())
            }
        }
    }

    pub fn clear_chat_history(&mut self) -> ActionResult {
        let req = self.client.build_clear_chat_history();
        match self.client.execute_as::<StatusReply, _>(self.transport, &req) {
            Ok(reply) if reply.status.as_deref() == Some(CHAT_HISTORY_CLEARED) => {
                self.presenter.render(ViewState::ChatHistory {
                    message: "Chat history cleared successfully.".to_string(),
                });
                Ok(())
            }
            Ok(_) => {
                let message = "Failed to clear chat history.";
                self.presenter.render(ViewState::ChatHistory {
                    message: message.to_string(),
                });
                Err(ActionError::Rejected(message.to_string()))
            }
            Err(e) => {
                self.presenter.render(ViewState::ChatHistory {
                    message: format!("An error occurred while clearing chat history: {e}"),
                });
                Err(e.into())
            }
        }
    }

    /// Cumulative per-document usage since the backend started.
    pub fn show_usage(&mut self) -> ActionResult {
        let req = self.client.build_pdf_usage();
        match self.client.execute_as::<UsageReport, _>(self.transport, &req) {
            Ok(report) => {
                self.presenter.render(ViewState::Usage {
                    scope: UsageScope::Total,
                    html: usage_html(UsageScope::Total, &report.pdf_usage),
                });
                Ok(())
            }
            Err(e) => {
                self.toast(
                    ToastKind::Error,
                    "An error occurred while fetching PDF usage statistics.",
                );
                Err(e.into())
            }
        }
    }

    pub fn load_prompts(&mut self) -> ActionResult {
        let req = self.client.build_prompts();
        match self.client.execute_as::<Prompts, _>(self.transport, &req) {
            Ok(prompts) => {
                self.presenter.render(ViewState::Prompts {
                    keys: prompts.into_iter().map(|(key, _)| key).collect(),
                });
                Ok(())
            }
            Err(e) => {
                self.toast(ToastKind::Error, format!("Failed to load prompts: {e}"));
                Err(e.into())
            }
        }
    }
}

fn rejected_unless_answered(answer: Option<String>, error: Option<String>) -> ActionResult {
    match (answer, error) {
        (None, Some(error)) => Err(ActionError::Rejected(error)),
        _ => Ok(()),
    }
}

/// Rendered answer, or the backend's error text when there is no answer.
/// An empty answer without an error renders as an empty paragraph.
fn answer_html(answer: Option<&str>, error: Option<&str>) -> String {
    match markdown::render(answer) {
        html if html.is_empty() => format!("<p>{}</p>", error.unwrap_or_default()),
        html => html,
    }
}
