//! View states handed to a presentation adapter.
//!
//! # Design
//! Actions never write to a screen directly. They describe what should be
//! shown as a `ViewState` and pass it to a `Presenter`, which the host
//! implements (the CLI prints to a terminal; tests record the states). The
//! helpers here are the pure formatting pieces shared by every presenter.

use std::collections::HashSet;
use std::fmt;

use crate::types::{DocumentEntry, Usage};

/// Response area an answer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    /// General-purpose answers from `/ai`.
    Ai,
    /// PDF-grounded answers from `/ask_pdf`.
    Pdf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ToastKind::Info => "info",
            ToastKind::Success => "success",
            ToastKind::Warning => "warning",
            ToastKind::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageScope {
    /// Cumulative across all queries.
    Total,
    /// The query just answered.
    PerQuery,
}

impl UsageScope {
    pub fn heading(self) -> &'static str {
        match self {
            UsageScope::Total => "PDF Usage Statistics In Total",
            UsageScope::PerQuery => "PDF Usage Statistics Per Query",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// A request for `panel` is in flight.
    Loading { panel: Panel },
    /// HTML fragment to show in `panel`.
    Answer { panel: Panel, html: String },
    /// Transient notification.
    Toast { kind: ToastKind, message: String },
    /// Stored documents, one entry per distinct source.
    Documents { sources: Vec<String> },
    Usage { scope: UsageScope, html: String },
    /// Outcome line of a chat-history reset.
    ChatHistory { message: String },
    /// Available prompt types for PDF queries.
    Prompts { keys: Vec<String> },
}

impl ViewState {
    pub fn toast(kind: ToastKind, message: impl Into<String>) -> Self {
        ViewState::Toast {
            kind,
            message: message.into(),
        }
    }
}

/// Host-side presentation adapter.
pub trait Presenter {
    fn render(&mut self, state: ViewState);

    /// Ask the user to approve a destructive action.
    fn confirm(&mut self, question: &str) -> bool;
}

impl<P: Presenter + ?Sized> Presenter for &mut P {
    fn render(&mut self, state: ViewState) {
        (**self).render(state)
    }

    fn confirm(&mut self, question: &str) -> bool {
        (**self).confirm(question)
    }
}

/// Distinct sources in first-seen order. The backend lists one entry per
/// stored chunk, so the same document usually appears many times.
pub fn unique_sources(documents: &[DocumentEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    documents
        .iter()
        .filter(|doc| seen.insert(doc.source.as_str()))
        .map(|doc| doc.source.clone())
        .collect()
}

pub fn usage_html(scope: UsageScope, usage: &Usage) -> String {
    let mut html = format!("<h3>{}</h3>", scope.heading());
    if usage.is_empty() {
        html.push_str("<p>No usage statistics available.</p>");
        return html;
    }
    html.push_str("<ul>");
    for (pdf, stat) in usage {
        html.push_str(&format!(
            "<li>{pdf}: {} queries ({:.2}%)</li>",
            stat.count, stat.percentage
        ));
    }
    html.push_str("</ul>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UsageStat;

    fn entry(source: &str) -> DocumentEntry {
        DocumentEntry {
            source: source.to_string(),
        }
    }

    #[test]
    fn unique_sources_keeps_first_occurrence_order() {
        let docs = [entry("b.pdf"), entry("a.pdf"), entry("b.pdf"), entry("a.pdf"), entry("c.pdf")];
        assert_eq!(unique_sources(&docs), vec!["b.pdf", "a.pdf", "c.pdf"]);
    }

    #[test]
    fn unique_sources_of_nothing_is_empty() {
        assert!(unique_sources(&[]).is_empty());
    }

    #[test]
    fn usage_html_lists_each_document() {
        let mut usage = Usage::new();
        usage.insert("a.pdf".to_string(), UsageStat { count: 3, percentage: 75.0 });
        usage.insert("b.pdf".to_string(), UsageStat { count: 1, percentage: 25.0 });
        assert_eq!(
            usage_html(UsageScope::Total, &usage),
            "<h3>PDF Usage Statistics In Total</h3><ul>\
             <li>a.pdf: 3 queries (75.00%)</li>\
             <li>b.pdf: 1 queries (25.00%)</li></ul>"
        );
    }

    #[test]
    fn usage_html_rounds_to_two_decimals() {
        let mut usage = Usage::new();
        usage.insert("x.pdf".to_string(), UsageStat { count: 1, percentage: 100.0 / 3.0 });
        assert!(usage_html(UsageScope::PerQuery, &usage).contains("(33.33%)"));
    }

    #[test]
    fn usage_html_reports_empty_stats() {
        assert_eq!(
            usage_html(UsageScope::PerQuery, &Usage::new()),
            "<h3>PDF Usage Statistics Per Query</h3><p>No usage statistics available.</p>"
        );
    }
}
