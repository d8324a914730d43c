//! Terminal presentation of view states.
//!
//! Answers and usage blocks are printed as the HTML fragments the core
//! renders, on stdout. Toasts, progress and prompts go to stderr so that
//! stdout can be piped into a file or browser.

use std::io::{self, BufRead, Write};

use pdfqa_core::{QaClient, ViewState};

pub struct TerminalPresenter<W: Write> {
    out: W,
    client: QaClient,
    assume_yes: bool,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W, client: QaClient, assume_yes: bool) -> Self {
        Self {
            out,
            client,
            assume_yes,
        }
    }

    fn write_state(&mut self, state: ViewState) -> io::Result<()> {
        match state {
            ViewState::Loading { .. } => eprintln!("Fetching response, please wait..."),
            ViewState::Answer { html, .. } | ViewState::Usage { html, .. } => writeln!(self.out, "{html}")?,
            ViewState::Toast { kind, message } => eprintln!("[{kind}] {message}"),
            ViewState::Documents { sources } if sources.is_empty() => {
                writeln!(self.out, "No documents found.")?
            }
            ViewState::Documents { sources } => {
                for source in sources {
                    writeln!(self.out, "{source}\t{}", self.client.document_url(&source))?;
                }
            }
            ViewState::ChatHistory { message } => writeln!(self.out, "{message}")?,
            ViewState::Prompts { keys } => {
                for key in keys {
                    writeln!(self.out, "{key}")?;
                }
            }
        }
        self.out.flush()
    }
}

impl<W: Write> pdfqa_core::Presenter for TerminalPresenter<W> {
    fn render(&mut self, state: ViewState) {
        if let Err(e) = self.write_state(state) {
            tracing::warn!("failed to write output: {e}");
        }
    }

    fn confirm(&mut self, question: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{question} [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}
