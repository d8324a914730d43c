//! Terminal host for `pdfqa-core`: a blocking ureq `Transport` and a
//! `Presenter` that writes to stdout and stderr.

pub mod presenter;
pub mod transport;

pub use presenter::TerminalPresenter;
pub use transport::UreqTransport;
