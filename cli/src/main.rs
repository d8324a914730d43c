use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pdfqa_cli::{TerminalPresenter, UreqTransport};
use pdfqa_core::{markdown, ActionResult, Actions, QaClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "pdfqa")]
#[command(about = "Ask questions about your PDFs from the terminal", long_about = None)]
struct Args {
    /// Backend base URL
    #[arg(long, default_value = "http://127.0.0.1:5000", env = "PDFQA_BASE_URL")]
    base_url: String,

    /// Answer yes to confirmation prompts
    #[arg(short, long)]
    yes: bool,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, default_value = "warn", env = "RUST_LOG")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask the general-purpose model
    Ask { query: Vec<String> },
    /// Ask a question answered from the stored PDFs
    AskPdf {
        /// Prompt template to answer with (see `prompts`)
        #[arg(short, long, default_value = "General AI Assistant")]
        prompt_type: String,
        query: Vec<String>,
    },
    /// Upload a PDF
    Upload { file: PathBuf },
    /// List stored documents
    List,
    /// Delete a stored document by name
    Delete { name: String },
    /// Delete every stored document
    ClearDb,
    /// Reset the conversation history
    ClearHistory,
    /// Show cumulative per-document usage
    Usage,
    /// List available prompt types
    Prompts,
    /// Render markdown from a file (or stdin) to HTML without contacting the backend
    Render { file: Option<PathBuf> },
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&args.log_level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let client = QaClient::new(&args.base_url);
    let transport = UreqTransport::new();
    let mut presenter = TerminalPresenter::new(std::io::stdout(), client.clone(), args.yes);
    let mut actions = Actions::new(&client, &transport, &mut presenter);
    tracing::debug!(base_url = %client.base_url(), "using backend");

    let outcome: ActionResult = match args.command {
        Command::Ask { query } => actions.ask_ai(&query.join(" ")),
        Command::AskPdf { prompt_type, query } => actions.ask_pdf(&query.join(" "), &prompt_type),
        Command::Upload { file } => {
            let data = std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            actions.upload_pdf(&name, data)
        }
        Command::List => actions.list_documents(),
        Command::Delete { name } => actions.delete_pdf(&name),
        Command::ClearDb => actions.clear_db(),
        Command::ClearHistory => actions.clear_chat_history(),
        Command::Usage => actions.show_usage(),
        Command::Prompts => actions.load_prompts(),
        Command::Render { file } => {
            let source = match file {
                Some(path) => std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
                    buf
                }
            };
            println!("{}", markdown::render(Some(&source)));
            Ok(())
        }
    };

    // The presenter has already shown the failure.
    if let Err(e) = outcome {
        tracing::debug!("action failed: {e}");
        std::process::exit(1);
    }
    Ok(())
}
