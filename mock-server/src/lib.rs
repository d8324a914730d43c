use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Bytes of PDF content per stored chunk.
pub const CHUNK_SIZE: usize = 1000;

pub const PROMPTS: &[(&str, &str)] = &[
    (
        "General AI Assistant",
        "You are an advanced AI assistant. Answer using the provided context.\n{context}\n{input}",
    ),
    (
        "Summary",
        "Summarize the provided documents concisely.\n{context}\n{input}",
    ),
    (
        "Essays Expert",
        "You are an expert essay writer. Use the documents as sources.\n{context}\n{input}",
    ),
    (
        "Technical",
        "Answer with precise technical detail from the documents.\n{context}\n{input}",
    ),
];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UsageStat {
    pub count: u64,
    pub percentage: f64,
}

pub type Usage = BTreeMap<String, UsageStat>;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Source {
    pub source: String,
    pub page_content: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AiReply {
    pub answer: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PdfReply {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    pub pdf_usage: Usage,
    pub query_usage: Usage,
    pub disclaimer: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadReply {
    pub status: String,
    pub filename: String,
    pub doc_len: usize,
    pub chunk_len: usize,
    pub is_structured: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub source: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentList {
    pub documents: Vec<DocumentEntry>,
}

#[derive(Deserialize)]
pub struct AskQuery {
    pub query: Option<String>,
}

#[derive(Deserialize)]
pub struct AskPdfQuery {
    pub query: Option<String>,
    #[serde(rename = "promptType")]
    pub prompt_type: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteRequest {
    pub file_name: Option<String>,
}

#[derive(Clone, Debug)]
struct Chunk {
    id: Uuid,
    source: String,
    content: String,
}

#[derive(Default)]
pub struct Backend {
    chunks: Vec<Chunk>,
    files: BTreeMap<String, Vec<u8>>,
    chat_history: Vec<String>,
    pdf_usage: BTreeMap<String, u64>,
}

pub type Db = Arc<RwLock<Backend>>;

type Rejection = (StatusCode, Json<serde_json::Value>);

fn reject(status: StatusCode, error: &str) -> Rejection {
    (status, Json(serde_json::json!({ "error": error })))
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Backend::default()));
    Router::new()
        .route("/prompts", get(list_prompts))
        .route("/ai", post(ask_ai))
        .route("/ask_pdf", post(ask_pdf))
        .route("/pdf", post(upload_pdf))
        .route("/list_documents", get(list_documents))
        .route("/delete_pdf", post(delete_pdf))
        .route("/clear_db", post(clear_db))
        .route("/clear_chat_history", post(clear_chat_history))
        .route("/pdf_usage", get(pdf_usage))
        .route("/pdfs/{filename}", get(serve_pdf))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Counts as percentages of their sum.
fn to_usage(counts: &BTreeMap<String, u64>) -> Usage {
    let total: u64 = counts.values().sum();
    counts
        .iter()
        .map(|(source, &count)| {
            let percentage = if total > 0 {
                count as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            (source.clone(), UsageStat { count, percentage })
        })
        .collect()
}

fn required(value: Option<String>, field: &str) -> Result<String, Rejection> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| reject(StatusCode::BAD_REQUEST, &format!("No '{field}' found in JSON request")))
}

async fn list_prompts() -> Json<serde_json::Map<String, serde_json::Value>> {
    Json(
        PROMPTS
            .iter()
            .map(|(key, template)| (key.to_string(), serde_json::Value::from(*template)))
            .collect(),
    )
}

async fn ask_ai(State(db): State<Db>, Json(input): Json<AskQuery>) -> Result<Json<AiReply>, Rejection> {
    let query = required(input.query, "query")?;
    tracing::info!(%query, "POST /ai");
    db.write().await.chat_history.push(query.clone());
    Ok(Json(AiReply {
        answer: format!("**Answer:** {query}"),
    }))
}

async fn ask_pdf(State(db): State<Db>, Json(input): Json<AskPdfQuery>) -> Result<Json<PdfReply>, Rejection> {
    let query = required(input.query, "query")?;
    let prompt_type = input
        .prompt_type
        .filter(|p| PROMPTS.iter().any(|(key, _)| key == p))
        .ok_or_else(|| reject(StatusCode::BAD_REQUEST, "Unknown prompt type"))?;
    tracing::info!(%query, %prompt_type, "POST /ask_pdf");

    let mut backend = db.write().await;
    if backend.chunks.is_empty() {
        return Ok(Json(PdfReply {
            answer: "No documents available to process your query.".to_string(),
            sources: Vec::new(),
            pdf_usage: Usage::new(),
            query_usage: Usage::new(),
            disclaimer: Some(
                "No documents available to process your query. Upload some PDFs to enable document search."
                    .to_string(),
            ),
        }));
    }

    // Every stored chunk is treated as retrieved context.
    let mut query_counts = BTreeMap::new();
    let sources: Vec<Source> = backend
        .chunks
        .iter()
        .map(|chunk| Source {
            source: chunk.source.clone(),
            page_content: chunk.content.clone(),
        })
        .collect();
    for source in &sources {
        *query_counts.entry(source.source.clone()).or_insert(0u64) += 1;
    }
    for (source, count) in &query_counts {
        *backend.pdf_usage.entry(source.clone()).or_insert(0) += count;
    }
    backend.chat_history.push(query.clone());

    let answer = format!(
        "**{prompt_type}**\n\n{query}\n\n{}",
        query_counts
            .keys()
            .map(|source| format!("* {source}"))
            .collect::<Vec<_>>()
            .join("\n")
    );
    Ok(Json(PdfReply {
        answer,
        sources,
        pdf_usage: to_usage(&backend.pdf_usage),
        query_usage: to_usage(&query_counts),
        disclaimer: None,
    }))
}

async fn upload_pdf(State(db): State<Db>, mut multipart: Multipart) -> Result<Json<UploadReply>, Rejection> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| reject(StatusCode::BAD_REQUEST, &e.body_text()))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| reject(StatusCode::BAD_REQUEST, &e.body_text()))?;
            upload = Some((file_name, bytes.to_vec()));
            break;
        }
    }
    let (file_name, data) = upload.ok_or_else(|| reject(StatusCode::BAD_REQUEST, "No file part in the request"))?;
    if file_name.is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "No selected file"));
    }

    let mut backend = db.write().await;
    if backend.files.contains_key(&file_name) {
        return Err(reject(StatusCode::BAD_REQUEST, "File already exists."));
    }
    if backend.files.values().any(|existing| *existing == data) {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            "File with identical content already exists.",
        ));
    }

    let pieces: Vec<String> = if data.is_empty() {
        vec![String::new()]
    } else {
        data.chunks(CHUNK_SIZE)
            .map(|piece| String::from_utf8_lossy(piece).into_owned())
            .collect()
    };
    let chunk_len = pieces.len();
    for content in pieces {
        backend.chunks.push(Chunk {
            id: Uuid::new_v4(),
            source: file_name.clone(),
            content,
        });
    }
    tracing::info!(%file_name, chunk_len, bytes = data.len(), "stored PDF");
    backend.files.insert(file_name.clone(), data);

    Ok(Json(UploadReply {
        status: "Successfully Uploaded".to_string(),
        filename: file_name,
        doc_len: 1,
        chunk_len,
        is_structured: true,
    }))
}

async fn list_documents(State(db): State<Db>) -> Json<serde_json::Value> {
    let backend = db.read().await;
    if backend.chunks.is_empty() {
        return Json(serde_json::json!({ "message": "No documents found" }));
    }
    let list = DocumentList {
        documents: backend
            .chunks
            .iter()
            .map(|chunk| DocumentEntry {
                source: chunk.source.clone(),
            })
            .collect(),
    };
    Json(serde_json::json!(list))
}

async fn delete_pdf(
    State(db): State<Db>,
    Json(input): Json<DeleteRequest>,
) -> Result<Json<serde_json::Value>, Rejection> {
    let file_name = required(input.file_name, "file_name")?;
    let wanted = file_name.trim().to_lowercase();

    let mut backend = db.write().await;
    let doomed: Vec<Uuid> = backend
        .chunks
        .iter()
        .filter(|chunk| chunk.source.trim().to_lowercase() == wanted)
        .map(|chunk| chunk.id)
        .collect();
    if doomed.is_empty() {
        return Err((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "status": "No documents found for the provided file name" })),
        ));
    }
    backend.chunks.retain(|chunk| !doomed.contains(&chunk.id));
    backend
        .files
        .retain(|name, _| name.trim().to_lowercase() != wanted);
    tracing::info!(%file_name, chunks = doomed.len(), "deleted PDF");
    Ok(Json(serde_json::json!({ "status": "success" })))
}

async fn clear_db(State(db): State<Db>) -> Json<serde_json::Value> {
    let mut backend = db.write().await;
    backend.chunks.clear();
    backend.files.clear();
    tracing::info!("database cleared");
    Json(serde_json::json!({ "status": "Database and files cleared successfully" }))
}

async fn clear_chat_history(State(db): State<Db>) -> Json<serde_json::Value> {
    db.write().await.chat_history.clear();
    Json(serde_json::json!({ "status": "Chat history cleared successfully" }))
}

async fn pdf_usage(State(db): State<Db>) -> Json<serde_json::Value> {
    let backend = db.read().await;
    Json(serde_json::json!({ "pdf_usage": to_usage(&backend.pdf_usage) }))
}

async fn serve_pdf(State(db): State<Db>, Path(filename): Path<String>) -> impl IntoResponse {
    let backend = db.read().await;
    match backend.files.get(&filename) {
        Some(data) => Ok(([(header::CONTENT_TYPE, "application/pdf")], data.clone())),
        None => Err(StatusCode::NOT_FOUND),
    }
}
