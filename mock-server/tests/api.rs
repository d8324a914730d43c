use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, AiReply, PdfReply, UploadReply};
use serde_json::Value;
use tower::{Service, ServiceExt};

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn post_empty(uri: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(String::new())
        .unwrap()
}

fn upload_request(file_name: &str, content: &str) -> Request<String> {
    let body = format!(
        "--BOUNDARY\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
         Content-Type: application/pdf\r\n\
         \r\n\
         {content}\r\n\
         --BOUNDARY--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri("/pdf")
        .header(http::header::CONTENT_TYPE, "multipart/form-data; boundary=BOUNDARY")
        .body(body)
        .unwrap()
}

async fn call<S>(app: &mut S, req: Request<String>) -> axum::response::Response
where
    S: Service<Request<String>, Response = axum::response::Response, Error = std::convert::Infallible>,
{
    ServiceExt::ready(app).await.unwrap().call(req).await.unwrap()
}

// --- prompts ---

#[tokio::test]
async fn prompts_lists_all_prompt_types() {
    let resp = app().oneshot(get("/prompts")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let prompts: serde_json::Map<String, Value> = body_json(resp).await;
    let keys: Vec<_> = prompts.keys().map(String::as_str).collect();
    let expected: Vec<_> = mock_server::PROMPTS.iter().map(|(key, _)| *key).collect();
    assert_eq!(keys, expected);
}

// --- ai ---

#[tokio::test]
async fn ask_ai_answers() {
    let resp = app()
        .oneshot(json_request("/ai", r#"{"query":"hello"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let reply: AiReply = body_json(resp).await;
    assert!(reply.answer.contains("hello"));
}

#[tokio::test]
async fn ask_ai_without_query_returns_400() {
    let resp = app().oneshot(json_request("/ai", r#"{}"#)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "No 'query' found in JSON request");
}

#[tokio::test]
async fn ask_ai_with_malformed_json_is_rejected() {
    let resp = app().oneshot(json_request("/ai", "not json")).await.unwrap();
    assert!(resp.status().is_client_error());
}

// --- ask_pdf ---

#[tokio::test]
async fn ask_pdf_unknown_prompt_returns_400() {
    let resp = app()
        .oneshot(json_request("/ask_pdf", r#"{"query":"q","promptType":"Poetry"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "Unknown prompt type");
}

#[tokio::test]
async fn ask_pdf_without_documents_returns_disclaimer() {
    let resp = app()
        .oneshot(json_request("/ask_pdf", r#"{"query":"q","promptType":"Summary"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let reply: PdfReply = body_json(resp).await;
    assert!(reply.disclaimer.is_some());
    assert!(reply.pdf_usage.is_empty());
    assert!(reply.query_usage.is_empty());
}

// --- upload ---

#[tokio::test]
async fn upload_without_multipart_body_is_rejected() {
    let resp = app()
        .oneshot(json_request("/pdf", r#"{"file":"nope"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_with_empty_file_name_returns_400() {
    let resp = app().oneshot(upload_request("", "%PDF")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "No selected file");
}

// --- list / delete ---

#[tokio::test]
async fn list_documents_empty() {
    let resp = app().oneshot(get("/list_documents")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body, serde_json::json!({"message": "No documents found"}));
}

#[tokio::test]
async fn delete_unknown_file_returns_404() {
    let resp = app()
        .oneshot(json_request("/delete_pdf", r#"{"file_name":"ghost.pdf"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["status"], "No documents found for the provided file name");
}

#[tokio::test]
async fn delete_without_file_name_returns_400() {
    let resp = app()
        .oneshot(json_request("/delete_pdf", r#"{}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn serve_missing_pdf_returns_404() {
    let resp = app().oneshot(get("/pdfs/none.pdf")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full document lifecycle ---

#[tokio::test]
async fn document_lifecycle() {
    let mut app = app().into_service::<String>();

    // upload a document spanning three chunks
    let content = "x".repeat(2500);
    let resp = call(&mut app, upload_request("Report.pdf", &content)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let uploaded: UploadReply = body_json(resp).await;
    assert_eq!(uploaded.status, "Successfully Uploaded");
    assert_eq!(uploaded.filename, "Report.pdf");
    assert_eq!(uploaded.doc_len, 1);
    assert_eq!(uploaded.chunk_len, 3);

    // same name again
    let resp = call(&mut app, upload_request("Report.pdf", "other")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "File already exists.");

    // same bytes under another name
    let resp = call(&mut app, upload_request("copy.pdf", &content)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "File with identical content already exists.");

    // list has one entry per chunk
    let resp = call(&mut app, get("/list_documents")).await;
    let body: Value = body_json(resp).await;
    let documents = body["documents"].as_array().unwrap();
    assert_eq!(documents.len(), 3);
    assert!(documents.iter().all(|d| d["source"] == "Report.pdf"));

    // stored bytes are served back
    let resp = call(&mut app, get("/pdfs/Report.pdf")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await.len(), 2500);

    // ask about it: usage counts every chunk
    let resp = call(
        &mut app,
        json_request("/ask_pdf", r#"{"query":"what?","promptType":"Technical"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let reply: PdfReply = body_json(resp).await;
    assert!(reply.disclaimer.is_none());
    assert_eq!(reply.sources.len(), 3);
    assert_eq!(reply.query_usage["Report.pdf"].count, 3);
    assert!((reply.query_usage["Report.pdf"].percentage - 100.0).abs() < 1e-9);
    assert_eq!(reply.pdf_usage["Report.pdf"].count, 3);

    // cumulative usage endpoint
    let resp = call(&mut app, get("/pdf_usage")).await;
    let body: Value = body_json(resp).await;
    assert_eq!(body["pdf_usage"]["Report.pdf"]["count"], 3);

    // delete matches case-insensitively
    let resp = call(&mut app, json_request("/delete_pdf", r#"{"file_name":" report.PDF "}"#)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["status"], "success");

    let resp = call(&mut app, get("/list_documents")).await;
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "No documents found");

    // clear endpoints
    let resp = call(&mut app, upload_request("b.pdf", "bbb")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = call(&mut app, post_empty("/clear_db")).await;
    let body: Value = body_json(resp).await;
    assert_eq!(body["status"], "Database and files cleared successfully");
    let resp = call(&mut app, get("/pdfs/b.pdf")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = call(&mut app, post_empty("/clear_chat_history")).await;
    let body: Value = body_json(resp).await;
    assert_eq!(body["status"], "Chat history cleared successfully");
}
