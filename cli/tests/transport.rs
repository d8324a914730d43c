//! `UreqTransport` against a raw socket, for bodies the mock backend never
//! produces.

use std::io::{Read, Write};
use std::net::TcpListener;

use pdfqa_cli::UreqTransport;
use pdfqa_core::{ApiError, QaClient, Transport};

/// Accept one connection, drain the request head and answer with `status`
/// and the raw `body`.
fn respond_once(status: &'static str, body: &'static [u8]) -> QaClient {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&buf[..n]);
        }
        let reply = format!(
            "HTTP/1.1 {status}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        stream.write_all(reply.as_bytes()).unwrap();
        stream.write_all(body).unwrap();
        stream.flush().unwrap();
    });
    QaClient::new(&format!("http://{addr}"))
}

#[test]
fn non_2xx_is_returned_as_data() {
    let client = respond_once("404 Not Found", br#"{"status":"No documents found"}"#);
    let response = UreqTransport::new()
        .send(&client.build_list_documents())
        .unwrap();
    assert_eq!(response.status, 404);
    assert_eq!(response.body, r#"{"status":"No documents found"}"#);
    assert!(response
        .headers
        .iter()
        .any(|(name, value)| name == "content-type" && value == "text/plain"));
}

#[test]
fn non_utf8_error_body_keeps_path_and_status() {
    let client = respond_once("500 Internal Server Error", b"\xff\xfe boom");
    let err = client
        .execute(&UreqTransport::new(), &client.build_list_documents())
        .unwrap_err();
    assert!(matches!(err, ApiError::HttpStatus { status: 500, .. }));
    let message = err.to_string();
    assert!(message.contains("/list_documents"), "{message}");
    assert!(message.contains("500"), "{message}");
    assert!(message.contains("boom"), "{message}");
}

#[test]
fn non_utf8_success_body_is_invalid_json_with_path() {
    let client = respond_once("200 OK", b"\xff\xfe boom");
    let err = client
        .execute(&UreqTransport::new(), &client.build_list_documents())
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidJson { .. }));
    assert!(err.to_string().contains("/list_documents"));
}
