//! Protocol tests for the connection state machine, driven over an
//! in-memory duplex stream.

use ficserver::config::Config;
use ficserver::http::connection::{Connection, IdleTimeout};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

const INDEX: &[u8] = b"<h1>Welcome</h1>\n";
const ERROR_400: &[u8] = b"<h1>400 Bad Request</h1>\n";
const ERROR_404: &[u8] = b"<h1>404 Not Found</h1>\n";

fn document_root() -> tempfile::TempDir {
    let root = tempfile::tempdir().unwrap();
    write_file(root.path(), "index.html", INDEX, 1_704_067_200);
    write_file(root.path(), "error400.html", ERROR_400, 1_700_000_000);
    write_file(root.path(), "error404.html", ERROR_404, 1_700_000_000);
    root
}

fn write_file(root: &Path, name: &str, contents: &[u8], mtime: u64) {
    let path = root.join(name);
    fs::write(&path, contents).unwrap();
    let file = fs::File::options().write(true).open(&path).unwrap();
    file.set_modified(UNIX_EPOCH + Duration::from_secs(mtime)).unwrap();
}

fn config_for(root: &Path) -> Arc<Config> {
    let mut cfg = Config::default();
    cfg.static_files.root = root.to_path_buf();
    cfg.server.idle_timeout_secs = 2;
    Arc::new(cfg)
}

fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

/// Sends `request`, lets the connection run to completion and returns
/// everything written back plus the connection's result.
async fn exchange(cfg: Arc<Config>, request: &[u8]) -> (Vec<u8>, anyhow::Result<()>) {
    let (mut client, server) = tokio::io::duplex(64 * 1024);

    let handle = tokio::spawn(async move {
        let mut conn = Connection::new(server, peer(), cfg);
        conn.run().await
    });

    client.write_all(request).await.unwrap();
    client.shutdown().await.unwrap();

    let mut response = Vec::new();
    client.read_to_end(&mut response).await.unwrap();

    (response, handle.await.unwrap())
}

fn split_response(raw: &[u8]) -> (String, Vec<u8>) {
    let end = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("header block terminator");
    let head = String::from_utf8(raw[..end + 4].to_vec()).unwrap();
    (head, raw[end + 4..].to_vec())
}

fn strip_date(head: &str) -> String {
    head.lines()
        .filter(|line| !line.starts_with("Date: "))
        .collect::<Vec<_>>()
        .join("\n")
}

#[tokio::test]
async fn test_get_existing_resource() {
    let root = document_root();
    let (raw, result) = exchange(config_for(root.path()), b"GET /index.html HTTP/1.0\r\n\r\n").await;
    result.unwrap();

    let (head, body) = split_response(&raw);
    assert!(head.starts_with("HTTP/1.0 200 OK\r\n"));
    assert!(head.contains("\r\nDate: "));
    assert!(head.contains("\r\nServer: ficServer/0.0.1 (Rust)\r\n"));
    assert!(head.contains("\r\nLast-Modified: Mon, 1 Jan 2024 00:00:00 GMT\r\n"));
    assert!(head.contains("\r\nContent-Length: 17\r\n"));
    assert!(head.contains("\r\nContent-Type: text/html\r\n"));
    assert_eq!(body, INDEX);
}

#[tokio::test]
async fn test_get_with_headers_and_bare_newlines() {
    let root = document_root();
    let request = b"GET /index.html HTTP/1.0\nHost: localhost\nUser-Agent: test\n\n";
    let (raw, result) = exchange(config_for(root.path()), request).await;
    result.unwrap();

    let (head, body) = split_response(&raw);
    assert!(head.starts_with("HTTP/1.0 200 OK\r\n"));
    assert_eq!(body, INDEX);
}

#[tokio::test]
async fn test_conditional_get_not_modified() {
    let root = document_root();
    let request = b"GET /index.html HTTP/1.0\r\nIf-Modified-Since: Mon, 1 Jan 2024 00:00:00 GMT\r\n\r\n";
    let (raw, result) = exchange(config_for(root.path()), request).await;
    result.unwrap();

    let (head, body) = split_response(&raw);
    assert!(head.starts_with("HTTP/1.0 304 Not Modified\r\n"));
    assert!(head.contains("\r\nServer: "));
    assert!(!head.contains("Content-Length"));
    assert!(!head.contains("Content-Type"));
    assert!(!head.contains("Last-Modified"));
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_conditional_get_client_date_later() {
    let root = document_root();
    let request = b"GET /index.html HTTP/1.0\r\nIf-Modified-Since: Fri, 14 Jun 2024 08:00:00 GMT\r\n\r\n";
    let (raw, _) = exchange(config_for(root.path()), request).await;

    let (head, body) = split_response(&raw);
    assert!(head.starts_with("HTTP/1.0 304 Not Modified\r\n"));
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_conditional_get_modified() {
    let root = document_root();
    let request = b"GET /index.html HTTP/1.0\r\nIf-Modified-Since: Sun, 31 Dec 2023 23:59:59 GMT\r\n\r\n";
    let (raw, _) = exchange(config_for(root.path()), request).await;

    let (head, body) = split_response(&raw);
    assert!(head.starts_with("HTTP/1.0 200 OK\r\n"));
    assert_eq!(body, INDEX);
}

#[tokio::test]
async fn test_conditional_get_unparseable_date_serves_resource() {
    let root = document_root();
    let request = b"GET /index.html HTTP/1.0\r\nIf-Modified-Since: last tuesday\r\n\r\n";
    let (raw, result) = exchange(config_for(root.path()), request).await;
    result.unwrap();

    let (head, body) = split_response(&raw);
    assert!(head.starts_with("HTTP/1.0 200 OK\r\n"));
    assert_eq!(body, INDEX);
}

#[tokio::test]
async fn test_repeated_if_modified_since_last_one_wins() {
    let root = document_root();
    let request = b"GET /index.html HTTP/1.0\r\n\
        If-Modified-Since: Fri, 14 Jun 2024 08:00:00 GMT\r\n\
        If-Modified-Since: Sun, 31 Dec 2023 23:59:59 GMT\r\n\r\n";
    let (raw, result) = exchange(config_for(root.path()), request).await;
    result.unwrap();

    let (head, body) = split_response(&raw);
    assert!(head.starts_with("HTTP/1.0 200 OK\r\n"));
    assert_eq!(body, INDEX);
}

#[tokio::test]
async fn test_eof_inside_header_block_ends_headers() {
    let root = document_root();
    let (raw, result) = exchange(config_for(root.path()), b"GET /index.html HTTP/1.0\r\nHost: x").await;
    result.unwrap();

    let (head, body) = split_response(&raw);
    assert!(head.starts_with("HTTP/1.0 200 OK\r\n"));
    assert!(head.contains("\r\nContent-Length: 17\r\n"));
    assert_eq!(body, INDEX);
}

#[tokio::test]
async fn test_head_existing_resource_matches_get_headers() {
    let root = document_root();
    let cfg = config_for(root.path());

    let (get_raw, _) = exchange(cfg.clone(), b"GET /index.html HTTP/1.0\r\n\r\n").await;
    let (head_raw, result) = exchange(cfg, b"HEAD /index.html HTTP/1.0\r\n\r\n").await;
    result.unwrap();

    let (get_head, _) = split_response(&get_raw);
    let (head_head, head_body) = split_response(&head_raw);
    assert_eq!(strip_date(&get_head), strip_date(&head_head));
    assert!(head_body.is_empty());
}

#[tokio::test]
async fn test_get_missing_resource() {
    let root = document_root();
    let (raw, result) = exchange(config_for(root.path()), b"GET /missing.html HTTP/1.0\r\n\r\n").await;
    result.unwrap();

    let (head, body) = split_response(&raw);
    assert!(head.starts_with("HTTP/1.0 404 Not Found\r\n"));
    assert!(head.contains(&format!("\r\nContent-Length: {}\r\n", ERROR_404.len())));
    assert_eq!(body, ERROR_404);
}

#[tokio::test]
async fn test_head_missing_resource() {
    let root = document_root();
    let (raw, result) = exchange(config_for(root.path()), b"HEAD /missing.html HTTP/1.0\r\n\r\n").await;
    result.unwrap();

    let (head, body) = split_response(&raw);
    assert!(head.starts_with("HTTP/1.0 404 Not Found\r\n"));
    assert!(head.contains(&format!("\r\nContent-Length: {}\r\n", ERROR_404.len())));
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_unsupported_method() {
    let root = document_root();
    let (raw, result) = exchange(config_for(root.path()), b"POST /x HTTP/1.0\r\nContent-Length: 0\r\n\r\n").await;
    result.unwrap();

    let (head, body) = split_response(&raw);
    assert!(head.starts_with("HTTP/1.0 400 Bad Request\r\n"));
    assert_eq!(body, ERROR_400);
}

#[tokio::test]
async fn test_path_traversal_is_not_found() {
    let root = document_root();
    let (raw, _) = exchange(config_for(root.path()), b"GET /../index.html HTTP/1.0\r\n\r\n").await;

    let (head, body) = split_response(&raw);
    assert!(head.starts_with("HTTP/1.0 404 Not Found\r\n"));
    assert_eq!(body, ERROR_404);
}

#[tokio::test]
async fn test_single_token_request_line_gets_no_response() {
    let root = document_root();
    let (raw, result) = exchange(config_for(root.path()), b"GET\r\n\r\n").await;

    result.unwrap();
    assert!(raw.is_empty());
}

#[tokio::test]
async fn test_closed_before_request_gets_no_response() {
    let root = document_root();
    let (raw, result) = exchange(config_for(root.path()), b"").await;

    result.unwrap();
    assert!(raw.is_empty());
}

#[tokio::test]
async fn test_missing_error_document_closes_without_response() {
    let root = document_root();
    fs::remove_file(root.path().join("error404.html")).unwrap();

    let (raw, result) = exchange(config_for(root.path()), b"GET /missing.html HTTP/1.0\r\n\r\n").await;

    assert!(result.is_err());
    assert!(raw.is_empty());
}

#[tokio::test]
async fn test_repeated_get_is_identical_apart_from_date() {
    let root = document_root();
    let cfg = config_for(root.path());

    let (first, _) = exchange(cfg.clone(), b"GET /index.html HTTP/1.0\r\n\r\n").await;
    let (second, _) = exchange(cfg, b"GET /index.html HTTP/1.0\r\n\r\n").await;

    let (first_head, first_body) = split_response(&first);
    let (second_head, second_body) = split_response(&second);
    assert_eq!(strip_date(&first_head), strip_date(&second_head));
    assert_eq!(first_body, second_body);
}

#[tokio::test]
async fn test_body_larger_than_one_chunk() {
    let root = document_root();
    let big: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
    fs::write(root.path().join("big.bin"), &big).unwrap();

    let (raw, result) = exchange(config_for(root.path()), b"GET /big.bin HTTP/1.0\r\n\r\n").await;
    result.unwrap();

    let (head, body) = split_response(&raw);
    assert!(head.contains("\r\nContent-Length: 5000\r\n"));
    assert_eq!(body, big);
}

#[tokio::test]
async fn test_idle_connection_times_out() {
    let root = document_root();
    let mut cfg = Config::default();
    cfg.static_files.root = root.path().to_path_buf();
    cfg.server.idle_timeout_secs = 1;

    let (_client, server) = tokio::io::duplex(1024);
    let mut conn = Connection::new(server, peer(), Arc::new(cfg));

    let err = conn.run().await.unwrap_err();
    assert!(err.is::<IdleTimeout>());
}
