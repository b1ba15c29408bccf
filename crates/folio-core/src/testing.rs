//! Test doubles shared by the unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::api::error::NetworkFailureKind;
use crate::api::{ApiError, HttpRequest, HttpResponse, Transport};
use crate::models::{RecordId, User};

pub(crate) fn user(id: i64, email: &str) -> User {
    User {
        id: RecordId::Number(id),
        email: email.to_string(),
        name: None,
        role: None,
        extra: Map::new(),
    }
}

/// Transport that replays queued outcomes in order and records every
/// request it was given.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Result<HttpResponse, ApiError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, status: u16, body: Value) {
        self.respond_raw(status, &body.to_string());
    }

    pub(crate) fn respond_raw(&self, status: u16, body: &str) {
        self.push(Ok(HttpResponse {
            status,
            body: body.to_string(),
        }));
    }

    pub(crate) fn fail_to_connect(&self) {
        self.push(Err(ApiError::Network {
            kind: NetworkFailureKind::Connect,
            target: "scripted".to_string(),
            reason: "connection refused".to_string(),
        }));
    }

    fn push(&self, outcome: Result<HttpResponse, ApiError>) {
        self.outcomes.lock().expect("outcomes lock").push_back(outcome);
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub(crate) fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("at least one request sent")
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.lock().expect("requests lock").push(request);
        self.outcomes
            .lock()
            .expect("outcomes lock")
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Local("no scripted response left".to_string())))
    }
}

/// One-shot HTTP/1.1 server on a random local port. Returns the base URL
/// and a handle yielding the raw request head (lowercased) and body.
pub(crate) async fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<(String, String)>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut raw = Vec::new();
        let mut chunk = [0u8; 1024];
        let head_end = loop {
            let n = socket.read(&mut chunk).await.expect("read");
            raw.extend_from_slice(&chunk[..n]);
            if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
            assert!(n > 0, "connection closed before end of headers");
        };
        let head = String::from_utf8_lossy(&raw[..head_end]).to_lowercase();
        let length = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        while raw.len() < head_end + length {
            let n = socket.read(&mut chunk).await.expect("read body");
            assert!(n > 0, "connection closed before end of body");
            raw.extend_from_slice(&chunk[..n]);
        }
        let request_body = String::from_utf8_lossy(&raw[head_end..]).to_string();

        let response = format!(
            "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.expect("write");
        socket.shutdown().await.ok();
        (head, request_body)
    });
    (format!("http://{}/api", addr), handle)
}
