// tests/common/mod.rs
//! Loopback HTTP stub for adapter tests, built on an axum fallback route.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::extract::State;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::response::IntoResponse;
use axum::Router;
use tokio::net::TcpListener;

/// One captured request: method with path and query, headers, body as text.
#[derive(Debug, Clone)]
pub struct Captured {
    pub line: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl Captured {
    pub fn request_line(&self) -> &str {
        &self.line
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

#[derive(Default)]
struct StubState {
    responses: Mutex<VecDeque<(u16, String)>>,
    captured: Mutex<Vec<Captured>>,
}

pub struct StubServer {
    pub base: String,
    state: Arc<StubState>,
}

impl StubServer {
    pub fn requests(&self) -> Vec<Captured> {
        self.state.captured.lock().unwrap().clone()
    }
}

/// Record the request, then answer with the next canned response (503 once they run out).
async fn respond(State(state): State<Arc<StubState>>, req: Request<Body>) -> impl IntoResponse {
    let (parts, body) = req.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();
    let target = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());
    state.captured.lock().unwrap().push(Captured {
        line: format!("{} {target}", parts.method),
        headers: parts.headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    });

    let (status, body) = state
        .responses
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or((503, "{}".to_string()));
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], body)
}

/// Serve canned `(status, json body)` responses in order on an ephemeral port.
pub async fn serve(responses: Vec<(u16, String)>) -> StubServer {
    let state = Arc::new(StubState {
        responses: Mutex::new(responses.into()),
        captured: Mutex::new(Vec::new()),
    });
    let app = Router::new().fallback(respond).with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    StubServer { base, state }
}
