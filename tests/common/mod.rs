//! Shared utilities for integration testing.

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Router;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use shortly_client::config::ClientConfig;
use shortly_client::http::ApiClient;
use shortly_client::models::UserInfo;
use shortly_client::session::{KeyValueStore, MemoryStore, SessionStore, SystemClock};
use shortly_client::ShortlyClient;

/// A request as seen by the mock backend.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl Captured {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

/// What the mock backend answers.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl Reply {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self::text(status, body.to_string())
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn ok(data: serde_json::Value) -> Self {
        Self::json(200, serde_json::json!({ "success": true, "message": "ok", "data": data }))
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Responder = dyn Fn(&Captured, usize) -> Reply + Send + Sync;

struct Inner {
    responder: Box<Responder>,
    captured: Mutex<Vec<Captured>>,
}

/// A programmable backend bound to an ephemeral local port.
///
/// The responder receives each request and its zero-based arrival index.
pub struct MockBackend {
    pub addr: SocketAddr,
    inner: Arc<Inner>,
}

impl MockBackend {
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&Captured, usize) -> Reply + Send + Sync + 'static,
    {
        let inner = Arc::new(Inner {
            responder: Box::new(responder),
            captured: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(handle).with_state(inner.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, inner }
    }

    /// A backend answering every request the same way.
    pub async fn fixed(reply: Reply) -> Self {
        Self::start(move |_, _| reply.clone()).await
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.inner.captured.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.inner.captured.lock().unwrap().len()
    }
}

async fn handle(State(inner): State<Arc<Inner>>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, usize::MAX).await.unwrap_or_default();

    let captured = Captured {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        headers: parts
            .headers
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect(),
        body: body.to_vec(),
    };

    let index = {
        let mut log = inner.captured.lock().unwrap();
        log.push(captured.clone());
        log.len() - 1
    };

    let reply = (inner.responder)(&captured, index);
    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }

    Response::builder()
        .status(StatusCode::from_u16(reply.status).unwrap())
        .header("content-type", "application/json")
        .body(Body::from(reply.body))
        .unwrap()
}

/// Config pointing at `backend` with millisecond-scale retry delays.
pub fn test_config(backend: &MockBackend) -> ClientConfig {
    let mut config = ClientConfig::default();
    config.api.base_url = backend.base_url();
    config.retries.base_delay_ms = 10;
    config.retries.max_delay_ms = 50;
    config.timeouts.request_ms = 2_000;
    config
}

pub fn user() -> UserInfo {
    UserInfo {
        id: 7,
        username: "kim".into(),
        email: "kim@example.com".into(),
    }
}

/// An anonymous client with in-memory session storage.
pub fn anonymous_client(config: &ClientConfig) -> ShortlyClient {
    client_with_store(config, Arc::new(MemoryStore::new()))
}

/// A client already logged in with `token`.
pub fn logged_in_client(config: &ClientConfig, token: &str) -> ShortlyClient {
    let client = anonymous_client(config);
    client.session().login(user(), token.to_string()).unwrap();
    client
}

pub fn client_with_store(config: &ClientConfig, store: Arc<dyn KeyValueStore>) -> ShortlyClient {
    let api = ApiClient::new(config).unwrap();
    let session = Arc::new(SessionStore::new(
        store,
        Arc::new(SystemClock),
        Duration::from_secs(config.session.expiry_hours * 3600),
    ));
    session.restore();
    ShortlyClient::from_parts(api, session, config.uploads.clone())
}
