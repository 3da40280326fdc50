//! Shared utilities for integration tests.

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::{body::Body, http::Request, Json, Router};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use claims_proxy::config::ProxyConfig;
use claims_proxy::http::HttpServer;
use claims_proxy::lifecycle::Shutdown;

/// What the echo backend saw.
#[derive(Debug, Deserialize)]
pub struct Echo {
    pub path: String,
    pub headers: BTreeMap<String, Vec<String>>,
}

#[allow(dead_code)]
impl Echo {
    /// First value of `name` (lowercase).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn header_count(&self, name: &str) -> usize {
        self.headers.get(name).map_or(0, Vec::len)
    }
}

/// Start a backend that answers every request with the headers it received.
pub async fn start_echo_backend() -> SocketAddr {
    let app = Router::new().fallback(|req: Request<Body>| async move {
        let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in req.headers() {
            headers
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }
        let path = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_default();
        Json(json!({ "path": path, "headers": headers }))
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Start the proxy on an ephemeral port in front of `backend`.
///
/// Keep the returned `Shutdown` alive for the duration of the test.
pub async fn start_proxy(mut config: ProxyConfig, backend: SocketAddr) -> (SocketAddr, Shutdown) {
    config.upstream.url = format!("http://{backend}");

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config).unwrap();
    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        server.run(listener, receiver).await.unwrap();
    });

    (addr, shutdown)
}

/// Build an unsigned token from two JSON sections.
pub fn token(metadata: Value, claims: Value) -> String {
    let encode = |value: &Value| URL_SAFE_NO_PAD.encode(serde_json::to_vec(value).unwrap());
    format!("{}.{}.signature", encode(&metadata), encode(&claims))
}

#[allow(dead_code)]
pub fn hs256(claims: Value) -> String {
    token(json!({ "alg": "HS256", "typ": "JWT" }), claims)
}
