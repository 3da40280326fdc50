//! Request identification and upstream addressing.
//!
//! # Responsibilities
//! - Generate a request ID (UUID v4) when the client sent none
//! - Propagate the request ID to the upstream and back to the client
//! - Rewrite request URIs onto the configured upstream
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Upstream path prefix is prepended; the original path and query are kept

use std::str::FromStr;

use axum::{
    http::{
        uri::{Authority, Scheme},
        HeaderName, Uri,
    },
    Router,
};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use url::Url;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generate a request id if missing, then propagate it to the response.
pub fn apply_request_id(router: Router) -> Router {
    router
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
        .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
}

/// Pre-parsed upstream address.
#[derive(Debug, Clone)]
pub struct Upstream {
    authority: Authority,
    base_path: String,
}

impl Upstream {
    /// Parse an absolute `http://host[:port][/prefix]` URL.
    pub fn parse(raw: &str) -> Option<Self> {
        let url = Url::parse(raw).ok()?;
        if url.scheme() != "http" {
            return None;
        }

        let host = url.host_str()?;
        let port = url.port_or_known_default()?;
        let authority = Authority::from_str(&format!("{host}:{port}")).ok()?;

        Some(Self {
            authority,
            base_path: url.path().trim_end_matches('/').to_string(),
        })
    }

    /// Map an inbound request URI onto the upstream.
    pub fn uri_for(&self, original: &Uri) -> Result<Uri, axum::http::Error> {
        let path_and_query = original
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");

        Uri::builder()
            .scheme(Scheme::HTTP)
            .authority(self.authority.clone())
            .path_and_query(format!("{}{}", self.base_path, path_and_query))
            .build()
    }
}
