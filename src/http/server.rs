//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the forwarding handler
//! - Wire up middleware (claims pipeline, timeout, request ID, tracing)
//! - Bind server to listener
//! - Forward requests to the configured upstream
//!
//! # Layer Order
//! ```text
//! TraceLayer → request ID → TimeoutLayer → claims middleware → forward_handler
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use tokio::{net::TcpListener, sync::broadcast};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::loader::join_errors;
use crate::config::{validation::validate_config, ProxyConfig, ValidationError};
use crate::http::middleware::claims;
use crate::http::request::{apply_request_id, Upstream, X_REQUEST_ID};
use crate::http::response::bad_gateway;
use crate::pipeline::ClaimsPipeline;

/// Errors that prevent the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {}", join_errors(.0))]
    Config(Vec<ValidationError>),

    #[error("upstream url '{0}' is not usable")]
    InvalidUpstream(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: Client<HttpConnector, Body>,
    pub upstream: Arc<Upstream>,
}

/// HTTP server for the claims proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        validate_config(&config).map_err(ServerError::Config)?;

        let upstream = Upstream::parse(&config.upstream.url)
            .ok_or_else(|| ServerError::InvalidUpstream(config.upstream.url.clone()))?;
        let pipeline = ClaimsPipeline::new(config.claims.clone()).map_err(ServerError::Config)?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            client,
            upstream: Arc::new(upstream),
        };

        let router = Self::build_router(&config, state, Arc::new(pipeline));
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState, pipeline: Arc<ClaimsPipeline>) -> Router {
        let router = Router::new()
            .route("/{*path}", any(forward_handler))
            .route("/", any(forward_handler))
            .with_state(state);

        let router = claims::apply(router, pipeline)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        apply_request_id(router).layer(TraceLayer::new_for_http())
    }

    /// Run the server until a shutdown signal arrives on `shutdown`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Forward a request, already enriched by the claims middleware, upstream.
async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let (mut parts, body) = request.into_parts();

    parts.uri = match state.upstream.uri_for(&parts.uri) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Failed to build upstream URI");
            return bad_gateway();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        uri = %parts.uri,
        "Forwarding request"
    );

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body)).into_response()
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            bad_gateway()
        }
    }
}
