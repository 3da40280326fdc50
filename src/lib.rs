//! Claims Proxy Library
//!
//! Decodes an unverified three-segment credential from an inbound request,
//! copies selected claims into sanitized request headers, and forwards the
//! request to a single upstream.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ http::middleware::claims ──▶ forward_handler ──▶ Upstream
//!                                           │
//!                                           ▼
//!                                     pipeline::processor
//!                                  ┌────────┼─────────────┐
//!                                  ▼        ▼             ▼
//!                               token    claims      security::headers
//!                              (decode)  (resolve,   (protect, sanitize,
//!                                         render)     inject)
//! ```
//!
//! Signatures are never verified: the proxy is meant to sit behind a
//! component that already authenticated the token.

// Core pipeline
pub mod claims;
pub mod pipeline;
pub mod security;
pub mod token;

// Serving
pub mod config;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use pipeline::{ClaimsPipeline, Outcome};
