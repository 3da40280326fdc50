//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::claims::ListFormat;
use crate::security::headers::CollisionPolicy;
use crate::token::Section;

/// Root configuration for the claims proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Where processed requests are forwarded.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Claim extraction and header injection.
    pub claims: ClaimsConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream (downstream service) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the service receiving the enriched requests.
    pub url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:3000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Claim extraction settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClaimsConfig {
    /// Header carrying the token.
    pub source_header: String,

    /// Stripped from the source header value before decoding. Empty disables.
    pub token_prefix: String,

    /// Claim-to-header rules, applied in order. Must not be empty.
    pub mappings: Vec<ClaimMapping>,

    /// Sections searched for each claim, in order.
    pub sections: Vec<Section>,

    /// Forward unmodified on a missing or undecodable token instead of
    /// answering 401.
    pub fail_open: bool,

    /// Drop the source header before forwarding.
    pub remove_source_header: bool,

    /// Maximum number of dot-separated segments in a claim path.
    pub max_path_depth: usize,

    /// Maximum raw header value size in bytes.
    pub max_header_value_bytes: usize,

    /// Require an `alg` field in the token metadata.
    pub strict_mode: bool,

    /// Log unresolved claims at warn instead of debug.
    pub log_missing_claims: bool,
}

impl Default for ClaimsConfig {
    fn default() -> Self {
        Self {
            source_header: "Authorization".to_string(),
            token_prefix: "Bearer ".to_string(),
            mappings: Vec::new(),
            sections: vec![Section::Claims],
            fail_open: true,
            remove_source_header: false,
            max_path_depth: 10,
            max_header_value_bytes: 8192,
            strict_mode: false,
            log_missing_claims: false,
        }
    }
}

/// A single claim path to header rule.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ClaimMapping {
    /// Dot-separated claim path (e.g., "user.profile.email").
    pub path: String,

    /// Target request header (e.g., "X-User-Email").
    pub header: String,

    /// Behaviour when the header is already set (default: preserve).
    #[serde(default)]
    pub collision: CollisionPolicy,

    /// Rendering of list claims (default: joined).
    #[serde(default)]
    pub list_format: ListFormat,
}

impl ClaimMapping {
    pub fn new(path: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            header: header.into(),
            collision: CollisionPolicy::default(),
            list_format: ListFormat::default(),
        }
    }

    pub fn with_collision(mut self, collision: CollisionPolicy) -> Self {
        self.collision = collision;
        self
    }

    pub fn with_list_format(mut self, list_format: ListFormat) -> Self {
        self.list_format = list_format;
        self
    }
}
