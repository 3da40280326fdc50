//! Structural JWT decoding without signature verification.
//!
//! # Responsibilities
//! - Split the compact serialization into its three segments
//! - base64url-decode (unpadded) the metadata and claims segments
//! - Parse both as JSON objects
//! - Keep the signature segment verbatim
//!
//! Tokens reaching this stage are assumed to have been verified at the edge.
//! Nothing here establishes authenticity.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// One of the two decoded token sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// Segment 0, the JOSE header (`alg`, `typ`, `kid`, ...).
    Metadata,
    /// Segment 1, the payload (`sub`, `email`, `roles`, ...).
    Claims,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Metadata => f.write_str("metadata"),
            Section::Claims => f.write_str("claims"),
        }
    }
}

/// Errors produced while decoding a token.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("expected 3 token segments, found {found}")]
    SegmentCount { found: usize },

    #[error("{section} segment is not valid unpadded base64url")]
    InvalidEncoding { section: Section },

    #[error("{section} segment is not a JSON object")]
    InvalidStructure { section: Section },

    #[error("metadata section has no 'alg' field")]
    MissingAlgorithm,

    #[error("credential is not valid UTF-8")]
    InvalidText,
}

/// A decoded, unverified token.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedToken {
    pub metadata: Map<String, Value>,
    pub claims: Map<String, Value>,
    /// Third segment exactly as received.
    pub signature: String,
}

impl DecodedToken {
    /// Borrow the map backing `section`.
    pub fn section(&self, section: Section) -> &Map<String, Value> {
        match section {
            Section::Metadata => &self.metadata,
            Section::Claims => &self.claims,
        }
    }
}

/// Decode a compact `metadata.claims.signature` token.
pub fn decode(token: &str) -> Result<DecodedToken, DecodeError> {
    let segments: Vec<&str> = token.split('.').collect();
    let &[metadata, claims, signature] = segments.as_slice() else {
        return Err(DecodeError::SegmentCount {
            found: segments.len(),
        });
    };

    let metadata_bytes = decode_segment(metadata, Section::Metadata)?;
    let claims_bytes = decode_segment(claims, Section::Claims)?;

    Ok(DecodedToken {
        metadata: parse_object(&metadata_bytes, Section::Metadata)?,
        claims: parse_object(&claims_bytes, Section::Claims)?,
        signature: signature.to_string(),
    })
}

/// Like [`decode`], but also requires an `alg` field in the metadata section.
pub fn decode_strict(token: &str) -> Result<DecodedToken, DecodeError> {
    let decoded = decode(token)?;
    if !decoded.metadata.contains_key("alg") {
        return Err(DecodeError::MissingAlgorithm);
    }
    Ok(decoded)
}

/// Remove `prefix` from the start of `value` and trim what remains.
///
/// The match is exact and case-sensitive. An empty prefix, or a value that
/// does not start with it, returns `value` untouched.
pub fn strip_prefix<'a>(value: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() {
        return value;
    }
    match value.strip_prefix(prefix) {
        Some(rest) => rest.trim(),
        None => value,
    }
}

fn decode_segment(segment: &str, section: Section) -> Result<Vec<u8>, DecodeError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| DecodeError::InvalidEncoding { section })
}

fn parse_object(bytes: &[u8], section: Section) -> Result<Map<String, Value>, DecodeError> {
    serde_json::from_slice(bytes).map_err(|_| DecodeError::InvalidStructure { section })
}
