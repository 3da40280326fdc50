//! Per-request claim processing.
//!
//! # Flow
//! ```text
//! Start ──(source header)──▶ TokenExtracted ──(strip + decode)──▶ Decoded
//!   │                             │                                 │
//!   └──────── ErrorTerminal ◀─────┘                    (each mapping, in order)
//!             fail_open: forward as-is                              │
//!             fail_closed: reject 401                               ▼
//!                                          MappingsProcessed ──▶ Forwarded
//! ```

use axum::http::{HeaderMap, HeaderName};
use serde_json::Value;

use crate::claims::{self, ResolveError};
use crate::config::validation::{validate_claims, ValidationError};
use crate::config::{ClaimMapping, ClaimsConfig};
use crate::pipeline::error::{CredentialError, MappingError};
use crate::security::headers::{inject, Injection};
use crate::token::{self, DecodeError, DecodedToken, Section};

/// Outcome of one mapping.
#[derive(Debug)]
pub struct MappingReport<'a> {
    pub mapping: &'a ClaimMapping,
    /// Section the claim was found in, if it was found.
    pub section: Option<Section>,
    pub result: Result<Injection, MappingError>,
}

/// Everything that happened to a request whose token decoded.
#[derive(Debug, Default)]
pub struct ProcessReport<'a> {
    pub mappings: Vec<MappingReport<'a>>,
    pub source_removed: bool,
}

impl<'a> ProcessReport<'a> {
    /// Number of headers written or overwritten.
    pub fn injected(&self) -> usize {
        self.mappings
            .iter()
            .filter(|m| matches!(&m.result, Ok(injection) if injection.is_write()))
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &MappingReport<'a>> + '_ {
        self.mappings.iter().filter(|m| m.result.is_err())
    }
}

/// What the caller should do with the request.
#[derive(Debug)]
pub enum Outcome<'a> {
    /// Token decoded and mappings applied; forward the request.
    Processed(ProcessReport<'a>),
    /// Credential error under fail-open; forward the request untouched.
    PassThrough(CredentialError),
    /// Credential error under fail-closed; answer 401, do not forward.
    Reject(CredentialError),
}

/// Validated, immutable claim pipeline shared by all requests.
#[derive(Debug, Clone)]
pub struct ClaimsPipeline {
    config: ClaimsConfig,
    source_header: HeaderName,
}

impl ClaimsPipeline {
    /// Build a pipeline from claim settings, validating them first.
    pub fn new(config: ClaimsConfig) -> Result<Self, Vec<ValidationError>> {
        validate_claims(&config)?;

        let source_header = HeaderName::from_bytes(config.source_header.as_bytes())
            .map_err(|_| vec![ValidationError::InvalidSourceHeader(config.source_header.clone())])?;

        Ok(Self {
            config,
            source_header,
        })
    }

    pub fn config(&self) -> &ClaimsConfig {
        &self.config
    }

    /// Run the pipeline against a request's headers, mutating them in place.
    ///
    /// Headers are only touched when the token decodes; a credential error
    /// leaves them exactly as received.
    pub fn process(&self, headers: &mut HeaderMap) -> Outcome<'_> {
        match self.decode_credential(headers) {
            Ok(decoded) => Outcome::Processed(self.apply_mappings(&decoded, headers)),
            Err(err) if self.config.fail_open => Outcome::PassThrough(err),
            Err(err) => Outcome::Reject(err),
        }
    }

    fn decode_credential(&self, headers: &HeaderMap) -> Result<DecodedToken, CredentialError> {
        let raw = headers
            .get(&self.source_header)
            .map(|value| value.as_bytes())
            .filter(|bytes| !bytes.is_empty())
            .ok_or_else(|| CredentialError::Missing {
                header: self.config.source_header.clone(),
            })?;
        let raw = std::str::from_utf8(raw).map_err(|_| DecodeError::InvalidText)?;

        let token = token::strip_prefix(raw, &self.config.token_prefix);

        let decoded = if self.config.strict_mode {
            token::decode_strict(token)?
        } else {
            token::decode(token)?
        };

        Ok(decoded)
    }

    fn apply_mappings<'a>(
        &'a self,
        decoded: &DecodedToken,
        headers: &mut HeaderMap,
    ) -> ProcessReport<'a> {
        let mappings = self
            .config
            .mappings
            .iter()
            .map(|mapping| self.apply_mapping(mapping, decoded, headers))
            .collect();

        let source_removed = self.config.remove_source_header
            && headers.remove(&self.source_header).is_some();

        ProcessReport {
            mappings,
            source_removed,
        }
    }

    fn apply_mapping<'a>(
        &self,
        mapping: &'a ClaimMapping,
        decoded: &DecodedToken,
        headers: &mut HeaderMap,
    ) -> MappingReport<'a> {
        let (section, value) = match self.find_claim(decoded, &mapping.path) {
            Ok((section, value)) => (section, value),
            Err(err) => {
                return MappingReport {
                    mapping,
                    section: None,
                    result: Err(err.into()),
                }
            }
        };

        let result = claims::render(value, mapping.list_format)
            .map_err(MappingError::from)
            .and_then(|text| {
                inject(
                    headers,
                    &mapping.header,
                    &text,
                    mapping.collision,
                    self.config.max_header_value_bytes,
                )
                .map_err(MappingError::from)
            });

        MappingReport {
            mapping,
            section: Some(section),
            result,
        }
    }

    /// Search the configured sections in order; the first hit wins.
    fn find_claim<'d>(
        &self,
        decoded: &'d DecodedToken,
        path: &str,
    ) -> Result<(Section, &'d Value), ResolveError> {
        let mut last_err = ResolveError::NotFound {
            path: path.to_string(),
        };

        for &section in &self.config.sections {
            match claims::resolve(decoded.section(section), path, self.config.max_path_depth) {
                Ok(value) => return Ok((section, value)),
                Err(err) => last_err = err,
            }
        }

        Err(last_err)
    }
}
