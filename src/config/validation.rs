//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (depth and size limits > 0)
//! - Detect conflicting mappings (duplicate target headers)
//! - Check addresses and the upstream URL parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;
use url::Url;

use crate::config::schema::{ClaimsConfig, ProxyConfig};
use crate::security::headers::is_protected;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("claims.mappings cannot be empty")]
    NoMappings,

    #[error("claims.mappings[{index}]: path is required")]
    EmptyPath { index: usize },

    #[error("claims.mappings[{index}]: header is required")]
    EmptyHeader { index: usize },

    #[error("claims.mappings[{index}]: invalid header name '{header}'")]
    InvalidHeader { index: usize, header: String },

    #[error("claims.mappings[{index}]: duplicate header '{header}'")]
    DuplicateHeader { index: usize, header: String },

    #[error("claims.sections cannot be empty")]
    NoSections,

    #[error("claims.sections lists '{0}' more than once")]
    DuplicateSection(String),

    #[error("claims.source_header: invalid header name '{0}'")]
    InvalidSourceHeader(String),

    #[error("claims.source_header '{0}' is protected and cannot be removed")]
    ProtectedSourceHeader(String),

    #[error("claims.max_path_depth must be greater than 0")]
    ZeroPathDepth,

    #[error("claims.max_header_value_bytes must be greater than 0")]
    ZeroHeaderSize,

    #[error("upstream.url '{0}' must be an absolute http URL")]
    InvalidUpstream(String),

    #[error("{field} '{value}' is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("observability.log_level '{0}' must be one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("timeouts.request_secs must be greater than 0")]
    ZeroTimeout,
}

/// Validate a full proxy configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = validate_claims(&config.claims)
        .err()
        .unwrap_or_default();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    match Url::parse(&config.upstream.url) {
        Ok(url) if url.scheme() == "http" && url.has_host() => {}
        _ => errors.push(ValidationError::InvalidUpstream(config.upstream.url.clone())),
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate only the claim pipeline settings.
pub fn validate_claims(config: &ClaimsConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.mappings.is_empty() {
        errors.push(ValidationError::NoMappings);
    }

    let mut seen_headers = HashSet::new();
    for (index, mapping) in config.mappings.iter().enumerate() {
        if mapping.path.is_empty() {
            errors.push(ValidationError::EmptyPath { index });
        }

        if mapping.header.is_empty() {
            errors.push(ValidationError::EmptyHeader { index });
            continue;
        }

        if HeaderName::from_bytes(mapping.header.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeader {
                index,
                header: mapping.header.clone(),
            });
        }

        if !seen_headers.insert(mapping.header.to_lowercase()) {
            errors.push(ValidationError::DuplicateHeader {
                index,
                header: mapping.header.clone(),
            });
        }
    }

    if config.sections.is_empty() {
        errors.push(ValidationError::NoSections);
    }

    let mut seen_sections = HashSet::new();
    for section in &config.sections {
        if !seen_sections.insert(*section) {
            errors.push(ValidationError::DuplicateSection(section.to_string()));
        }
    }

    if HeaderName::from_bytes(config.source_header.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidSourceHeader(
            config.source_header.clone(),
        ));
    }

    if config.remove_source_header && is_protected(&config.source_header) {
        errors.push(ValidationError::ProtectedSourceHeader(
            config.source_header.clone(),
        ));
    }

    if config.max_path_depth == 0 {
        errors.push(ValidationError::ZeroPathDepth);
    }

    if config.max_header_value_bytes == 0 {
        errors.push(ValidationError::ZeroHeaderSize);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ClaimMapping;
    use crate::token::Section;

    fn valid_claims() -> ClaimsConfig {
        ClaimsConfig {
            mappings: vec![
                ClaimMapping::new("sub", "X-User-Id"),
                ClaimMapping::new("email", "X-User-Email"),
            ],
            ..ClaimsConfig::default()
        }
    }

    fn valid_config() -> ProxyConfig {
        ProxyConfig {
            claims: valid_claims(),
            ..ProxyConfig::default()
        }
    }

    #[test]
    fn test_valid_config() {
        assert_eq!(validate_config(&valid_config()), Ok(()));
    }

    #[test]
    fn test_defaults_need_mappings() {
        let errors = validate_config(&ProxyConfig::default()).unwrap_err();
        assert_eq!(errors, vec![ValidationError::NoMappings]);
    }

    #[test]
    fn test_empty_fields() {
        let mut claims = valid_claims();
        claims.mappings.push(ClaimMapping::new("", "X-A"));
        claims.mappings.push(ClaimMapping::new("a", ""));

        let errors = validate_claims(&claims).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyPath { index: 2 },
                ValidationError::EmptyHeader { index: 3 },
            ]
        );
    }

    #[test]
    fn test_duplicate_headers_case_insensitive() {
        let mut claims = valid_claims();
        claims.mappings.push(ClaimMapping::new("user.id", "x-user-id"));

        let errors = validate_claims(&claims).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::DuplicateHeader {
                index: 2,
                header: "x-user-id".into()
            }]
        );
    }

    #[test]
    fn test_protected_source_header_removal() {
        let mut claims = valid_claims();
        claims.source_header = "X-Real-IP".into();
        assert_eq!(validate_claims(&claims), Ok(()));

        claims.remove_source_header = true;
        assert_eq!(
            validate_claims(&claims),
            Err(vec![ValidationError::ProtectedSourceHeader("X-Real-IP".into())])
        );
    }

    #[test]
    fn test_invalid_header_name() {
        let mut claims = valid_claims();
        claims.mappings.push(ClaimMapping::new("sub", "X User"));
        claims.source_header = "Auth:".into();

        let errors = validate_claims(&claims).unwrap_err();
        assert!(errors.contains(&ValidationError::InvalidHeader {
            index: 2,
            header: "X User".into()
        }));
        assert!(errors.contains(&ValidationError::InvalidSourceHeader("Auth:".into())));
    }

    #[test]
    fn test_sections() {
        let mut claims = valid_claims();
        claims.sections = vec![];
        assert_eq!(validate_claims(&claims), Err(vec![ValidationError::NoSections]));

        claims.sections = vec![Section::Claims, Section::Metadata];
        assert_eq!(validate_claims(&claims), Ok(()));

        claims.sections = vec![Section::Claims, Section::Claims];
        assert_eq!(
            validate_claims(&claims),
            Err(vec![ValidationError::DuplicateSection("claims".into())])
        );
    }

    #[test]
    fn test_zero_limits() {
        let mut claims = valid_claims();
        claims.max_path_depth = 0;
        claims.max_header_value_bytes = 0;

        assert_eq!(
            validate_claims(&claims),
            Err(vec![ValidationError::ZeroPathDepth, ValidationError::ZeroHeaderSize])
        );
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid_config();
        config.claims.mappings.clear();
        config.upstream.url = "ftp://files.internal".into();
        config.listener.bind_address = "not-an-address".into();
        config.observability.log_level = "verbose".into();
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::InvalidUpstream("ftp://files.internal".into())));
        assert!(errors.contains(&ValidationError::InvalidLogLevel("verbose".into())));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = valid_config();
        config.observability.metrics_address = "nope".into();
        assert_eq!(validate_config(&config), Ok(()));

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
