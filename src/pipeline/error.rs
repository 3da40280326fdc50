//! Pipeline error taxonomy.
//!
//! Credential errors end the request (fail-open or fail-closed). Mapping
//! errors only skip the mapping that raised them.

use thiserror::Error;

use crate::claims::{RenderError, ResolveError};
use crate::security::headers::InjectError;
use crate::token::DecodeError;

/// Request-fatal credential problems.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("credential header '{header}' is missing or empty")]
    Missing { header: String },

    #[error("credential could not be decoded: {0}")]
    Invalid(#[from] DecodeError),
}

impl CredentialError {
    /// Client-facing message for the rejection body. Never echoes token data.
    pub fn public_message(&self) -> &'static str {
        match self {
            CredentialError::Missing { .. } => "missing credential",
            CredentialError::Invalid(_) => "invalid credential",
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CredentialError::Missing { .. } => "missing",
            CredentialError::Invalid(_) => "invalid",
        }
    }
}

/// Failure of one claim mapping.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Inject(#[from] InjectError),
}

impl MappingError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            MappingError::Resolve(ResolveError::DepthExceeded { .. }) => "depth_exceeded",
            MappingError::Resolve(ResolveError::NotTraversable { .. }) => "not_traversable",
            MappingError::Resolve(ResolveError::NotFound { .. }) => "not_found",
            MappingError::Render(_) => "render",
            MappingError::Inject(InjectError::SizeExceeded { .. }) => "size_exceeded",
            MappingError::Inject(_) => "invalid_header",
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, MappingError::Resolve(_))
    }
}
