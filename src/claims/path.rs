//! Dot-path claim lookup.
//!
//! # Responsibilities
//! - Split `user.profile.email` style paths into segments
//! - Reject paths deeper than the configured ceiling up front
//! - Walk nested objects, refusing to descend into non-objects

use serde_json::{Map, Value};
use thiserror::Error;

/// Reasons a claim path could not be resolved.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("claim path depth exceeds maximum ({max_depth})")]
    DepthExceeded { max_depth: usize },

    #[error("claim path segment '{segment}' is not an object")]
    NotTraversable { segment: String },

    #[error("claim not found: {path}")]
    NotFound { path: String },
}

/// Locate the value at `path` inside `root`.
///
/// Each `.` adds one level; a path of `max_depth` segments is the deepest
/// accepted. A terminal `null` is returned as a found value.
pub fn resolve<'a>(
    root: &'a Map<String, Value>,
    path: &str,
    max_depth: usize,
) -> Result<&'a Value, ResolveError> {
    // Segment count comes from the path alone.
    let depth = path.split('.').count();
    if depth > max_depth {
        return Err(ResolveError::DepthExceeded { max_depth });
    }

    let not_found = || ResolveError::NotFound {
        path: path.to_string(),
    };

    if path.is_empty() {
        return Err(not_found());
    }

    let mut current = root;
    let mut segments = path.split('.').peekable();

    while let Some(segment) = segments.next() {
        let value = current.get(segment).ok_or_else(not_found)?;

        if segments.peek().is_none() {
            return Ok(value);
        }

        current = match value {
            Value::Object(nested) => nested,
            _ => {
                return Err(ResolveError::NotTraversable {
                    segment: segment.to_string(),
                })
            }
        };
    }

    Err(not_found())
}
