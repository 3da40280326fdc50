//! Guarded header injection.
//!
//! # Responsibilities
//! - Refuse to touch a fixed set of protected headers
//! - Strip control characters and enforce a byte ceiling on values
//! - Apply the per-mapping collision policy against existing values
//!
//! # Design Decisions
//! - Protected names are matched case-insensitively, exact match only
//! - Writing to a protected name is a silent no-op, not an error
//! - The size ceiling applies to the raw value, before sanitization

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Headers that claim values may never overwrite.
pub const PROTECTED_HEADERS: &[&str] = &[
    "host",
    "x-forwarded-for",
    "x-forwarded-host",
    "x-forwarded-proto",
    "x-forwarded-port",
    "x-real-ip",
    "content-length",
    "content-type",
    "transfer-encoding",
];

/// What to do when the target header already carries a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Keep the existing value.
    #[default]
    Preserve,
    /// Overwrite the existing value.
    Replace,
}

/// Result of a successful [`inject`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Injection {
    Inserted,
    Replaced,
    /// Existing value kept under [`CollisionPolicy::Preserve`].
    Preserved,
    /// Name is in [`PROTECTED_HEADERS`]; nothing was written.
    Protected,
}

impl Injection {
    /// Whether the header map was modified.
    pub fn is_write(&self) -> bool {
        matches!(self, Injection::Inserted | Injection::Replaced)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InjectError {
    #[error("header value is {size} bytes, maximum is {max}")]
    SizeExceeded { size: usize, max: usize },

    #[error("invalid header name '{0}'")]
    InvalidName(String),

    #[error("header value rejected after sanitization")]
    InvalidValue,
}

/// Case-insensitive membership test against [`PROTECTED_HEADERS`].
pub fn is_protected(name: &str) -> bool {
    let normalized = name.to_lowercase();
    PROTECTED_HEADERS.contains(&normalized.as_str())
}

/// Remove control characters (U+0000..U+001F, U+007F) and trim whitespace.
///
/// Fails if `value` is longer than `max_size` bytes. Printable characters,
/// including non-ASCII ones, are left alone.
pub fn sanitize(value: &str, max_size: usize) -> Result<String, InjectError> {
    if value.len() > max_size {
        return Err(InjectError::SizeExceeded {
            size: value.len(),
            max: max_size,
        });
    }

    let stripped: String = value
        .chars()
        .filter(|c| !matches!(*c, '\u{0}'..='\u{1f}' | '\u{7f}'))
        .collect();

    Ok(stripped.trim().to_string())
}

/// Write `raw_value` to header `name`, subject to the protection list,
/// sanitization and `collision`.
pub fn inject(
    headers: &mut HeaderMap,
    name: &str,
    raw_value: &str,
    collision: CollisionPolicy,
    max_size: usize,
) -> Result<Injection, InjectError> {
    if is_protected(name) {
        return Ok(Injection::Protected);
    }

    let sanitized = sanitize(raw_value, max_size)?;

    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| InjectError::InvalidName(name.to_string()))?;

    let occupied = headers
        .get(&header_name)
        .is_some_and(|existing| !existing.is_empty());

    if occupied && collision == CollisionPolicy::Preserve {
        return Ok(Injection::Preserved);
    }

    // Non-ASCII text is passed through as raw UTF-8 bytes.
    let header_value =
        HeaderValue::from_bytes(sanitized.as_bytes()).map_err(|_| InjectError::InvalidValue)?;
    headers.insert(header_name, header_value);

    Ok(if occupied {
        Injection::Replaced
    } else {
        Injection::Inserted
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn has_control(s: &str) -> bool {
        s.chars().any(|c| (c as u32) < 0x20 || c as u32 == 0x7f)
    }

    #[test]
    fn test_is_protected_case_insensitive() {
        assert!(is_protected("Host"));
        assert!(is_protected("HOST"));
        assert!(is_protected("X-Forwarded-For"));
        assert!(is_protected("x-real-ip"));
        assert!(is_protected("Transfer-Encoding"));
        assert!(!is_protected("X-User-Id"));
        assert!(!is_protected("X-Forwarded-For-Real"));
        assert!(!is_protected("Hos"));
        assert!(!is_protected(" Host"));
    }

    #[test]
    fn test_sanitize_strips_crlf() {
        assert_eq!(
            sanitize("value\r\nX-Evil: injected", 1000).unwrap(),
            "valueX-Evil: injected"
        );
        assert_eq!(
            sanitize("value\r\n\x00X-Evil: bad\x01\x02", 1000).unwrap(),
            "valueX-Evil: bad"
        );
        assert_eq!(sanitize("a\tb\x7fc", 1000).unwrap(), "abc");
    }

    #[test]
    fn test_sanitize_trims_and_keeps_printables() {
        assert_eq!(sanitize("  user@example.com  ", 100).unwrap(), "user@example.com");
        assert_eq!(sanitize("\n ünïcødé ✓ \r", 100).unwrap(), "ünïcødé ✓");
        assert_eq!(
            sanitize("value\u{2028}X-Evil", 100).unwrap(),
            "value\u{2028}X-Evil"
        );
    }

    #[test]
    fn test_sanitize_size_limit() {
        let exact = "a".repeat(10_000);
        assert_eq!(sanitize(&exact, 10_000).unwrap(), exact);

        let over = "a".repeat(10_001);
        assert_eq!(
            sanitize(&over, 10_000),
            Err(InjectError::SizeExceeded { size: 10_001, max: 10_000 })
        );

        // Measured before stripping, in bytes
        assert!(sanitize("\r\n\r\nab", 5).is_err());
        assert!(sanitize("éé", 3).is_err());
    }

    #[test]
    fn test_inject_new_header() {
        let mut headers = HeaderMap::new();
        let outcome = inject(&mut headers, "X-User-Id", "12345", CollisionPolicy::Preserve, 8192);

        assert_eq!(outcome, Ok(Injection::Inserted));
        assert_eq!(headers.get("x-user-id").unwrap(), "12345");
    }

    #[test]
    fn test_inject_protected_is_noop() {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("backend.internal"));

        for name in ["Host", "HOST", "host"] {
            let outcome = inject(&mut headers, name, "evil.com", CollisionPolicy::Replace, 8192);
            assert_eq!(outcome, Ok(Injection::Protected));
        }
        assert_eq!(headers.get("host").unwrap(), "backend.internal");

        let outcome = inject(&mut headers, "Content-Type", "text/evil", CollisionPolicy::Replace, 8192);
        assert_eq!(outcome, Ok(Injection::Protected));
        assert!(headers.get("content-type").is_none());
    }

    #[test]
    fn test_inject_collision_policy() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("original"));

        let outcome = inject(&mut headers, "X-User-Id", "new", CollisionPolicy::Preserve, 8192);
        assert_eq!(outcome, Ok(Injection::Preserved));
        assert_eq!(headers.get("x-user-id").unwrap(), "original");

        let outcome = inject(&mut headers, "X-User-Id", "new", CollisionPolicy::Replace, 8192);
        assert_eq!(outcome, Ok(Injection::Replaced));
        assert_eq!(headers.get("x-user-id").unwrap(), "new");
        assert_eq!(headers.get_all("x-user-id").iter().count(), 1);
    }

    #[test]
    fn test_inject_empty_existing_counts_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static(""));

        let outcome = inject(&mut headers, "X-User-Id", "42", CollisionPolicy::Preserve, 8192);
        assert_eq!(outcome, Ok(Injection::Inserted));
        assert_eq!(headers.get("x-user-id").unwrap(), "42");
    }

    #[test]
    fn test_inject_sanitizes_value() {
        let mut headers = HeaderMap::new();
        inject(&mut headers, "X-Email", " a@b.c\r\nX-Evil: 1 ", CollisionPolicy::Preserve, 8192)
            .unwrap();

        assert_eq!(headers.get("x-email").unwrap(), "a@b.cX-Evil: 1");
        assert!(headers.get("x-evil").is_none());
    }

    #[test]
    fn test_inject_utf8_value() {
        let mut headers = HeaderMap::new();
        let outcome = inject(&mut headers, "X-User-Name", "Zoë Ålund", CollisionPolicy::Preserve, 8192);

        assert_eq!(outcome, Ok(Injection::Inserted));
        assert_eq!(headers.get("x-user-name").unwrap().as_bytes(), "Zoë Ålund".as_bytes());
    }

    #[test]
    fn test_inject_errors() {
        let mut headers = HeaderMap::new();

        let outcome = inject(&mut headers, "X-Big", &"a".repeat(20), CollisionPolicy::Preserve, 10);
        assert_eq!(outcome, Err(InjectError::SizeExceeded { size: 20, max: 10 }));

        let outcome = inject(&mut headers, "Bad Name", "v", CollisionPolicy::Preserve, 10);
        assert_eq!(outcome, Err(InjectError::InvalidName("Bad Name".into())));
        assert!(headers.is_empty());
    }

    proptest! {
        #[test]
        fn prop_sanitize_is_idempotent(s in any::<String>()) {
            let once = sanitize(&s, usize::MAX).unwrap();
            let twice = sanitize(&once, usize::MAX).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_sanitize_leaks_no_control_chars(s in any::<String>(), slack in 0usize..16) {
            let sanitized = sanitize(&s, s.len() + slack).unwrap();
            prop_assert!(!has_control(&sanitized));
            prop_assert!(!sanitized.contains('\r') && !sanitized.contains('\n'));
        }

        #[test]
        fn prop_protected_headers_never_change(
            index in 0usize..PROTECTED_HEADERS.len(),
            value in any::<String>(),
            replace in any::<bool>(),
        ) {
            let name = PROTECTED_HEADERS[index];
            let mut headers = HeaderMap::new();
            headers.insert(name, HeaderValue::from_static("original"));

            let collision = if replace { CollisionPolicy::Replace } else { CollisionPolicy::Preserve };
            let upper = name.to_uppercase();
            prop_assert_eq!(inject(&mut headers, &upper, &value, collision, 8192), Ok(Injection::Protected));
            prop_assert_eq!(headers.get(name).unwrap(), "original");
        }
    }
}
