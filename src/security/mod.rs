//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Rendered claim value:
//!     → headers.rs (protected-name check)
//!     → headers.rs (size ceiling, control character removal)
//!     → headers.rs (collision policy, insert)
//!     → Outbound request headers
//! ```
//!
//! # Design Decisions
//! - Defense in depth: name blacklist, value sanitization and size limits
//! - No trust in token contents; every value is sanitized
//! - Protected names are a compile-time constant

pub mod headers;

pub use headers::{inject, is_protected, sanitize, CollisionPolicy, InjectError, Injection};
