//! Credential decoding subsystem.
//!
//! # Data Flow
//! ```text
//! source header value ("Bearer xxx.yyy.zzz")
//!     → decoder.rs strip_prefix (remove configured prefix)
//!     → decoder.rs decode (split, base64url, JSON)
//!     → DecodedToken { metadata, claims, signature }
//! ```
//!
//! # Design Decisions
//! - The signature segment is never decoded or verified
//! - Decoding is a pure function; nothing outlives the request
//! - Both sections keep their document key order

pub mod decoder;

pub use decoder::{decode, decode_strict, strip_prefix, DecodeError, DecodedToken, Section};
