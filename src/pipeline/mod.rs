//! Claim-to-header pipeline.
//!
//! # Data Flow
//! ```text
//! request headers
//!     → token (read source header, strip prefix, decode)
//!     → claims::path (resolve each mapping, sections in configured order)
//!     → claims::render (header text)
//!     → security::headers (sanitize + guarded insert)
//!     → Outcome (forward / pass through / reject)
//! ```
//!
//! # Design Decisions
//! - One synchronous pass per request, no shared mutable state
//! - A failing mapping is recorded and skipped; it never aborts the request
//! - Only a missing or undecodable credential ends processing early

pub mod error;
pub mod processor;

pub use error::{CredentialError, MappingError};
pub use processor::{ClaimsPipeline, MappingReport, Outcome, ProcessReport};
